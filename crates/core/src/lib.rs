//! GuideLens core
//!
//! The project store and everything around it: debounced persistence,
//! sheet drafts, the open-guide session, and import/export.

pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;
pub mod session;
pub mod sheet_draft;
pub mod store;
pub mod workspace;
pub mod write_coordinator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, WorkspaceConfig};
pub use error::{CoreError, CoreResult};
pub use export::{export, export_csv, export_json, write_csv, ExportError, ExportFormat};
pub use import::{parse_project_state, ImportError};
pub use session::{FileRequest, GuideFileSession};
pub use sheet_draft::SheetDraft;
pub use store::{ProjectStore, SaveStatus, UploadOutcome};
pub use workspace::Workspace;
pub use write_coordinator::{AutoSaveWorker, WriteSchedule};
