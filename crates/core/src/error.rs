use crate::config::ConfigError;
use crate::import::ImportError;
use doc_model::ModelError;
use storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("import failed: {0}")]
    Import(#[from] ImportError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("export failed: {0}")]
    Export(#[from] crate::export::ExportError),
    #[error("could not start auto-save: {0}")]
    AutoSave(#[source] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
