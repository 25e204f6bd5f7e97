pub mod interaction;
pub mod normalize;
pub mod surface;

pub use interaction::{
    InteractionIntent, InteractionMachine, InteractionOutput, InteractionState, PendingSelection,
    SelectionCapture, Stroke, TagAttachment, TagPopover,
};
pub use normalize::{
    denormalize_point, denormalize_rect, normalize_point, normalize_rect, normalize_rects,
    PixelPoint, PixelRect,
};
pub use surface::{PageSurface, UniformPageSurface};
