pub mod cover;
pub mod media;

pub use cover::{CoverKind, MediaCover};
pub use media::{MediaId, MediaItem, MediaItemRequest, MediaItemResponse};
