//! Data models for the storefront API
//!
//! Products as returned by the API and the media records embedded in them.

mod cursor;
mod media;
mod product;

pub use cursor::MediaCursor;
pub use media::{sort_for_display, MediaId, MediaKind, PersistedMedia};
pub use product::Product;
