//! Asset data model shared by every pipeline stage.

mod kind;
mod reference;

pub use kind::{AssetKind, Position};
pub use reference::{AssetReference, ClassifiedReference, ExcludeReason};
