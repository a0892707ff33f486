//! Domain value objects.
//!
//! All entities here are constructed fresh per request from repository rows;
//! none of them outlives the request that built it.

mod document;
mod menu;
mod taxonomy;

pub use document::{Attachment, Document, DocumentKind, Fidelity, SidePost, Translation};
pub use menu::MenuNode;
pub use taxonomy::{CategoryFamilyNode, CategoryNode, TagCount};
