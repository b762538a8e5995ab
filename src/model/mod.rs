//! Document tree types.
//!
//! A [`Document`] owns a tree of [`Node`]s built once from JSON against a
//! [`Schema`](crate::schema::Schema). The tree is read-only after
//! construction; the serializer only borrows it.

mod document;
mod node;

pub use document::{Document, MarkJson, NodeJson};
pub use node::{Mark, Node};
