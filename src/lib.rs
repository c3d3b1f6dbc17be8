//! A quadtree that keeps each rectangle at the deepest quad fully containing it.

mod config;
mod error;
mod list;
mod quadtree;
mod rect;

/// Callbacks for [`Quadtree::traverse`]. Nodes arrive in pre-order, children
/// in top-left, top-right, bottom-left, bottom-right order. After each node
/// the entities stored directly at it are reported.
pub trait QuadtreeVisitor<E> {
    fn entity(&mut self, _id: EntityId, _entity: &E) {}
    fn leaf(&mut self, _depth: u32, _bounds: Rect) {}
    fn branch(&mut self, _depth: u32, _bounds: Rect) {}
}

pub use config::*;
pub use error::*;
pub use list::*;
pub use quadtree::*;
pub use rect::*;
