//! Structural scene queries used to assemble the container hierarchy.
//!
//! Containers are attached to scene nodes. At initialization an accommodating container asks
//! the [`SceneGraph`] for its descendants and claims the nestable ones whose parent is its own
//! node. [`SceneTree`] is a plain in-memory implementation for tools, tests and headless use.

mod graph;

pub use graph::{NodeId, SceneGraph, SceneTree};
