//! Core data types shared by the engine and the CLI.

pub mod core;
pub mod dom;

pub use self::core::{BoundingBox, StyleOverrides};
pub use self::dom::{ComputedStyle, DomNode, DomSnapshot};
