//! The virtual directory tree of a photo library.
//!
//! The tree has a fixed depth of three:
//! the root holds two _namespaces_, `Albums` and `Rolls`;
//! each namespace holds named _collections_;
//! each collection holds photo entries named after their files.
//!
//! Albums, rolls, and views computed from the catalog
//! (see the [`synthetic`] module) are all normalized to [`Collection`]s
//! before [`TreeIndex::build`] assembles them into the tree.
//! Once built, the tree is never modified.

pub use self::collection::*;
pub use self::index::*;
pub use self::namespace::*;
pub use self::synthetic::Generator;

pub mod synthetic;

mod collection;
mod index;
mod namespace;
