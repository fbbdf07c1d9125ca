//! FUSE integration for photo libraries.
//!
//! [`PhotoFs`] answers kernel requests by way of a
//! [`Resolver`][`photofs_browse::Resolver`];
//! [`run`] loads a library, builds its tree, and mounts it read-only.

pub use self::adapter::*;
pub use self::config::*;
pub use self::inode::*;
pub use self::mount::*;

mod adapter;
mod config;
mod inode;
mod mount;
