//! Read-only file-system-like access to a photo library.
//!
//! This crate answers the questions a file system asks
//! (what is at this path, what does this directory contain,
//! what are the attributes of this entry, give me its bytes)
//! against a [`TreeIndex`][`photofs_tree::TreeIndex`].
//!
//! This crate exposes the interface only as a Rust API.
//! This crate does not implement integration with any
//! concrete operating system facility or file access protocol.
//! Such functionality is provided by other crates,
//! which in turn depend on this crate for the core functionality.
//!
//! Nothing can be changed through this interface.
//! Every attempt to do so fails with
//! [`BrowseError::ReadOnlyViolation`].

pub use self::attributes::*;
pub use self::error::*;
pub use self::handle::*;
pub use self::mutation::*;
pub use self::parsed_path::*;
pub use self::resolver::*;

mod attributes;
mod error;
mod handle;
mod mutation;
mod parsed_path;
mod resolver;
