//! Strongly-typed records for the contents of a photo library.
//!
//! A library is a directory on the file system,
//! conventionally named `<something>.photolibrary`.
//! Its catalog, `AlbumData.xml`, describes three kinds of entities:
//! _photos_, _rolls_ (date-grouped import sessions),
//! and _albums_ (named groupings independent of import session).
//!
//! [`Catalog::load`] parses the catalog once into plain value records.
//! Nothing in this crate ever writes to the library.

pub use self::error::*;
pub use self::id::*;
pub use self::loader::*;
pub use self::record::*;

#[cfg(any(test, feature = "testdata"))]
pub use self::testdata::*;

mod error;
mod id;
mod loader;
mod record;

#[cfg(any(test, feature = "testdata"))]
mod testdata;
