use crate::PhotoId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Returned when a library could not be loaded.
///
/// Load errors are fatal: a library that fails to load
/// must never be exposed in a partially-loaded state.
#[derive(Debug, Error)]
pub enum LoadError
{
    /// The library directory or its catalog could not be read.
    #[error("cannot read {path}: {source}")]
    Io
    {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The catalog is not a well-formed property list
    /// or lacks a required key.
    #[error("cannot parse catalog {path}: {source}")]
    Parse
    {
        path: PathBuf,
        #[source]
        source: plist::Error,
    },

    /// A collection refers to a photo that is not in the catalog.
    #[error("{collection} references unknown photo {photo}")]
    UnknownPhoto
    {
        collection: String,
        photo: PhotoId,
    },

    /// An entity has no usable date.
    #[error("{entity} has no valid date")]
    MissingDate
    {
        entity: String,
    },
}
