use crate::Kind;
use crate::Mutation;
use std::io;
use std::os::raw::c_int;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single request failed.
///
/// None of these errors affect the tree or any other request.
#[derive(Debug, Error)]
pub enum BrowseError
{
    /// The path does not name an entry in the tree,
    /// or the file behind a photo no longer exists.
    #[error("no such entry: {0}")]
    NotFound(String),

    /// The operation applies only to entries of the other kind,
    /// e.g. listing the contents of a photo.
    #[error("{operation} requires a {expected}")]
    InvalidOperation
    {
        operation: &'static str,
        expected: Kind,
    },

    /// The tree is read-only.
    #[error("read-only file system: cannot {0}")]
    ReadOnlyViolation(Mutation),

    /// The file behind a photo could not be accessed.
    #[error("cannot access {path}: {source}")]
    UnderlyingIo
    {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BrowseError
{
    /// The `errno` value that best describes this error.
    pub fn errno(&self) -> c_int
    {
        match self {
            Self::NotFound(_) => libc::ENOENT,
            Self::InvalidOperation{expected: Kind::Directory, ..} =>
                libc::ENOTDIR,
            Self::InvalidOperation{expected: Kind::File, ..} =>
                libc::EISDIR,
            Self::ReadOnlyViolation(_) => libc::EROFS,
            Self::UnderlyingIo{source, ..} =>
                source.raw_os_error().unwrap_or(libc::EIO),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_errno()
    {
        let examples = vec![
            (BrowseError::NotFound("/x".into()), libc::ENOENT),
            (BrowseError::InvalidOperation{
                 operation: "list", expected: Kind::Directory,
             }, libc::ENOTDIR),
            (BrowseError::InvalidOperation{
                 operation: "read", expected: Kind::File,
             }, libc::EISDIR),
            (BrowseError::ReadOnlyViolation(Mutation::Create), libc::EROFS),
            (BrowseError::UnderlyingIo{
                 path: "/x".into(),
                 source: io::Error::from_raw_os_error(libc::EACCES),
             }, libc::EACCES),
            (BrowseError::UnderlyingIo{
                 path: "/x".into(),
                 source: io::Error::new(io::ErrorKind::Other, "odd"),
             }, libc::EIO),
        ];
        for (error, expected) in examples {
            assert_eq!(error.errno(), expected, "{}", error);
        }
    }
}
