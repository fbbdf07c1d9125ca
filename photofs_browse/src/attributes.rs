use std::fmt;
use std::time::SystemTime;

/// Size reported for every directory.
pub const DIRECTORY_SIZE: u64 = 4096;

/// Permission bits of directories: read and search for everyone.
pub const DIRECTORY_PERMISSIONS: u16 = 0o555;

/// Permission bits of photos: read for everyone.
pub const FILE_PERMISSIONS: u16 = 0o444;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind
{
    Directory,
    File,
}

impl fmt::Display for Kind
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        match self {
            Self::Directory => f.write_str("directory"),
            Self::File      => f.write_str("file"),
        }
    }
}

/// What a `stat` of an entry reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Attributes
{
    pub kind: Kind,
    pub size: u64,
    pub modified: SystemTime,

    /// Permission bits; never includes any write bit.
    pub permissions: u16,

    /// Number of hard links: for directories,
    /// two plus the number of subdirectories.
    pub links: u32,
}
