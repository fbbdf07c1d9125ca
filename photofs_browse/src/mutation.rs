use std::fmt;
use std::os::raw::c_int;

/// A kind of change to the tree.
/// Every one of them is rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mutation
{
    Create,
    MakeDirectory,
    MakeNode,
    Write,
    SetAttributes,
    Remove,
    RemoveDirectory,
    Rename,
    Link,
    Symlink,
    SetExtendedAttribute,
    RemoveExtendedAttribute,
}

impl fmt::Display for Mutation
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        let verb = match self {
            Self::Create                  => "create file",
            Self::MakeDirectory           => "make directory",
            Self::MakeNode                => "make node",
            Self::Write                   => "write",
            Self::SetAttributes           => "set attributes",
            Self::Remove                  => "remove",
            Self::RemoveDirectory         => "remove directory",
            Self::Rename                  => "rename",
            Self::Link                    => "link",
            Self::Symlink                 => "make symbolic link",
            Self::SetExtendedAttribute    => "set extended attribute",
            Self::RemoveExtendedAttribute => "remove extended attribute",
        };
        f.write_str(verb)
    }
}

/// What an open request intends to do with the file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Intent
{
    Read,
    Write,
}

impl Intent
{
    /// Classify the flags passed to `open(2)`.
    ///
    /// Opening for writing, or with any flag that would modify the file
    /// or create one, counts as intent to write.
    pub fn from_open_flags(flags: c_int) -> Self
    {
        let modifying = libc::O_TRUNC | libc::O_APPEND | libc::O_CREAT;
        match flags & libc::O_ACCMODE {
            libc::O_WRONLY | libc::O_RDWR      => Self::Write,
            _ if flags & modifying != 0         => Self::Write,
            _                                   => Self::Read,
        }
    }
}
