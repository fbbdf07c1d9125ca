use std::fmt;

/// One of the two top-level directories.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Namespace
{
    Albums,
    Rolls,
}

impl Namespace
{
    /// Both namespaces, in the order they are listed in the root.
    pub const ALL: [Self; 2] = [Self::Albums, Self::Rolls];

    pub fn name(self) -> &'static str
    {
        match self {
            Self::Albums => "Albums",
            Self::Rolls  => "Rolls",
        }
    }

    /// Look up a namespace by its exact, case-sensitive name.
    pub fn from_name(name: &str) -> Option<Self>
    {
        match name {
            "Albums" => Some(Self::Albums),
            "Rolls"  => Some(Self::Rolls),
            _        => None,
        }
    }
}

impl fmt::Display for Namespace
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        f.write_str(self.name())
    }
}
