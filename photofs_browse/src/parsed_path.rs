use photofs_tree::Namespace;

/// Abstract syntax tree for paths into the photo tree.
///
/// Parsing is purely syntactic: it checks the shape of the path
/// and the namespace name, but not whether collections or photos exist.
/// Our paths are always UTF-8 and always use forward solidi
/// as path separators, so parsing takes [`str`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParsedPath<'a>
{
    /// Path to the root directory.
    Root,

    /// Path to the `Albums` or `Rolls` directory.
    Namespace(Namespace),

    /// Path to a collection directory within a namespace.
    Collection(Namespace, &'a str),

    /// Path to a photo within a collection.
    Photo(Namespace, &'a str, &'a str),
}

/// Returned when a path could not be parsed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidPath;

impl<'a> ParsedPath<'a>
{
    /// Parse a slash-separated path.
    pub fn parse(path: &'a str) -> Result<Self, InvalidPath>
    {
        Self::from_components(path.split('/'))
            .ok_or(InvalidPath)
    }

    /// Parse a path from its sequence of components.
    ///
    /// Path components are the strings between the forward solidi.
    /// This function ignores empty components.
    pub fn from_components(components: impl IntoIterator<Item=&'a str>)
        -> Option<Self>
    {
        // Keep only non-empty components.
        let components = components.into_iter();
        let mut components = components.filter(|&c| c != "");

        let namespace = match components.next() {
            None       => return Some(Self::Root),
            Some(name) => Namespace::from_name(name)?,
        };

        match (components.next(), components.next(), components.next()) {
            (None,    _,       _   ) => Some(Self::Namespace(namespace)),
            (Some(c), None,    _   ) => Some(Self::Collection(namespace, c)),
            (Some(c), Some(p), None) => Some(Self::Photo(namespace, c, p)),
            (Some(_), Some(_), Some(_)) => None,
        }
    }
}
