use std::fmt;

macro_rules! identifier
{
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        ///
        /// Identifiers are opaque strings taken verbatim from the catalog.
        /// Their [`Ord`] impl is plain lexicographic string order.
        #[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $name(pub String);

        impl $name
        {
            pub fn as_str(&self) -> &str
            {
                &self.0
            }
        }

        impl fmt::Display for $name
        {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
            {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name
        {
            fn from(s: &str) -> Self
            {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name
        {
            fn from(s: String) -> Self
            {
                Self(s)
            }
        }
    };
}

identifier!(
    /// Identifier of a photo, unique within its library.
    PhotoId
);

identifier!(
    /// Identifier of a roll, unique within its library.
    RollId
);

identifier!(
    /// Identifier of an album, unique within its library.
    AlbumId
);
