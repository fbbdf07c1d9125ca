use photofs_catalog::Album;
use photofs_catalog::PhotoId;
use photofs_catalog::Roll;

/// A named, ordered sequence of photos.
///
/// This is the one shape the tree is built from.
/// Albums, rolls, and synthetic views all convert into it.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection
{
    /// Where the collection came from, e.g. `album:12` or `roll:7`.
    pub id: String,

    /// Directory name, before any collision suffix is applied.
    pub name: String,

    pub photos: Vec<PhotoId>,
}

impl Collection
{
    pub fn new(id: impl Into<String>,
               name: impl Into<String>,
               photos: Vec<PhotoId>) -> Self
    {
        Self{id: id.into(), name: name.into(), photos}
    }
}

impl From<&Album> for Collection
{
    fn from(album: &Album) -> Self
    {
        Self::new(format!("album:{}", album.id), &album.name,
                  album.photos.clone())
    }
}

impl From<&Roll> for Collection
{
    fn from(roll: &Roll) -> Self
    {
        Self::new(format!("roll:{}", roll.id), &roll.name,
                  roll.photos.clone())
    }
}
