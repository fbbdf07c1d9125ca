use crate::AlbumId;
use crate::PhotoId;
use crate::RollId;
use chrono::DateTime;
use chrono::Local;
use chrono::Utc;
use indexmap::IndexMap;
use std::path::Path;
use std::path::PathBuf;

/// All photos of a library, in catalog order.
pub type Photos = IndexMap<PhotoId, Photo>;

/// All rolls of a library, in catalog order.
pub type Rolls = IndexMap<RollId, Roll>;

/// All albums of a library, in catalog order.
pub type Albums = IndexMap<AlbumId, Album>;

/// A single photo (or other media item) in the library.
#[derive(Clone, Debug, PartialEq)]
pub struct Photo
{
    pub id: PhotoId,

    /// Absolute path to the original file on disk.
    pub path: PathBuf,

    /// Base name of the path declared by the catalog, e.g. `IMG_1201.JPG`.
    pub filename: String,

    /// When the photo was taken or imported.
    pub timestamp: DateTime<Utc>,

    pub flagged: bool,

    /// The roll the photo was imported with, if the catalog says so.
    pub roll: Option<RollId>,

    pub caption: Option<String>,
    pub guid: Option<String>,
    pub media_type: Option<String>,
}

impl Photo
{
    /// Create a photo record with only the required attributes set.
    /// The filename is derived from the base name of `path`.
    pub fn new(id: impl Into<PhotoId>,
               path: impl Into<PathBuf>,
               timestamp: DateTime<Utc>) -> Self
    {
        let path = path.into();
        let filename = base_name(&path);
        Self{
            id: id.into(),
            path,
            filename,
            timestamp,
            flagged: false,
            roll: None,
            caption: None,
            guid: None,
            media_type: None,
        }
    }
}

/// A date-grouped import session.
#[derive(Clone, Debug, PartialEq)]
pub struct Roll
{
    pub id: RollId,

    /// Roll date formatted as a calendar date, e.g. `Apr 24, 2012`.
    pub name: String,

    pub photos: Vec<PhotoId>,

    /// When the roll was imported.
    pub timestamp: DateTime<Utc>,
}

impl Roll
{
    /// Create a roll whose name is derived from its date.
    pub fn new(id: impl Into<RollId>,
               timestamp: DateTime<Utc>,
               photos: Vec<PhotoId>) -> Self
    {
        let name = roll_date_name(timestamp);
        Self{id: id.into(), name, photos, timestamp}
    }
}

/// A named grouping of photos.
/// The photos may come from any number of rolls.
#[derive(Clone, Debug, PartialEq)]
pub struct Album
{
    pub id: AlbumId,
    pub name: String,
    pub photos: Vec<PhotoId>,
}

/// Render a roll date the way rolls are named, e.g. `Apr 24, 2012`.
/// The date is taken in the local time zone,
/// which is the zone the photo library was used in.
pub fn roll_date_name(timestamp: DateTime<Utc>) -> String
{
    timestamp
        .with_timezone(&Local)
        .format("%b %-d, %Y")
        .to_string()
}

/// Final component of a path, or the empty string if there is none.
pub(crate) fn base_name(path: &Path) -> String
{
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests
{
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_photo_new()
    {
        let timestamp = Utc.with_ymd_and_hms(2012, 4, 24, 12, 0, 0).unwrap();
        let photo = Photo::new("1", "/lib/Masters/IMG_1201.JPG", timestamp);
        assert_eq!(photo.filename, "IMG_1201.JPG");
        assert!(!photo.flagged);
        assert_eq!(photo.roll, None);
    }

    #[test]
    fn test_roll_date_name()
    {
        // Noon UTC is the same calendar day in every time zone
        // within eleven hours of UTC.
        let examples = &[
            ((2012, 4, 24), "Apr 24, 2012"),
            ((2014, 7, 7), "Jul 7, 2014"),
            ((1999, 12, 31), "Dec 31, 1999"),
        ];
        for &((y, m, d), expected) in examples {
            let timestamp = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
            assert_eq!(roll_date_name(timestamp), expected);
        }
    }
}
