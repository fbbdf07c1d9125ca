use crate::Album;
use crate::AlbumId;
use crate::Albums;
use crate::LoadError;
use crate::Photo;
use crate::PhotoId;
use crate::Photos;
use crate::Roll;
use crate::RollId;
use crate::Rolls;
use crate::record::base_name;
use chrono::DateTime;
use chrono::Utc;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;

/// Name of the catalog file inside the library directory.
pub const CATALOG_FILE: &str = "AlbumData.xml";

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z,
/// the epoch of the timer intervals stored in the catalog.
const TIMER_INTERVAL_EPOCH: i64 = 978_307_200;

/// Album types under which the catalog stores its own built-in views.
/// These are regenerated from the photos and rolls instead.
const BUILT_IN_ALBUM_TYPES: &[&str] =
    &["Master", "Flagged", "Special Month", "Special Roll"];

/// The parsed contents of a library.
#[derive(Clone, Debug)]
pub struct Catalog
{
    /// Absolute path to the library directory.
    pub root: PathBuf,

    pub photos: Photos,
    pub albums: Albums,
    pub rolls: Rolls,
}

impl Catalog
{
    /// Load the catalog of the library at the given path.
    ///
    /// Photo paths are resolved against the library directory,
    /// so libraries that were moved or restored from a backup
    /// still point at their own files.
    /// Whether those files exist is not checked here.
    pub fn load(library: impl AsRef<Path>) -> Result<Self, LoadError>
    {
        let library = library.as_ref();
        let root = fs::canonicalize(library)
            .map_err(|source| LoadError::Io{path: library.into(), source})?;

        let catalog_path = root.join(CATALOG_FILE);
        let file = File::open(&catalog_path)
            .map_err(|source| LoadError::Io{path: catalog_path.clone(), source})?;
        let data: AlbumData = plist::from_reader(BufReader::new(file))
            .map_err(|source| LoadError::Parse{path: catalog_path, source})?;

        let catalog = Self::from_album_data(root, data)?;
        info!(
            library = %catalog.root.display(),
            photos = catalog.photos.len(),
            albums = catalog.albums.len(),
            rolls = catalog.rolls.len(),
            "loaded catalog",
        );
        Ok(catalog)
    }

    /// Display name of the library: the directory name
    /// without its `.photolibrary` extension.
    pub fn name(&self) -> String
    {
        library_name(&self.root)
    }

    fn from_album_data(root: PathBuf, data: AlbumData)
        -> Result<Self, LoadError>
    {
        let mut rolls = Rolls::new();
        let mut owners = HashMap::new();
        for raw in data.rolls {
            let id = RollId(raw.id.into_string());
            let timestamp = raw.date.and_then(from_timer_interval)
                .ok_or_else(|| LoadError::MissingDate{
                    entity: format!("roll {}", id),
                })?;
            let photos: Vec<PhotoId> =
                raw.photos.into_iter().map(PhotoId).collect();
            for photo in &photos {
                owners.entry(photo.clone()).or_insert_with(|| id.clone());
            }
            let roll = Roll::new(id.clone(), timestamp, photos);
            rolls.insert(id, roll);
        }

        let mut photos = Photos::new();
        for (key, raw) in data.images {
            let id = PhotoId(key);
            let declared_roll = raw.roll;
            let roll = owners.get(&id).cloned()
                .or_else(|| declared_roll.map(|r| RollId(r.into_string())));

            // Fall back to the roll date for photos without a date.
            let roll_date = roll.as_ref()
                .and_then(|r| rolls.get(r))
                .map(|r| r.timestamp);
            let timestamp = raw.date.and_then(from_timer_interval)
                .or(roll_date)
                .ok_or_else(|| LoadError::MissingDate{
                    entity: format!("photo {}", id),
                })?;

            let declared = PathBuf::from(&raw.image_path);
            let photo = Photo{
                id: id.clone(),
                path: resolve_image_path(&root, &declared),
                filename: base_name(&declared),
                timestamp,
                flagged: raw.flagged,
                roll,
                caption: raw.caption,
                guid: raw.guid,
                media_type: raw.media_type,
            };
            photos.insert(id, photo);
        }

        let mut albums = Albums::new();
        for raw in data.albums {
            let id = AlbumId(raw.id.into_string());
            if let Some(kind) = &raw.kind {
                if BUILT_IN_ALBUM_TYPES.contains(&kind.as_str()) {
                    debug!(album = %id, name = %raw.name, kind = %kind,
                           "skipping built-in album");
                    continue;
                }
            }
            let photos = raw.photos.into_iter().map(PhotoId).collect();
            let album = Album{id: id.clone(), name: raw.name, photos};
            albums.insert(id, album);
        }

        Ok(Self{root, photos, albums, rolls})
    }
}

/// Display name of the library at the given path.
pub fn library_name(path: &Path) -> String
{
    let name = base_name(path);
    match name.strip_suffix(".photolibrary") {
        Some(stem) if !stem.is_empty() => stem.to_owned(),
        _ => name,
    }
}

/// Find the file behind a path declared in the catalog.
///
/// Relative paths are relative to the library directory.
/// Absolute paths are usually where the library lived
/// the last time it was opened by its owning application;
/// if such a path passes through a directory
/// with the same name as the library directory,
/// the part after it is re-rooted onto the library directory.
pub fn resolve_image_path(root: &Path, declared: &Path) -> PathBuf
{
    if declared.is_relative() {
        return root.join(declared);
    }

    let library = match root.file_name() {
        Some(name) => name,
        None => return declared.to_path_buf(),
    };

    let components: Vec<_> = declared.components().collect();
    match components.iter().rposition(|c| c.as_os_str() == library) {
        Some(i) => components[i + 1 ..].iter()
                       .fold(root.to_path_buf(), |p, c| p.join(c)),
        None => declared.to_path_buf(),
    }
}

/// Convert a catalog timer interval into a timestamp.
pub fn from_timer_interval(seconds: f64) -> Option<DateTime<Utc>>
{
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9) as u32;
    let secs = (whole as i64).checked_add(TIMER_INTERVAL_EPOCH)?;
    DateTime::from_timestamp(secs, nanos)
}

// Shape of `AlbumData.xml`. Keys not listed here are ignored.

#[derive(Deserialize)]
struct AlbumData
{
    #[serde(rename = "Master Image List", default)]
    images: IndexMap<String, RawImage>,

    #[serde(rename = "List of Rolls", default)]
    rolls: Vec<RawRoll>,

    #[serde(rename = "List of Albums", default)]
    albums: Vec<RawAlbum>,
}

#[derive(Deserialize)]
struct RawImage
{
    #[serde(rename = "ImagePath")]
    image_path: String,

    #[serde(rename = "DateAsTimerInterval")]
    date: Option<f64>,

    #[serde(rename = "Flagged", default)]
    flagged: bool,

    #[serde(rename = "Roll")]
    roll: Option<RawId>,

    #[serde(rename = "Caption")]
    caption: Option<String>,

    #[serde(rename = "GUID")]
    guid: Option<String>,

    #[serde(rename = "MediaType")]
    media_type: Option<String>,
}

#[derive(Deserialize)]
struct RawRoll
{
    #[serde(rename = "RollID")]
    id: RawId,

    #[serde(rename = "RollDateAsTimerInterval")]
    date: Option<f64>,

    #[serde(rename = "KeyList", default)]
    photos: Vec<String>,
}

#[derive(Deserialize)]
struct RawAlbum
{
    #[serde(rename = "AlbumId")]
    id: RawId,

    #[serde(rename = "AlbumName")]
    name: String,

    #[serde(rename = "Album Type")]
    kind: Option<String>,

    #[serde(rename = "KeyList", default)]
    photos: Vec<String>,
}

/// Identifiers are stored as integers by some catalog versions
/// and as strings by others.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId
{
    Integer(i64),
    String(String),
}

impl RawId
{
    fn into_string(self) -> String
    {
        match self {
            Self::Integer(i) => i.to_string(),
            Self::String(s)  => s,
        }
    }
}

#[cfg(test)]
mod tests
{
    use crate::TestData;
    use super::*;

    #[test]
    fn test_load()
    {
        let test_data = TestData::vacation().unwrap();
        let catalog = Catalog::load(test_data.root()).unwrap();

        // Photos come out in document order.
        let ids: Vec<_> = catalog.photos.keys().map(|i| i.as_str()).collect();
        assert_eq!(ids, ["1201", "1202", "1203", "1204"]);

        let photo = &catalog.photos[&PhotoId::from("1202")];
        assert_eq!(photo.filename, "IMG_1202.JPG");
        assert_eq!(photo.path, test_data.root().join("Masters/IMG_1202.JPG"));
        assert_eq!(photo.roll, Some(RollId::from("7")));
        assert_eq!(photo.caption.as_deref(), Some("Beach"));

        assert_eq!(catalog.rolls.len(), 1);
        let roll = &catalog.rolls[&RollId::from("7")];
        assert_eq!(roll.name, "Apr 24, 2012");
        assert_eq!(roll.photos.len(), 4);

        // The built-in "Photos" album is not carried over.
        let names: Vec<_> = catalog.albums.values()
                                   .map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Vacation"]);

        assert_eq!(catalog.name(), "Vacation");
    }

    #[test]
    fn test_load_declared_roll()
    {
        // Photo 1 is in no roll's key list, has no date of its own,
        // and names its roll directly.
        let catalog = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
	<key>List of Rolls</key>
	<array>
		<dict>
			<key>RollID</key>
			<string>3</string>
			<key>RollDateAsTimerInterval</key>
			<real>356961600</real>
		</dict>
	</array>
	<key>Master Image List</key>
	<dict>
		<key>1</key>
		<dict>
			<key>ImagePath</key>
			<string>Masters/IMG_1.JPG</string>
			<key>Roll</key>
			<integer>3</integer>
			<key>Caption</key>
			<string>Dune</string>
			<key>MediaType</key>
			<string>Image</string>
		</dict>
	</dict>
</dict>
</plist>
"#;
        let test_data = TestData::with_catalog(catalog).unwrap();
        let catalog = Catalog::load(test_data.root()).unwrap();

        let photo = &catalog.photos[&PhotoId::from("1")];
        assert_eq!(photo.roll, Some(RollId::from("3")));
        assert_eq!(photo.timestamp,
                   from_timer_interval(crate::APR_24_2012).unwrap());
        assert_eq!(photo.caption.as_deref(), Some("Dune"));
        assert_eq!(photo.media_type.as_deref(), Some("Image"));
    }

    #[test]
    fn test_load_missing()
    {
        let dir = tempfile::tempdir().unwrap();
        let result = Catalog::load(dir.path().join("Nope.photolibrary"));
        assert!(matches!(result, Err(LoadError::Io{..})));

        // Existing directory, but without a catalog.
        let result = Catalog::load(dir.path());
        assert!(matches!(result, Err(LoadError::Io{..})));
    }

    #[test]
    fn test_load_unparsable()
    {
        let test_data = TestData::with_catalog("<plist><dict>").unwrap();
        let result = Catalog::load(test_data.root());
        assert!(matches!(result, Err(LoadError::Parse{..})));
    }

    #[test]
    fn test_library_name()
    {
        let examples = &[
            ("/Users/rob/Pictures/Vacation.photolibrary", "Vacation"),
            ("/Users/rob/Pictures/iPhoto Library", "iPhoto Library"),
            ("/x/.photolibrary", ".photolibrary"),
        ];
        for &(path, expected) in examples {
            assert_eq!(library_name(Path::new(path)), expected);
        }
    }

    #[test]
    fn test_resolve_image_path()
    {
        let root = Path::new("/Volumes/Backup/Colorado.photolibrary");
        let examples = &[
            // Relative to the library.
            ("Masters/2014/IMG_1.JPG",
             "/Volumes/Backup/Colorado.photolibrary/Masters/2014/IMG_1.JPG"),
            // Re-rooted from where the library used to live.
            ("/Users/rob/Pictures/Colorado.photolibrary/Masters/IMG_2.JPG",
             "/Volumes/Backup/Colorado.photolibrary/Masters/IMG_2.JPG"),
            // Referenced file outside of any library.
            ("/Users/rob/Desktop/IMG_3.JPG",
             "/Users/rob/Desktop/IMG_3.JPG"),
        ];
        for &(declared, expected) in examples {
            let actual = resolve_image_path(root, Path::new(declared));
            assert_eq!(actual, Path::new(expected));
        }
    }

    #[test]
    fn test_from_timer_interval()
    {
        let epoch = from_timer_interval(0.0).unwrap();
        assert_eq!(epoch.to_rfc3339(), "2001-01-01T00:00:00+00:00");
        let later = from_timer_interval(356_961_600.5).unwrap();
        assert_eq!(later.to_rfc3339(), "2012-04-24T12:00:00.500+00:00");
        assert_eq!(from_timer_interval(f64::NAN), None);
    }
}
