use crate::CATALOG_FILE;
use std::fs;
use std::io::Result;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// Timer interval of 2012-04-24T12:00:00Z.
pub const APR_24_2012: f64 = 356_961_600.0;

/// A photo library on disk, removed when dropped.
pub struct TestData
{
    _dir: TempDir,
    root: PathBuf,
}

impl TestData
{
    /// Create an empty library directory holding the given catalog.
    pub fn with_catalog(catalog: &str) -> Result<Self>
    {
        let dir = tempfile::tempdir()?;
        let root = dir.path().join("Vacation.photolibrary");
        fs::create_dir(&root)?;
        let root = fs::canonicalize(root)?;
        fs::write(root.join(CATALOG_FILE), catalog)?;
        Ok(Self{_dir: dir, root})
    }

    /// A library with photos `IMG_1201.JPG` through `IMG_1204.JPG`,
    /// none flagged, all in one roll dated Apr 24, 2012.
    /// The catalog has the built-in "Photos" album
    /// and a regular album "Vacation" with the odd-numbered photos.
    /// The first photo has an absolute path
    /// from where the library used to live.
    pub fn vacation() -> Result<Self>
    {
        let test_data = Self::with_catalog(VACATION)?;
        for n in 1201 ..= 1204 {
            let name = format!("IMG_{}.JPG", n);
            test_data.write_photo(&name, format!("jpeg {}", n).as_bytes())?;
        }
        Ok(test_data)
    }

    /// Absolute, canonical path to the library directory.
    pub fn root(&self) -> &Path
    {
        &self.root
    }

    /// Path at which [`TestData::write_photo`] stores a file.
    pub fn photo_path(&self, name: &str) -> PathBuf
    {
        self.root.join("Masters").join(name)
    }

    /// Store an original file in the library's `Masters` directory.
    pub fn write_photo(&self, name: &str, contents: &[u8]) -> Result<PathBuf>
    {
        let path = self.photo_path(name);
        fs::create_dir_all(self.root.join("Masters"))?;
        fs::write(&path, contents)?;
        Ok(path)
    }
}

const VACATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>Application Version</key>
	<string>9.6.1 (9.6.1)</string>
	<key>List of Albums</key>
	<array>
		<dict>
			<key>AlbumId</key>
			<integer>999000</integer>
			<key>AlbumName</key>
			<string>Photos</string>
			<key>Album Type</key>
			<string>Master</string>
			<key>KeyList</key>
			<array>
				<string>1201</string>
				<string>1202</string>
				<string>1203</string>
				<string>1204</string>
			</array>
		</dict>
		<dict>
			<key>AlbumId</key>
			<integer>12</integer>
			<key>AlbumName</key>
			<string>Vacation</string>
			<key>Album Type</key>
			<string>Regular</string>
			<key>KeyList</key>
			<array>
				<string>1201</string>
				<string>1203</string>
			</array>
		</dict>
	</array>
	<key>List of Rolls</key>
	<array>
		<dict>
			<key>RollID</key>
			<integer>7</integer>
			<key>RollName</key>
			<string>Apr 24, 2012</string>
			<key>RollDateAsTimerInterval</key>
			<real>356961600</real>
			<key>KeyList</key>
			<array>
				<string>1201</string>
				<string>1202</string>
				<string>1203</string>
				<string>1204</string>
			</array>
		</dict>
	</array>
	<key>Master Image List</key>
	<dict>
		<key>1201</key>
		<dict>
			<key>MediaType</key>
			<string>Image</string>
			<key>ImagePath</key>
			<string>/Users/rob/Pictures/Vacation.photolibrary/Masters/IMG_1201.JPG</string>
			<key>DateAsTimerInterval</key>
			<real>356961600</real>
			<key>GUID</key>
			<string>A1</string>
		</dict>
		<key>1202</key>
		<dict>
			<key>MediaType</key>
			<string>Image</string>
			<key>Caption</key>
			<string>Beach</string>
			<key>ImagePath</key>
			<string>Masters/IMG_1202.JPG</string>
			<key>DateAsTimerInterval</key>
			<real>356961660</real>
			<key>Roll</key>
			<integer>7</integer>
		</dict>
		<key>1203</key>
		<dict>
			<key>ImagePath</key>
			<string>Masters/IMG_1203.JPG</string>
			<key>DateAsTimerInterval</key>
			<real>356961720</real>
			<key>Flagged</key>
			<false/>
		</dict>
		<key>1204</key>
		<dict>
			<key>ImagePath</key>
			<string>Masters/IMG_1204.JPG</string>
		</dict>
	</dict>
</dict>
</plist>
"#;
