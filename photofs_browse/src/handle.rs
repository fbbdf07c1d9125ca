use std::fs::File;
use std::fs::OpenOptions;
use std::io::Error;
use std::io::ErrorKind::Interrupted;
use std::io::Result;
use std::os::unix::fs::FileExt;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::path::PathBuf;

/// Read-only handle to the original file behind a photo.
///
/// Reads are positional and do not move any shared file offset,
/// so one handle can serve concurrent readers.
/// The file itself is hidden because it must not be modified.
#[derive(Debug)]
pub struct PhotoHandle
{
    file: File,
    path: PathBuf,
    size: u64,
}

impl PhotoHandle
{
    /// Open the file at the given path for reading.
    ///
    /// Symbolic links are followed,
    /// as libraries may reference files stored elsewhere.
    pub(crate) fn open(path: &Path) -> Result<Self>
    {
        // O_CLOEXEC: Close the file if we spawn a subprocess.
        // O_NOCTTY:  Do not make any TTY become the controlling terminal.
        let open_flags = libc::O_CLOEXEC | libc::O_NOCTTY;

        let file =
            OpenOptions::new()
            .read(true)
            .custom_flags(open_flags)
            .open(path)?;

        // A catalog entry pointing at a directory is corrupt.
        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return Err(Error::from_raw_os_error(libc::EISDIR));
        }

        Ok(Self{file, path: path.to_path_buf(), size: metadata.len()})
    }

    /// Path of the original file.
    pub fn path(&self) -> &Path
    {
        &self.path
    }

    /// Size of the file in bytes at the time it was opened.
    pub fn size(&self) -> u64
    {
        self.size
    }

    /// Read up to `len` bytes starting at `offset`.
    ///
    /// Returns fewer bytes only at the end of the file.
    pub fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>>
    {
        let mut buf = vec![0; len];
        let mut filled = 0;
        while filled < len {
            let at = offset + filled as u64;
            match self.file.read_at(&mut buf[filled ..], at) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}
