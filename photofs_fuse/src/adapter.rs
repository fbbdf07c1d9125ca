use crate::Inodes;
use fuser::FileAttr;
use fuser::FileType;
use fuser::Filesystem;
use fuser::KernelConfig;
use fuser::ReplyAttr;
use fuser::ReplyCreate;
use fuser::ReplyData;
use fuser::ReplyDirectory;
use fuser::ReplyEmpty;
use fuser::ReplyEntry;
use fuser::ReplyOpen;
use fuser::ReplyStatfs;
use fuser::ReplyWrite;
use fuser::Request;
use fuser::TimeOrNow;
use photofs_browse::Attributes;
use photofs_browse::BrowseError;
use photofs_browse::Intent;
use photofs_browse::Kind;
use photofs_browse::Mutation;
use photofs_browse::PhotoHandle;
use photofs_browse::Resolver;
use photofs_tree::Node;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::os::raw::c_int;
use std::path::Path;
use std::time::Duration;
use std::time::SystemTime;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

/// Block size reported in attributes and by `statfs`.
const BLOCK_SIZE: u32 = 4096;

/// Longest name `statfs` admits to.
const NAME_MAX: u32 = 255;

/// Error number to reply with.
pub type Errno = c_int;

/// One entry of a directory listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirEntry
{
    pub ino: u64,
    pub kind: FileType,
    pub name: String,
}

/// Kernel-facing file system over a [`Resolver`].
///
/// The tree never changes once mounted, so inode numbers
/// are assigned up front; only open file handles are tracked here.
pub struct PhotoFs
{
    resolver: Resolver,
    inodes: Inodes,
    handles: HashMap<u64, PhotoHandle>,
    next_fh: u64,
    ttl: Duration,
    uid: u32,
    gid: u32,
}

impl PhotoFs
{
    /// Entries are owned by whoever mounts the file system.
    pub fn new(resolver: Resolver, ttl: Duration) -> Self
    {
        // SAFETY: getuid and getgid cannot fail.
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
        let inodes = Inodes::new(resolver.index());
        Self{resolver, inodes, handles: HashMap::new(), next_fh: 1,
             ttl, uid, gid}
    }

    pub fn resolver(&self) -> &Resolver
    {
        &self.resolver
    }

    fn node(&self, ino: u64) -> Result<Node, Errno>
    {
        self.inodes.node(ino).ok_or(libc::ENOENT)
    }

    fn ino(&self, node: Node) -> Result<u64, Errno>
    {
        self.inodes.ino(node).ok_or(libc::ENOENT)
    }

    /// Attributes of the entry named `name` in directory `parent`.
    pub fn lookup_entry(&self, parent: u64, name: &OsStr)
        -> Result<FileAttr, Errno>
    {
        let parent = self.node(parent)?;
        let name = name.to_str().ok_or(libc::ENOENT)?;
        let node = self.resolver.child(parent, name)
            .map_err(|err| report(&err))?;
        self.attributes(node)
    }

    /// Attributes of an inode.
    pub fn attributes_of(&self, ino: u64) -> Result<FileAttr, Errno>
    {
        let node = self.node(ino)?;
        self.attributes(node)
    }

    fn attributes(&self, node: Node) -> Result<FileAttr, Errno>
    {
        let ino = self.ino(node)?;
        let attributes = self.resolver.attributes_of(node)
            .map_err(|err| report(&err))?;
        Ok(file_attr(ino, &attributes, self.uid, self.gid))
    }

    /// Entries of a directory, starting with `.` and `..`.
    pub fn dir_entries(&self, ino: u64) -> Result<Vec<DirEntry>, Errno>
    {
        let node = self.node(ino)?;
        let children = self.resolver.children(node)
            .map_err(|err| report(&err))?;

        let mut entries = Vec::with_capacity(children.len() + 2);
        entries.push(DirEntry{ino, kind: FileType::Directory,
                              name: ".".to_owned()});
        entries.push(DirEntry{ino: self.ino(node.parent())?,
                              kind: FileType::Directory,
                              name: "..".to_owned()});
        for (child, name) in children {
            let kind = if child.is_directory() { FileType::Directory }
                       else { FileType::RegularFile };
            entries.push(DirEntry{ino: self.ino(child)?, kind,
                                  name: name.to_owned()});
        }
        Ok(entries)
    }

    /// Open a photo and return its file handle number.
    pub fn open_handle(&mut self, ino: u64, flags: c_int) -> Result<u64, Errno>
    {
        let node = self.node(ino)?;
        let intent = Intent::from_open_flags(flags);
        let handle = self.resolver.open(node, intent)
            .map_err(|err| report(&err))?;
        let fh = self.next_fh;
        self.next_fh += 1;
        self.handles.insert(fh, handle);
        Ok(fh)
    }

    /// Read from an open handle.
    /// Reading past the end of the file yields fewer bytes, or none.
    pub fn read_handle(&self, fh: u64, offset: i64, size: u32)
        -> Result<Vec<u8>, Errno>
    {
        let handle = self.handles.get(&fh).ok_or(libc::EBADF)?;
        if offset < 0 {
            return Err(libc::EINVAL);
        }
        handle.read_at(offset as u64, size as usize)
            .map_err(|source| {
                let err = BrowseError::UnderlyingIo{
                    path: handle.path().to_owned(),
                    source,
                };
                report(&err)
            })
    }

    /// Forget a handle; returns whether it was open.
    pub fn close_handle(&mut self, fh: u64) -> bool
    {
        self.handles.remove(&fh).is_some()
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize
    {
        self.handles.len()
    }

    /// Refuse a change to the entry `name` in `parent`,
    /// or to `parent` itself when there is no name.
    pub fn reject(&self, parent: u64, name: Option<&OsStr>,
                  mutation: Mutation) -> Errno
    {
        let directory = match self.inodes.node(parent) {
            Some(node) => self.resolver.display(node),
            None => format!("inode {}", parent),
        };
        let path = match name {
            Some(name) => Path::new(&directory).join(name),
            None => Path::new(&directory).to_owned(),
        };
        match self.resolver.reject(&path.to_string_lossy(), mutation) {
            Ok(()) => 0,
            Err(err) => err.errno(),
        }
    }
}

fn report(err: &BrowseError) -> Errno
{
    match err {
        BrowseError::NotFound(path) =>
            trace!(path = %path, "no such entry"),
        BrowseError::UnderlyingIo{..} =>
            warn!(error = %err, "cannot access original"),
        _ =>
            debug!(error = %err, "request failed"),
    }
    err.errno()
}

/// Convert attributes into what the kernel expects.
pub fn file_attr(ino: u64, attributes: &Attributes, uid: u32, gid: u32)
    -> FileAttr
{
    let kind = match attributes.kind {
        Kind::Directory => FileType::Directory,
        Kind::File      => FileType::RegularFile,
    };
    let time = attributes.modified;
    FileAttr{
        ino,
        size: attributes.size,
        blocks: (attributes.size + 511) / 512,
        atime: time,
        mtime: time,
        ctime: time,
        crtime: time,
        kind,
        perm: attributes.permissions,
        nlink: attributes.links,
        uid,
        gid,
        rdev: 0,
        blksize: BLOCK_SIZE,
        flags: 0,
    }
}

impl Filesystem for PhotoFs
{
    fn init(&mut self, _req: &Request, _config: &mut KernelConfig)
        -> Result<(), c_int>
    {
        info!(entries = self.inodes.len(), "file system ready");
        Ok(())
    }

    fn destroy(&mut self)
    {
        info!(open_handles = self.handles.len(), "file system unmounted");
    }

    fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr,
              reply: ReplyEntry)
    {
        trace!(parent, ?name, "lookup");
        match self.lookup_entry(parent, name) {
            Ok(attr) => reply.entry(&self.ttl, &attr, 0),
            Err(errno) => reply.error(errno),
        }
    }

    fn getattr(&mut self, _req: &Request, ino: u64, _fh: Option<u64>,
               reply: ReplyAttr)
    {
        trace!(ino, "getattr");
        match self.attributes_of(ino) {
            Ok(attr) => reply.attr(&self.ttl, &attr),
            Err(errno) => reply.error(errno),
        }
    }

    fn setattr(&mut self, _req: &Request, ino: u64, _mode: Option<u32>,
               _uid: Option<u32>, _gid: Option<u32>, _size: Option<u64>,
               _atime: Option<TimeOrNow>, _mtime: Option<TimeOrNow>,
               _ctime: Option<SystemTime>, _fh: Option<u64>,
               _crtime: Option<SystemTime>, _chgtime: Option<SystemTime>,
               _bkuptime: Option<SystemTime>, _flags: Option<u32>,
               reply: ReplyAttr)
    {
        reply.error(self.reject(ino, None, Mutation::SetAttributes));
    }

    fn mknod(&mut self, _req: &Request, parent: u64, name: &OsStr,
             _mode: u32, _umask: u32, _rdev: u32, reply: ReplyEntry)
    {
        reply.error(self.reject(parent, Some(name), Mutation::MakeNode));
    }

    fn mkdir(&mut self, _req: &Request, parent: u64, name: &OsStr,
             _mode: u32, _umask: u32, reply: ReplyEntry)
    {
        reply.error(self.reject(parent, Some(name), Mutation::MakeDirectory));
    }

    fn unlink(&mut self, _req: &Request, parent: u64, name: &OsStr,
              reply: ReplyEmpty)
    {
        reply.error(self.reject(parent, Some(name), Mutation::Remove));
    }

    fn rmdir(&mut self, _req: &Request, parent: u64, name: &OsStr,
             reply: ReplyEmpty)
    {
        reply.error(self.reject(parent, Some(name),
                                Mutation::RemoveDirectory));
    }

    fn symlink(&mut self, _req: &Request, parent: u64, link_name: &OsStr,
               _target: &Path, reply: ReplyEntry)
    {
        reply.error(self.reject(parent, Some(link_name), Mutation::Symlink));
    }

    fn rename(&mut self, _req: &Request, parent: u64, name: &OsStr,
              _newparent: u64, _newname: &OsStr, _flags: u32,
              reply: ReplyEmpty)
    {
        reply.error(self.reject(parent, Some(name), Mutation::Rename));
    }

    fn link(&mut self, _req: &Request, _ino: u64, newparent: u64,
            newname: &OsStr, reply: ReplyEntry)
    {
        reply.error(self.reject(newparent, Some(newname), Mutation::Link));
    }

    fn open(&mut self, _req: &Request, ino: u64, flags: i32,
            reply: ReplyOpen)
    {
        debug!(ino, flags = format_args!("{:#x}", flags), "open");
        match self.open_handle(ino, flags) {
            Ok(fh) => reply.opened(fh, 0),
            Err(errno) => reply.error(errno),
        }
    }

    fn read(&mut self, _req: &Request, _ino: u64, fh: u64, offset: i64,
            size: u32, _flags: i32, _lock_owner: Option<u64>,
            reply: ReplyData)
    {
        trace!(fh, offset, size, "read");
        match self.read_handle(fh, offset, size) {
            Ok(data) => reply.data(&data),
            Err(errno) => reply.error(errno),
        }
    }

    fn write(&mut self, _req: &Request, ino: u64, _fh: u64, _offset: i64,
             _data: &[u8], _write_flags: u32, _flags: i32,
             _lock_owner: Option<u64>, reply: ReplyWrite)
    {
        reply.error(self.reject(ino, None, Mutation::Write));
    }

    fn release(&mut self, _req: &Request, _ino: u64, fh: u64, _flags: i32,
               _lock_owner: Option<u64>, _flush: bool, reply: ReplyEmpty)
    {
        if !self.close_handle(fh) {
            warn!(fh, "released unknown handle");
        }
        reply.ok();
    }

    fn opendir(&mut self, _req: &Request, ino: u64, _flags: i32,
               reply: ReplyOpen)
    {
        match self.node(ino) {
            Ok(node) if node.is_directory() => reply.opened(0, 0),
            Ok(_) => reply.error(libc::ENOTDIR),
            Err(errno) => reply.error(errno),
        }
    }

    fn readdir(&mut self, _req: &Request, ino: u64, _fh: u64, offset: i64,
               mut reply: ReplyDirectory)
    {
        trace!(ino, offset, "readdir");
        let entries = match self.dir_entries(ino) {
            Ok(entries) => entries,
            Err(errno) => return reply.error(errno),
        };
        let skip = offset.max(0) as usize;
        for (i, entry) in entries.into_iter().enumerate().skip(skip) {
            // The offset passed back is that of the next entry.
            if reply.add(entry.ino, (i + 1) as i64, entry.kind, &entry.name) {
                break;
            }
        }
        reply.ok();
    }

    fn releasedir(&mut self, _req: &Request, _ino: u64, _fh: u64,
                  _flags: i32, reply: ReplyEmpty)
    {
        reply.ok();
    }

    fn statfs(&mut self, _req: &Request, _ino: u64, reply: ReplyStatfs)
    {
        let files = self.inodes.len() as u64;
        reply.statfs(0, 0, 0, files, 0, BLOCK_SIZE, NAME_MAX, BLOCK_SIZE);
    }

    fn setxattr(&mut self, _req: &Request, ino: u64, _name: &OsStr,
                _value: &[u8], _flags: i32, _position: u32,
                reply: ReplyEmpty)
    {
        reply.error(self.reject(ino, None, Mutation::SetExtendedAttribute));
    }

    fn removexattr(&mut self, _req: &Request, ino: u64, _name: &OsStr,
                   reply: ReplyEmpty)
    {
        reply.error(self.reject(ino, None,
                                Mutation::RemoveExtendedAttribute));
    }

    fn access(&mut self, _req: &Request, ino: u64, mask: i32,
              reply: ReplyEmpty)
    {
        if let Err(errno) = self.node(ino) {
            return reply.error(errno);
        }
        if mask & libc::W_OK != 0 {
            return reply.error(libc::EROFS);
        }
        reply.ok();
    }

    fn create(&mut self, _req: &Request, parent: u64, name: &OsStr,
              _mode: u32, _umask: u32, _flags: i32, reply: ReplyCreate)
    {
        reply.error(self.reject(parent, Some(name), Mutation::Create));
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::ROOT_INO;
    use chrono::TimeZone;
    use chrono::Utc;
    use photofs_browse::DIRECTORY_PERMISSIONS;
    use photofs_browse::FILE_PERMISSIONS;
    use photofs_catalog::Catalog;
    use photofs_catalog::TestData;
    use photofs_tree::TreeIndex;
    use photofs_tree::synthetic::standard_generators;
    use std::fs;
    use std::sync::Arc;

    fn photo_fs(test_data: &TestData) -> PhotoFs
    {
        let catalog = Catalog::load(test_data.root()).unwrap();
        let now = Utc.with_ymd_and_hms(2012, 5, 1, 0, 0, 0).unwrap();
        let index = TreeIndex::from_catalog(catalog,
                                            &standard_generators(now))
                    .unwrap();
        let resolver = Resolver::new(Arc::new(index));
        PhotoFs::new(resolver, Duration::from_secs(1))
    }

    fn lookup(fs: &PhotoFs, path: &[&str]) -> Result<FileAttr, Errno>
    {
        let mut attr = fs.attributes_of(ROOT_INO)?;
        for name in path {
            attr = fs.lookup_entry(attr.ino, OsStr::new(name))?;
        }
        Ok(attr)
    }

    fn names(entries: &[DirEntry]) -> Vec<&str>
    {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_lookup()
    {
        let test_data = TestData::vacation().unwrap();
        let fs = photo_fs(&test_data);

        let root = fs.attributes_of(ROOT_INO).unwrap();
        assert_eq!(root.kind, FileType::Directory);
        assert_eq!(root.perm, DIRECTORY_PERMISSIONS);
        assert_eq!(root.nlink, 4);

        let photo = lookup(&fs, &["Albums", "Vacation", "IMG_1203.JPG"])
                    .unwrap();
        assert_eq!(photo.kind, FileType::RegularFile);
        assert_eq!(photo.perm, FILE_PERMISSIONS);
        assert_eq!(photo.size, b"jpeg 1203".len() as u64);
        assert_eq!(photo.blocks, 1);
        assert_eq!(photo.nlink, 1);

        let examples: &[(&[&str], Errno)] = &[
            (&["Pictures"], libc::ENOENT),
            (&["albums"], libc::ENOENT),
            (&["Albums", "Vacation", "IMG_1202.JPG"], libc::ENOENT),
            (&["Albums", "Vacation", "IMG_1203.JPG", "x"], libc::ENOTDIR),
        ];
        for &(path, errno) in examples {
            assert_eq!(lookup(&fs, path).unwrap_err(), errno, "{:?}", path);
        }
        assert_eq!(fs.attributes_of(0).unwrap_err(), libc::ENOENT);
    }

    #[test]
    fn test_dir_entries()
    {
        let test_data = TestData::vacation().unwrap();
        let fs = photo_fs(&test_data);

        let root = fs.dir_entries(ROOT_INO).unwrap();
        assert_eq!(names(&root), [".", "..", "Albums", "Rolls"]);
        assert_eq!(root[0].ino, ROOT_INO);
        assert_eq!(root[1].ino, ROOT_INO);

        let rolls = lookup(&fs, &["Rolls"]).unwrap();
        let roll = lookup(&fs, &["Rolls", "Apr 24, 2012"]).unwrap();
        let entries = fs.dir_entries(roll.ino).unwrap();
        assert_eq!(names(&entries),
                   [".", "..", "IMG_1201.JPG", "IMG_1202.JPG",
                    "IMG_1203.JPG", "IMG_1204.JPG"]);
        assert_eq!(entries[1].ino, rolls.ino);
        assert!(entries[2 ..].iter().all(|e| e.kind == FileType::RegularFile));

        // The numbers in a listing agree with lookups.
        let photo = lookup(&fs, &["Rolls", "Apr 24, 2012", "IMG_1202.JPG"])
                    .unwrap();
        assert_eq!(entries[3].ino, photo.ino);

        assert_eq!(fs.dir_entries(photo.ino).unwrap_err(), libc::ENOTDIR);
    }

    #[test]
    fn test_open_read_release()
    {
        let test_data = TestData::vacation().unwrap();
        let mut fs = photo_fs(&test_data);
        let photo = lookup(&fs, &["Albums", "Photos", "IMG_1202.JPG"])
                    .unwrap();

        let fh = fs.open_handle(photo.ino, libc::O_RDONLY).unwrap();
        assert_eq!(fs.read_handle(fh, 0, 4096).unwrap(), b"jpeg 1202");
        assert_eq!(fs.read_handle(fh, 5, 2).unwrap(), b"12");
        assert!(fs.read_handle(fh, 100, 10).unwrap().is_empty());
        assert_eq!(fs.read_handle(fh, -1, 10).unwrap_err(), libc::EINVAL);

        assert!(fs.close_handle(fh));
        assert!(!fs.close_handle(fh));
        assert_eq!(fs.read_handle(fh, 0, 10).unwrap_err(), libc::EBADF);
        assert_eq!(fs.open_handles(), 0);
    }

    #[test]
    fn test_open_errors()
    {
        let test_data = TestData::vacation().unwrap();
        let mut fs = photo_fs(&test_data);
        let photo = lookup(&fs, &["Albums", "Photos", "IMG_1204.JPG"])
                    .unwrap();
        let album = lookup(&fs, &["Albums", "Photos"]).unwrap();

        let examples = &[
            (photo.ino, libc::O_WRONLY, libc::EROFS),
            (photo.ino, libc::O_RDWR, libc::EROFS),
            (photo.ino, libc::O_RDONLY | libc::O_TRUNC, libc::EROFS),
            (album.ino, libc::O_RDONLY, libc::EISDIR),
            (album.ino, libc::O_WRONLY, libc::EROFS),
        ];
        for &(ino, flags, errno) in examples {
            assert_eq!(fs.open_handle(ino, flags).unwrap_err(), errno,
                       "ino {} flags {:#x}", ino, flags);
        }

        fs::remove_file(test_data.photo_path("IMG_1204.JPG")).unwrap();
        assert_eq!(fs.open_handle(photo.ino, libc::O_RDONLY).unwrap_err(),
                   libc::ENOENT);
        assert_eq!(fs.attributes_of(photo.ino).unwrap_err(), libc::ENOENT);
        assert_eq!(fs.open_handles(), 0);
    }

    #[test]
    fn test_reject()
    {
        let test_data = TestData::vacation().unwrap();
        let fs = photo_fs(&test_data);
        let album = lookup(&fs, &["Albums", "Vacation"]).unwrap();

        let mutations = &[
            Mutation::Create,
            Mutation::MakeDirectory,
            Mutation::Remove,
            Mutation::Rename,
            Mutation::SetAttributes,
        ];
        for &mutation in mutations {
            let name = OsStr::new("IMG_1201.JPG");
            assert_eq!(fs.reject(album.ino, Some(name), mutation),
                       libc::EROFS);
        }
        assert_eq!(fs.reject(999_999, None, Mutation::Write), libc::EROFS);

        let entries = fs.dir_entries(album.ino).unwrap();
        assert_eq!(names(&entries),
                   [".", "..", "IMG_1201.JPG", "IMG_1203.JPG"]);
    }
}
