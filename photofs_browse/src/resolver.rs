use crate::Attributes;
use crate::BrowseError;
use crate::DIRECTORY_PERMISSIONS;
use crate::DIRECTORY_SIZE;
use crate::FILE_PERMISSIONS;
use crate::Intent;
use crate::Kind;
use crate::Mutation;
use crate::ParsedPath;
use crate::PhotoHandle;
use photofs_tree::Namespace;
use photofs_tree::Node;
use photofs_tree::TreeIndex;
use std::fs;
use std::io::ErrorKind::NotFound;
use std::sync::Arc;
use tracing::debug;
use tracing::warn;

/// The query surface over a built tree.
///
/// A resolver is a cheap, cloneable handle to a shared [`TreeIndex`].
/// All operations take `&self` and never modify the tree,
/// so any number of threads may use clones of one resolver at once.
#[derive(Clone, Debug)]
pub struct Resolver
{
    index: Arc<TreeIndex>,
}

impl Resolver
{
    pub fn new(index: Arc<TreeIndex>) -> Self
    {
        Self{index}
    }

    pub fn index(&self) -> &TreeIndex
    {
        &self.index
    }

    /// Find the node at a slash-separated path.
    pub fn resolve(&self, path: &str) -> Result<Node, BrowseError>
    {
        let not_found = || BrowseError::NotFound(path.to_owned());
        let parsed = ParsedPath::parse(path).map_err(|_| not_found())?;
        let node = match parsed {
            ParsedPath::Root =>
                Some(Node::Root),
            ParsedPath::Namespace(ns) =>
                Some(Node::Namespace(ns)),
            ParsedPath::Collection(ns, collection) =>
                self.index.find_collection(ns, collection),
            ParsedPath::Photo(ns, collection, filename) =>
                match self.index.find_collection(ns, collection) {
                    Some(Node::Collection(_, c)) =>
                        self.index.find_photo(ns, c, filename),
                    _ => None,
                },
        };
        node.ok_or_else(not_found)
    }

    /// Find the entry with the given name directly inside a directory.
    pub fn child(&self, node: Node, name: &str) -> Result<Node, BrowseError>
    {
        let found = match node {
            Node::Root =>
                Namespace::from_name(name).map(Node::Namespace),
            Node::Namespace(ns) =>
                self.index.find_collection(ns, name),
            Node::Collection(ns, c) =>
                self.index.find_photo(ns, c, name),
            Node::Photo(..) =>
                return Err(not_a_directory("look up")),
        };
        found.ok_or_else(|| {
            let parent = self.display(node);
            let parent = parent.trim_end_matches('/');
            BrowseError::NotFound(format!("{}/{}", parent, name))
        })
    }

    /// The entries of a directory with their names, in listing order.
    pub fn children(&self, node: Node)
        -> Result<Vec<(Node, &str)>, BrowseError>
    {
        if !node.is_directory() {
            return Err(not_a_directory("list"));
        }
        let children = self.index.children(node)
            .ok_or_else(|| self.stale(node))?;
        children
            .into_iter()
            .map(|child| {
                let name = self.index.name(child)
                    .ok_or_else(|| self.stale(child))?;
                Ok((child, name))
            })
            .collect()
    }

    /// The names of the entries of a directory, in listing order.
    ///
    /// Listings never change for the lifetime of the tree.
    pub fn list_children(&self, node: Node)
        -> Result<Vec<&str>, BrowseError>
    {
        let children = self.children(node)?;
        Ok(children.into_iter().map(|(_, name)| name).collect())
    }

    /// Attributes of an entry.
    ///
    /// Directories are synthetic and all look alike.
    /// Photos report the size and modification time
    /// of their original file, read afresh on every call.
    pub fn attributes_of(&self, node: Node)
        -> Result<Attributes, BrowseError>
    {
        let subdirectories = match node {
            Node::Root => Namespace::ALL.len(),
            Node::Namespace(ns) => self.index.collections(ns).len(),
            Node::Collection(ns, c) => {
                self.index.collection(ns, c)
                    .ok_or_else(|| self.stale(node))?;
                0
            },
            Node::Photo(..) => return self.photo_attributes(node),
        };
        Ok(Attributes{
            kind: Kind::Directory,
            size: DIRECTORY_SIZE,
            modified: self.index.built_at(),
            permissions: DIRECTORY_PERMISSIONS,
            links: 2 + subdirectories as u32,
        })
    }

    fn photo_attributes(&self, node: Node)
        -> Result<Attributes, BrowseError>
    {
        let (_, photo) = self.index.photo(node)
            .ok_or_else(|| self.stale(node))?;
        let metadata = fs::metadata(&photo.path)
            .map_err(|source| {
                BrowseError::UnderlyingIo{path: photo.path.clone(), source}
            })?;
        let modified = metadata.modified()
            .unwrap_or_else(|_| self.index.built_at());
        Ok(Attributes{
            kind: Kind::File,
            size: metadata.len(),
            modified,
            permissions: FILE_PERMISSIONS,
            links: 1,
        })
    }

    /// Open the original file behind a photo.
    ///
    /// Any intent to write fails, whatever the node is.
    /// If the file is gone from disk, the catalog is stale;
    /// this fails with [`BrowseError::NotFound`]
    /// but leaves the entry in the tree.
    pub fn open(&self, node: Node, intent: Intent)
        -> Result<PhotoHandle, BrowseError>
    {
        if intent == Intent::Write {
            debug!(path = %self.display(node), "rejected open for writing");
            return Err(BrowseError::ReadOnlyViolation(Mutation::Write));
        }
        if node.is_directory() {
            return Err(BrowseError::InvalidOperation{
                operation: "open",
                expected: Kind::File,
            });
        }

        let (_, photo) = self.index.photo(node)
            .ok_or_else(|| self.stale(node))?;
        PhotoHandle::open(&photo.path).map_err(|source| {
            if source.kind() == NotFound {
                warn!(path = %photo.path.display(), photo = %photo.id,
                      "original file is missing");
                BrowseError::NotFound(photo.path.display().to_string())
            } else {
                BrowseError::UnderlyingIo{path: photo.path.clone(), source}
            }
        })
    }

    /// Equivalent to `open(node, Intent::Read)`.
    pub fn open_for_read(&self, node: Node)
        -> Result<PhotoHandle, BrowseError>
    {
        self.open(node, Intent::Read)
    }

    /// Attempt a change at the given path.
    /// This always fails, and changes nothing.
    pub fn reject(&self, path: &str, mutation: Mutation)
        -> Result<(), BrowseError>
    {
        debug!(path, %mutation, "rejected mutation");
        Err(BrowseError::ReadOnlyViolation(mutation))
    }

    /// Path of a node, for messages.
    pub fn display(&self, node: Node) -> String
    {
        self.index.path(node).unwrap_or_else(|| format!("{:?}", node))
    }

    fn stale(&self, node: Node) -> BrowseError
    {
        BrowseError::NotFound(format!("{:?}", node))
    }
}

fn not_a_directory(operation: &'static str) -> BrowseError
{
    BrowseError::InvalidOperation{operation, expected: Kind::Directory}
}
