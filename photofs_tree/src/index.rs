use crate::Collection;
use crate::Generator;
use crate::Namespace;
use indexmap::IndexMap;
use photofs_catalog::Albums;
use photofs_catalog::Catalog;
use photofs_catalog::LoadError;
use photofs_catalog::Photo;
use photofs_catalog::Photos;
use photofs_catalog::Rolls;
use std::time::SystemTime;
use tracing::debug;
use tracing::info;

/// Stand-in for names that cannot be used as a path segment.
pub const UNTITLED: &str = "Untitled";

/// Collections of one namespace, keyed by their unique directory name.
pub type CollectionNodes = IndexMap<String, CollectionNode>;

/// Handle to a directory or file in a [`TreeIndex`].
///
/// Nodes are plain indices into the tree they were obtained from,
/// and are only meaningful together with that tree.
/// Since the tree never changes, a node stays valid for as long as the tree.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Node
{
    Root,
    Namespace(Namespace),

    /// Collection by position within its namespace.
    Collection(Namespace, usize),

    /// Photo entry by position within its collection.
    Photo(Namespace, usize, usize),
}

impl Node
{
    /// The directory that contains this node.
    /// The root is its own parent.
    pub fn parent(self) -> Self
    {
        match self {
            Self::Root                   => Self::Root,
            Self::Namespace(_)           => Self::Root,
            Self::Collection(ns, _)      => Self::Namespace(ns),
            Self::Photo(ns, c, _)        => Self::Collection(ns, c),
        }
    }

    pub fn is_directory(self) -> bool
    {
        !matches!(self, Self::Photo(..))
    }
}

/// A collection as it appears in the tree:
/// a directory of uniquely named photo entries.
#[derive(Clone, Debug)]
pub struct CollectionNode
{
    id: String,
    name: String,

    /// Unique filename to position of the photo in [`TreeIndex::photos`].
    entries: IndexMap<String, usize>,
}

impl CollectionNode
{
    /// Identifier of the collection this directory was built from.
    pub fn id(&self) -> &str
    {
        &self.id
    }

    /// Directory name, including any collision suffix.
    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    /// Entry filenames in collection order.
    pub fn filenames(&self) -> impl Iterator<Item=&str>
    {
        self.entries.keys().map(String::as_str)
    }
}

/// The immutable directory tree of a library.
///
/// A tree index is built once with [`TreeIndex::build`]
/// and then only ever read from.
/// It is [`Sync`], so it can be shared between threads without locking.
#[derive(Debug)]
pub struct TreeIndex
{
    photos: Photos,
    albums: CollectionNodes,
    rolls: CollectionNodes,
    built_at: SystemTime,
}

impl TreeIndex
{
    /// Assemble the tree.
    ///
    /// The `Albums` namespace lists the synthetic collections first,
    /// then the albums, each in the given order.
    /// The `Rolls` namespace lists the rolls.
    ///
    /// Names that cannot be a path segment are made into one first:
    /// slashes become colons, and empty names, `.` and `..`
    /// become [`UNTITLED`].
    /// When two collections of a namespace have the same name,
    /// the later one is renamed to `<name> (<n>)`.
    /// When two photos of a collection have the same filename,
    /// the later one is renamed to `<stem> (<n>).<extension>`.
    /// In both cases `n` is the smallest number from 2 up
    /// that does not collide with a name already in use.
    ///
    /// Fails if any collection references a photo not in `photos`.
    pub fn build(photos: Photos,
                 albums: &Albums,
                 rolls: &Rolls,
                 synthetic: Vec<Collection>)
        -> Result<Self, LoadError>
    {
        let mut album_nodes = CollectionNodes::new();
        let real_albums = albums.values().map(Collection::from);
        for collection in synthetic.into_iter().chain(real_albums) {
            insert_collection(&mut album_nodes, &photos, collection)?;
        }

        let mut roll_nodes = CollectionNodes::new();
        for collection in rolls.values().map(Collection::from) {
            insert_collection(&mut roll_nodes, &photos, collection)?;
        }

        Ok(Self{
            photos,
            albums: album_nodes,
            rolls: roll_nodes,
            built_at: SystemTime::now(),
        })
    }

    /// Run the generators over the catalog and build its tree.
    pub fn from_catalog(catalog: Catalog,
                        generators: &[Box<dyn Generator + Send + Sync>])
        -> Result<Self, LoadError>
    {
        let Catalog{photos, albums, rolls, ..} = catalog;
        let synthetic = generators.iter()
                                  .map(|g| g.generate(&photos, &rolls))
                                  .collect();
        let index = Self::build(photos, &albums, &rolls, synthetic)?;
        info!(albums = index.albums.len(), rolls = index.rolls.len(),
              "built tree index");
        Ok(index)
    }

    /// Every photo in the library, in catalog order.
    pub fn photos(&self) -> &Photos
    {
        &self.photos
    }

    /// When the tree was built.
    /// This serves as the modification time of every directory.
    pub fn built_at(&self) -> SystemTime
    {
        self.built_at
    }

    pub fn collections(&self, namespace: Namespace) -> &CollectionNodes
    {
        match namespace {
            Namespace::Albums => &self.albums,
            Namespace::Rolls  => &self.rolls,
        }
    }

    pub fn collection(&self, namespace: Namespace, index: usize)
        -> Option<&CollectionNode>
    {
        self.collections(namespace)
            .get_index(index)
            .map(|(_, node)| node)
    }

    /// Find a collection by its exact directory name.
    pub fn find_collection(&self, namespace: Namespace, name: &str)
        -> Option<Node>
    {
        self.collections(namespace)
            .get_index_of(name)
            .map(|c| Node::Collection(namespace, c))
    }

    /// Find a photo entry by its exact filename within a collection.
    pub fn find_photo(&self, namespace: Namespace, collection: usize,
                      filename: &str) -> Option<Node>
    {
        self.collection(namespace, collection)?
            .entries
            .get_index_of(filename)
            .map(|e| Node::Photo(namespace, collection, e))
    }

    /// The filename and photo record behind a photo entry.
    pub fn photo(&self, node: Node) -> Option<(&str, &Photo)>
    {
        match node {
            Node::Photo(ns, c, e) => {
                let collection = self.collection(ns, c)?;
                let (filename, &photo) = collection.entries.get_index(e)?;
                let (_, photo) = self.photos.get_index(photo)?;
                Some((filename, photo))
            },
            _ => None,
        }
    }

    /// The final path component naming the node.
    /// The root has the empty name.
    pub fn name(&self, node: Node) -> Option<&str>
    {
        match node {
            Node::Root            => Some(""),
            Node::Namespace(ns)   => Some(ns.name()),
            Node::Collection(ns, c) =>
                self.collection(ns, c).map(CollectionNode::name),
            Node::Photo(..)       =>
                self.photo(node).map(|(filename, _)| filename),
        }
    }

    /// Absolute slash-separated path of the node.
    pub fn path(&self, node: Node) -> Option<String>
    {
        match node {
            Node::Root => Some("/".to_owned()),
            Node::Namespace(_) => Some(format!("/{}", self.name(node)?)),
            _ => {
                let parent = self.path(node.parent())?;
                Some(format!("{}/{}", parent, self.name(node)?))
            },
        }
    }

    /// The nodes directly inside a directory, in listing order.
    /// Returns [`None`] for photo entries and for stale nodes.
    pub fn children(&self, node: Node) -> Option<Vec<Node>>
    {
        match node {
            Node::Root =>
                Some(Namespace::ALL.iter().map(|&ns| Node::Namespace(ns))
                                   .collect()),
            Node::Namespace(ns) =>
                Some((0 .. self.collections(ns).len())
                     .map(|c| Node::Collection(ns, c))
                     .collect()),
            Node::Collection(ns, c) =>
                Some((0 .. self.collection(ns, c)?.len())
                     .map(|e| Node::Photo(ns, c, e))
                     .collect()),
            Node::Photo(..) => None,
        }
    }

    /// Every node of the tree, parents before children.
    pub fn nodes(&self) -> impl '_ + Iterator<Item=Node>
    {
        let mut stack = vec![Node::Root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            if let Some(children) = self.children(node) {
                stack.extend(children.into_iter().rev());
            }
            Some(node)
        })
    }
}

fn insert_collection(nodes: &mut CollectionNodes,
                     photos: &Photos,
                     collection: Collection)
    -> Result<(), LoadError>
{
    let mut entries = IndexMap::new();
    for id in &collection.photos {
        let (index, _, photo) = photos.get_full(id).ok_or_else(|| {
            LoadError::UnknownPhoto{
                collection: format!("{} ({})", collection.name, collection.id),
                photo: id.clone(),
            }
        })?;
        let filename = disambiguate(&segment_name(&photo.filename),
                                    |n| entries.contains_key(n),
                                    suffix_filename);
        entries.insert(filename, index);
    }

    let name = disambiguate(&segment_name(&collection.name),
                            |n| nodes.contains_key(n),
                            suffix_name);
    if name != collection.name {
        debug!(id = %collection.id, from = %collection.name, to = %name,
               "renamed collection");
    }

    let node = CollectionNode{id: collection.id, name: name.clone(), entries};
    nodes.insert(name, node);
    Ok(())
}

/// Make a catalog name usable as exactly one path segment.
///
/// Slashes become colons, as the Finder shows them, and NUL is dropped.
/// Names left empty, and the names `.` and `..`, become [`UNTITLED`].
fn segment_name(name: &str) -> String
{
    let name: String =
        name.chars()
        .filter(|&c| c != '\0')
        .map(|c| if c == '/' { ':' } else { c })
        .collect();
    match name.as_str() {
        "" | "." | ".." => UNTITLED.to_owned(),
        _ => name,
    }
}

/// Return `name` if it is free, else the first free suffixed variant.
fn disambiguate(name: &str,
                is_taken: impl Fn(&str) -> bool,
                suffix: impl Fn(&str, u32) -> String) -> String
{
    if !is_taken(name) {
        return name.to_owned();
    }
    (2 ..)
        .map(|n| suffix(name, n))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| name.to_owned())
}

fn suffix_name(name: &str, n: u32) -> String
{
    format!("{} ({})", name, n)
}

/// Insert the counter before the extension, so the file keeps its type.
/// A leading dot does not start an extension.
fn suffix_filename(filename: &str, n: u32) -> String
{
    match filename.rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, extension) = filename.split_at(dot);
            format!("{} ({}){}", stem, n, extension)
        },
        _ => suffix_name(filename, n),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use photofs_catalog::Album;
    use photofs_catalog::AlbumId;
    use photofs_catalog::PhotoId;
    use photofs_catalog::Roll;
    use crate::synthetic;

    fn photo_map(paths: &[(&str, &str)]) -> Photos
    {
        let timestamp = Utc.with_ymd_and_hms(2012, 4, 24, 12, 0, 0).unwrap();
        paths.iter()
             .map(|&(id, path)| Photo::new(id, path, timestamp))
             .map(|p| (p.id.clone(), p))
             .collect()
    }

    fn album(id: &str, name: &str, photos: &[&str]) -> (AlbumId, Album)
    {
        let photos = photos.iter().map(|&p| PhotoId::from(p)).collect();
        (id.into(), Album{id: id.into(), name: name.into(), photos})
    }

    fn listing(index: &TreeIndex, node: Node) -> Vec<&str>
    {
        index.children(node).unwrap()
             .into_iter()
             .map(|n| index.name(n).unwrap())
             .collect()
    }

    #[test]
    fn test_suffix_filename()
    {
        let examples = &[
            ("IMG_1201.JPG", "IMG_1201 (2).JPG"),
            ("archive.tar.gz", "archive.tar (2).gz"),
            ("README", "README (2)"),
            (".hidden", ".hidden (2)"),
        ];
        for &(input, expected) in examples {
            assert_eq!(suffix_filename(input, 2), expected);
        }
    }

    #[test]
    fn test_build_layout()
    {
        let photos = photo_map(&[("1", "/a/IMG_1.JPG"), ("2", "/a/IMG_2.JPG")]);
        let albums: Albums = vec![album("5", "Trip", &["2"])]
                             .into_iter().collect();
        let timestamp = Utc.with_ymd_and_hms(2012, 4, 24, 12, 0, 0).unwrap();
        let roll = Roll::new("7", timestamp, vec!["1".into(), "2".into()]);
        let rolls: Rolls = vec![(roll.id.clone(), roll)].into_iter().collect();
        let synthetic =
            synthetic::standard_generators(timestamp)
            .iter()
            .map(|g| g.generate(&photos, &rolls))
            .collect();

        let index = TreeIndex::build(photos, &albums, &rolls, synthetic)
                    .unwrap();

        assert_eq!(listing(&index, Node::Root), ["Albums", "Rolls"]);
        assert_eq!(listing(&index, Node::Namespace(Namespace::Albums)),
                   ["Photos", "Flagged", "Last 12 Months", "Last Import", "Trip"]);
        assert_eq!(listing(&index, Node::Namespace(Namespace::Rolls)),
                   ["Apr 24, 2012"]);

        let trip = index.find_collection(Namespace::Albums, "Trip").unwrap();
        assert_eq!(listing(&index, trip), ["IMG_2.JPG"]);
        assert_eq!(index.path(trip).unwrap(), "/Albums/Trip");
    }

    #[test]
    fn test_build_unknown_photo()
    {
        let photos = photo_map(&[("1", "/a/IMG_1.JPG")]);
        let albums: Albums = vec![album("5", "Trip", &["1", "404"])]
                     .into_iter().collect();
        let result = TreeIndex::build(photos, &albums, &Rolls::new(), vec![]);
        match result {
            Err(LoadError::UnknownPhoto{photo, ..}) =>
                assert_eq!(photo.as_str(), "404"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }

        // Synthetic collections are checked too.
        let photos = photo_map(&[]);
        let bogus = Collection::new("synthetic:bogus", "Bogus",
                                    vec!["1".into()]);
        let result = TreeIndex::build(photos, &Albums::new(), &Rolls::new(),
                                      vec![bogus]);
        assert!(matches!(result, Err(LoadError::UnknownPhoto{..})));
    }

    #[test]
    fn test_build_filename_collisions()
    {
        let photos = photo_map(&[
            ("1", "/a/IMG_1.JPG"),
            ("2", "/b/IMG_1.JPG"),
            ("3", "/c/IMG_1 (2).JPG"),
            ("4", "/d/IMG_1.JPG"),
        ]);
        let albums: Albums = vec![album("5", "All", &["1", "2", "3", "4"])]
                     .into_iter().collect();
        let index = TreeIndex::build(photos, &albums, &Rolls::new(), vec![])
                    .unwrap();

        let all = index.find_collection(Namespace::Albums, "All").unwrap();
        assert_eq!(listing(&index, all),
                   ["IMG_1.JPG", "IMG_1 (2).JPG", "IMG_1 (2) (2).JPG",
                    "IMG_1 (3).JPG"]);

        // Every disambiguated name leads back to its own photo.
        let expected = [("IMG_1.JPG", "1"), ("IMG_1 (2).JPG", "2"),
                        ("IMG_1 (2) (2).JPG", "3"), ("IMG_1 (3).JPG", "4")];
        let Node::Collection(ns, c) = all else { unreachable!() };
        for &(filename, id) in &expected {
            let node = index.find_photo(ns, c, filename).unwrap();
            let (_, photo) = index.photo(node).unwrap();
            assert_eq!(photo.id.as_str(), id);
        }
    }

    #[test]
    fn test_build_name_collisions()
    {
        let photos = photo_map(&[("1", "/a/IMG_1.JPG")]);
        let albums: Albums = vec![
            album("5", "Flagged", &["1"]),
            album("6", "Trip", &[]),
            album("7", "Trip", &["1"]),
        ].into_iter().collect();
        let synthetic = vec![synthetic::flagged(&photos, &Rolls::new())];
        let index = TreeIndex::build(photos, &albums, &Rolls::new(), synthetic)
                    .unwrap();

        assert_eq!(listing(&index, Node::Namespace(Namespace::Albums)),
                   ["Flagged", "Flagged (2)", "Trip", "Trip (2)"]);

        // Nothing is dropped: the renamed album keeps its photo.
        let renamed = index.find_collection(Namespace::Albums, "Trip (2)")
                           .unwrap();
        let Node::Collection(ns, c) = renamed else { unreachable!() };
        assert_eq!(index.collection(ns, c).unwrap().id(), "album:7");
        assert_eq!(listing(&index, renamed), ["IMG_1.JPG"]);
    }

    #[test]
    fn test_segment_name()
    {
        let examples = &[
            ("Trip 2012/2013", "Trip 2012:2013"),
            ("/", ":"),
            ("a\0b", "ab"),
            ("", "Untitled"),
            (".", "Untitled"),
            ("..", "Untitled"),
            ("...", "..."),
            (".hidden", ".hidden"),
        ];
        for &(input, expected) in examples {
            assert_eq!(segment_name(input), expected, "{:?}", input);
        }
    }

    #[test]
    fn test_build_unusable_names()
    {
        // Photo 1 has a path without a final name.
        let photos = photo_map(&[("1", "/a/.."), ("2", "/a/IMG_2.JPG"),
                                 ("3", "/b/..")]);
        let albums: Albums = vec![
            album("5", "Trip 2012/2013", &["1", "2", "3"]),
            album("6", "", &[]),
            album("7", "..", &[]),
            album("8", ".", &[]),
        ].into_iter().collect();
        let index = TreeIndex::build(photos, &albums, &Rolls::new(), vec![])
                    .unwrap();

        assert_eq!(listing(&index, Node::Namespace(Namespace::Albums)),
                   ["Trip 2012:2013", "Untitled", "Untitled (2)",
                    "Untitled (3)"]);

        let trip = index.find_collection(Namespace::Albums, "Trip 2012:2013")
                        .unwrap();
        assert_eq!(listing(&index, trip),
                   ["Untitled", "IMG_2.JPG", "Untitled (2)"]);

        // Every name is a single, ordinary path segment.
        for node in index.nodes().skip(1) {
            let name = index.name(node).unwrap();
            assert!(!name.is_empty() && name != "." && name != "..");
            assert!(!name.contains('/'));
        }
    }

    #[test]
    fn test_nodes()
    {
        let photos = photo_map(&[("1", "/a/IMG_1.JPG")]);
        let albums: Albums = vec![album("5", "Trip", &["1"])]
                             .into_iter().collect();
        let index = TreeIndex::build(photos, &albums, &Rolls::new(), vec![])
                    .unwrap();

        let nodes: Vec<_> = index.nodes().collect();
        assert_eq!(nodes, [
            Node::Root,
            Node::Namespace(Namespace::Albums),
            Node::Collection(Namespace::Albums, 0),
            Node::Photo(Namespace::Albums, 0, 0),
            Node::Namespace(Namespace::Rolls),
        ]);
        for &node in &nodes[1 ..] {
            assert!(nodes.contains(&node.parent()));
        }
    }
}
