use crate::MountConfig;
use crate::MountPoint;
use crate::PhotoFs;
use anyhow::Context;
use anyhow::Result;
use chrono::Utc;
use fuser::MountOption;
use photofs_browse::Resolver;
use photofs_catalog::Catalog;
use photofs_tree::TreeIndex;
use photofs_tree::synthetic::standard_generators;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing::warn;

/// Load the library, build its tree, and serve it
/// at the mount point until it is unmounted.
pub fn run(config: &MountConfig) -> Result<()>
{
    let catalog = Catalog::load(&config.library)
        .with_context(|| format!("cannot load library {}",
                                 config.library.display()))?;
    let name = catalog.name();
    let index = TreeIndex::from_catalog(catalog,
                                        &standard_generators(Utc::now()))
        .with_context(|| format!("cannot build tree for {}", name))?;
    let fs = PhotoFs::new(Resolver::new(Arc::new(index)), config.ttl);

    let created = prepare_mountpoint(&config.mountpoint)?;
    let result = mount(fs, config, &name);
    if created {
        remove_mountpoint(&config.mountpoint.path);
    }
    result
}

/// Mount the file system and block until it is unmounted.
pub fn mount(fs: PhotoFs, config: &MountConfig, fsname: &str) -> Result<()>
{
    let path = &config.mountpoint.path;
    info!(library = %config.library.display(),
          mountpoint = %path.display(), "mounting");
    fuser::mount2(fs, path, &mount_options(config, fsname))
        .with_context(|| format!("cannot mount at {}", path.display()))?;
    info!(mountpoint = %path.display(), "unmounted");
    Ok(())
}

pub fn mount_options(config: &MountConfig, fsname: &str) -> Vec<MountOption>
{
    let mut options = vec![
        MountOption::RO,
        MountOption::FSName(fsname.to_owned()),
        MountOption::Subtype("photofs".to_owned()),
        MountOption::DefaultPermissions,
    ];
    // Automatic unmounting is only allowed along with allow_other.
    if config.allow_other {
        options.push(MountOption::AllowOther);
        options.push(MountOption::AutoUnmount);
    }
    options
}

/// Create the mount point if it is ours to create.
/// Returns whether a directory was created.
pub fn prepare_mountpoint(mountpoint: &MountPoint) -> Result<bool>
{
    let path = &mountpoint.path;
    if !mountpoint.create || path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path)
        .with_context(|| format!("cannot create mount point {}",
                                 path.display()))?;
    info!(mountpoint = %path.display(), "created mount point");
    Ok(true)
}

fn remove_mountpoint(path: &Path)
{
    match fs::remove_dir(path) {
        Ok(()) => info!(mountpoint = %path.display(), "removed mount point"),
        Err(err) => warn!(mountpoint = %path.display(), error = %err,
                          "cannot remove mount point"),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config(allow_other: bool) -> MountConfig
    {
        MountConfig{
            library: PathBuf::from("Vacation.photolibrary"),
            mountpoint: MountPoint{path: PathBuf::from("/mnt/Vacation"),
                                   create: false},
            ttl: Duration::from_secs(1),
            allow_other,
        }
    }

    #[test]
    fn test_mount_options()
    {
        let options = mount_options(&config(false), "Vacation");
        assert_eq!(options, [
            MountOption::RO,
            MountOption::FSName("Vacation".to_owned()),
            MountOption::Subtype("photofs".to_owned()),
            MountOption::DefaultPermissions,
        ]);

        let options = mount_options(&config(true), "Vacation");
        assert!(options.contains(&MountOption::RO));
        assert!(options.contains(&MountOption::AllowOther));
        assert!(options.contains(&MountOption::AutoUnmount));
    }

    #[test]
    fn test_prepare_mountpoint()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media").join("Vacation");

        let given = MountPoint{path: path.clone(), create: false};
        assert!(!prepare_mountpoint(&given).unwrap());
        assert!(!path.exists());

        let ours = MountPoint{path: path.clone(), create: true};
        assert!(prepare_mountpoint(&ours).unwrap());
        assert!(path.is_dir());

        // Already there: leave it alone afterwards.
        assert!(!prepare_mountpoint(&ours).unwrap());

        remove_mountpoint(&path);
        assert!(!path.exists());
        assert!(path.parent().unwrap().is_dir());
    }
}
