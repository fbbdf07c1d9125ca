use photofs_catalog::library_name;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const USAGE: &str = "\
photofs: mount a photo library as a read-only file system

USAGE:
  photofs [OPTIONS] <library> [mountpoint]

  If mountpoint is omitted or a dash (-), a directory named after the
  library is created under the default mount root (/Volumes on macOS,
  /media elsewhere) and removed again after unmounting.
  If mountpoint starts with a dash, as in -DIR, that directory is
  created inside DIR instead.

OPTIONS:
  --ttl SECS       Attribute cache timeout (env: PHOTOFS_TTL_SECS, default 60)
  --allow-other    Let other users access the mount (env: PHOTOFS_ALLOW_OTHER)
  -h, --help       Print this message

ENVIRONMENT:
  PHOTOFS_MOUNT_ROOT   Default mount root
  RUST_LOG             Log filter (default info)
";

/// How long the kernel may cache attributes and entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// What the command line asks for.
#[derive(Clone, Debug, PartialEq)]
pub enum Command
{
    Help,
    Mount(MountConfig),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MountConfig
{
    /// Path to the library directory, as given.
    pub library: PathBuf,

    pub mountpoint: MountPoint,
    pub ttl: Duration,
    pub allow_other: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MountPoint
{
    pub path: PathBuf,

    /// Whether the directory is ours to create before mounting
    /// and to remove after unmounting.
    pub create: bool,
}

/// Returned when the command line cannot be understood.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError
{
    #[error("missing library path")]
    MissingLibrary,

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("{0} requires a value")]
    MissingValue(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidValue
    {
        name: &'static str,
        value: String,
    },
}

impl Command
{
    /// Parse the command line.
    ///
    /// `args` includes the program name.
    /// `env` looks up environment variables;
    /// command-line values take precedence over them.
    pub fn parse(args: &[String], env: impl Fn(&str) -> Option<String>)
        -> Result<Self, ConfigError>
    {
        let mut ttl = match env("PHOTOFS_TTL_SECS") {
            Some(value) => parse_ttl("PHOTOFS_TTL_SECS", &value)?,
            None => DEFAULT_TTL,
        };
        let mut allow_other = match env("PHOTOFS_ALLOW_OTHER") {
            Some(value) => parse_bool("PHOTOFS_ALLOW_OTHER", &value)?,
            None => false,
        };

        let mut positional = Vec::new();
        let mut args = args.iter().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Self::Help),
                "--allow-other" => allow_other = true,
                "--ttl" => {
                    let value = args.next()
                        .ok_or(ConfigError::MissingValue("--ttl"))?;
                    ttl = parse_ttl("--ttl", value)?;
                },
                // A lone dash, or a dash followed by a directory,
                // is a mount point request rather than a flag.
                _ if arg.starts_with("--") =>
                    return Err(ConfigError::UnexpectedArgument(arg.clone())),
                _ => positional.push(arg.as_str()),
            }
        }

        let (library, mountpoint) = match positional.as_slice() {
            []                    => return Err(ConfigError::MissingLibrary),
            [library]             => (*library, None),
            [library, mountpoint] => (*library, Some(*mountpoint)),
            [_, _, extra, ..]     =>
                return Err(ConfigError::UnexpectedArgument((*extra).to_owned())),
        };

        let library = PathBuf::from(library);
        let mount_root = env("PHOTOFS_MOUNT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(default_mount_root);
        let mountpoint = choose_mountpoint(&library, mountpoint, &mount_root);
        Ok(Self::Mount(MountConfig{library, mountpoint, ttl, allow_other}))
    }
}

/// Where libraries are mounted when no mount point is given.
pub fn default_mount_root() -> PathBuf
{
    if cfg!(target_os = "macos") {
        PathBuf::from("/Volumes")
    } else {
        PathBuf::from("/media")
    }
}

/// Interpret the mount point argument.
///
/// | Argument     | Mount point                          |
/// |--------------|--------------------------------------|
/// | none, or `-` | `<mount_root>/<library name>`, created |
/// | `-<dir>`     | `<dir>/<library name>`, created        |
/// | `<path>`     | `<path>`, must exist                   |
pub fn choose_mountpoint(library: &Path,
                         argument: Option<&str>,
                         mount_root: &Path) -> MountPoint
{
    let name = library_name(library);
    match argument {
        None | Some("-") =>
            MountPoint{path: mount_root.join(name), create: true},
        Some(dir) if dir.starts_with('-') =>
            MountPoint{path: Path::new(&dir[1 ..]).join(name), create: true},
        Some(path) =>
            MountPoint{path: PathBuf::from(path), create: false},
    }
}

fn parse_ttl(name: &'static str, value: &str) -> Result<Duration, ConfigError>
{
    value.parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidValue{name, value: value.to_owned()})
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError>
{
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on"  => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue{name, value: value.to_owned()}),
    }
}
