//! # Path Resolution
//!
//! Every directory and target in a build is addressed through a virtual,
//! repository-relative notation that does not depend on the current working
//! directory:
//!
//! - a **prefix** names a directory: `//` is the repository root, `//lib/net`
//!   is `<root>/lib/net`;
//! - a **target identifier** names one target in a directory: `//lib/net:http`.
//!
//! [`Workspace`] anchors these notations to the real filesystem. It is found by
//! walking upward from a starting directory until a directory containing the
//! repository marker (`.git`) appears, and it owns the conversions between
//! prefixes and real paths as well as the output layout of built targets.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::defaults::{
    ARCHIVE_EXTENSION, OBJECT_DIR, OBJECT_EXTENSION, OUTPUT_DIR, REPO_MARKER, RULE_FILE,
};
use crate::error::{Error, Result};

/// Leading marker of every absolute prefix.
pub const ROOT_MARKER: &str = "//";

/// Separator between a prefix and a target name.
pub const NAME_SEPARATOR: char = ':';

/// A directory address relative to the repository root.
///
/// Segments are never empty, `.`, or `..`, and never contain `:`. Ordering is
/// segment-wise, so `//a` < `//a/b` < `//b`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Prefix {
    segments: Vec<String>,
}

impl Prefix {
    /// The repository root, `//`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse an absolute prefix such as `//lib/net`.
    ///
    /// Repeated slashes collapse; a trailing slash is ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let rest = text.strip_prefix(ROOT_MARKER).ok_or_else(|| Error::Path {
            message: format!("prefix `{}` must start with `{}`", text, ROOT_MARKER),
        })?;

        let mut segments = Vec::new();
        for segment in rest.split('/').filter(|s| !s.is_empty()) {
            validate_segment(text, segment)?;
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Resolve a `/`-separated relative path against this prefix.
    ///
    /// `.` segments are dropped and `..` moves to the parent directory;
    /// moving above the repository root is an error.
    pub fn join(&self, relative: &str) -> Result<Self> {
        let mut segments = self.segments.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            match segment {
                "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(Error::Path {
                            message: format!(
                                "`{}` escapes the repository root from {}",
                                relative, self
                            ),
                        });
                    }
                }
                _ => {
                    validate_segment(relative, segment)?;
                    segments.push(segment.to_string());
                }
            }
        }
        Ok(Self { segments })
    }

    /// True for `//`.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The directory names below the root, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// This prefix as a path relative to the repository root.
    pub fn relative_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

fn validate_segment(text: &str, segment: &str) -> Result<()> {
    if segment == "." || segment == ".." || segment.contains(NAME_SEPARATOR) {
        return Err(Error::Path {
            message: format!("invalid path segment `{}` in `{}`", segment, text),
        });
    }
    Ok(())
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ROOT_MARKER, self.segments.join("/"))
    }
}

/// A globally unique target address: a prefix plus a target name.
///
/// Displayed as `//dir:name`. Comparison is structural, prefix first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId {
    prefix: Prefix,
    name: String,
}

impl TargetId {
    /// Create an identifier, validating the target name.
    pub fn new(prefix: Prefix, name: &str) -> Result<Self> {
        validate_name(name)?;
        Ok(Self {
            prefix,
            name: name.to_string(),
        })
    }

    /// Turn a dependency reference into a fully-qualified identifier.
    ///
    /// Accepted forms:
    ///
    /// - `//dir:name` and `//dir/name` are absolute and kept as they are;
    /// - `name` and `:name` name a target in `within`;
    /// - `sub:name` and `sub/name` are resolved relative to `within`.
    ///
    /// Canonicalizing the display form of an identifier yields the same
    /// identifier, whatever `within` is.
    pub fn canonicalize(reference: &str, within: &Prefix) -> Result<Self> {
        let reference = reference.trim();
        let (directory, name) = match reference.rfind(NAME_SEPARATOR) {
            Some(index) => (&reference[..index], &reference[index + 1..]),
            None => match reference.rfind('/') {
                Some(index) => (&reference[..index], &reference[index + 1..]),
                None => ("", reference),
            },
        };

        let prefix = if reference.starts_with(ROOT_MARKER) {
            if directory.is_empty() || directory == "/" {
                // `//name` has its single slash stripped by the split above.
                Prefix::root()
            } else {
                Prefix::parse(directory)?
            }
        } else if directory.starts_with('/') {
            return Err(Error::Path {
                message: format!(
                    "reference `{}` must be relative or start with `{}`",
                    reference, ROOT_MARKER
                ),
            });
        } else {
            within.join(directory)?
        };

        Self::new(prefix, name)
    }

    /// Parse an absolute identifier such as `//lib:core`.
    pub fn parse(text: &str) -> Result<Self> {
        if !text.trim().starts_with(ROOT_MARKER) {
            return Err(Error::Path {
                message: format!("target `{}` must start with `{}`", text, ROOT_MARKER),
            });
        }
        Self::canonicalize(text, &Prefix::root())
    }

    /// The directory that defines this target.
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// The target name, unique within its directory.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Validate a target name as written in a rule file.
///
/// Names become file names under `.out`, so a leading `.` is rejected too:
/// `.` and `..` would escape it, and `.objs` holds the objects.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('.') || name.contains('/') || name.contains(NAME_SEPARATOR) {
        return Err(Error::Path {
            message: format!(
                "target name `{}` must be non-empty, not start with `.` and contain neither `/` nor `:`",
                name
            ),
        });
    }
    Ok(())
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, NAME_SEPARATOR, self.name)
    }
}

/// Where a target's build products live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    /// The `.out` directory inside the target's own directory.
    pub dir: PathBuf,
    /// Artifact base name, the target name.
    pub base_name: String,
}

impl OutputLocation {
    /// Library archive path, `<dir>/.out/<name>.a`.
    pub fn archive(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", self.base_name, ARCHIVE_EXTENSION))
    }

    /// Executable path, `<dir>/.out/<name>`.
    pub fn executable(&self) -> PathBuf {
        self.dir.join(&self.base_name)
    }

    /// Directory holding this target's objects, `<dir>/.out/.objs/<name>`.
    ///
    /// Every target has its own, so targets of one directory never share an
    /// object even when they compile at the same time.
    pub fn object_dir(&self) -> PathBuf {
        self.dir.join(OBJECT_DIR).join(&self.base_name)
    }

    /// Object path for a source, mirroring the source path under
    /// [`object_dir`](Self::object_dir) with the extension replaced.
    pub fn object_for(&self, source: &str) -> PathBuf {
        self.object_dir().join(source).with_extension(OBJECT_EXTENSION)
    }
}

/// A repository root plus the directory the build was started from.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    start: PathBuf,
}

impl Workspace {
    /// Discover the workspace from the current working directory.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Discover the workspace by walking upward from `start` until a
    /// directory containing the repository marker is found.
    pub fn discover_from(start: &Path) -> Result<Self> {
        let root = start
            .ancestors()
            .find(|dir| dir.join(REPO_MARKER).exists())
            .ok_or_else(|| Error::RepositoryNotFound {
                start: start.to_path_buf(),
                marker: REPO_MARKER.to_string(),
            })?;

        log::debug!("repository root: {}", root.display());
        Ok(Self {
            root: root.to_path_buf(),
            start: start.to_path_buf(),
        })
    }

    /// The repository root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The starting directory expressed as a prefix.
    pub fn current_prefix(&self) -> Result<Prefix> {
        self.path_to_prefix(&self.start)
    }

    /// Real path of the directory named by `prefix`.
    pub fn prefix_to_path(&self, prefix: &Prefix) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(prefix.segments());
        path
    }

    /// Prefix naming the directory at `path`.
    ///
    /// Relative paths are taken relative to the repository root.
    pub fn path_to_prefix(&self, path: &Path) -> Result<Prefix> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.root).map_err(|_| Error::Path {
                message: format!(
                    "{} is outside the repository rooted at {}",
                    path.display(),
                    self.root.display()
                ),
            })?
        } else {
            path
        };

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    let segment = segment.to_str().ok_or_else(|| Error::Path {
                        message: format!("{} is not valid UTF-8", path.display()),
                    })?;
                    validate_segment(&path.display().to_string(), segment)?;
                    segments.push(segment.to_string());
                }
                Component::CurDir => {}
                _ => {
                    return Err(Error::Path {
                        message: format!("cannot express {} as a prefix", path.display()),
                    })
                }
            }
        }
        Ok(Prefix { segments })
    }

    /// Path of the rule file for the directory named by `prefix`.
    pub fn rule_file(&self, prefix: &Prefix) -> PathBuf {
        self.prefix_to_path(prefix).join(RULE_FILE)
    }

    /// Output directory and artifact base name of a target.
    pub fn output_location(&self, target: &TargetId) -> OutputLocation {
        OutputLocation {
            dir: self.prefix_to_path(target.prefix()).join(OUTPUT_DIR),
            base_name: target.name().to_string(),
        }
    }
}
