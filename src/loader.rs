//! # Rule Loading
//!
//! [`RuleLoader::load_directory`] reads the rule file of exactly one directory
//! and returns its targets keyed by fully-qualified identifier. Loading is
//! side-effect free: the graph builder owns merging the result into the graph.
//!
//! Two things happen between parsing and returning:
//!
//! 1. Source entries containing glob metacharacters are expanded relative to
//!    the directory, in sorted order.
//! 2. Every dependency reference is canonicalized against the directory's
//!    prefix, so the returned properties only ever hold qualified identifiers.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use crate::config::{self, TargetRecord};
use crate::defaults::OBJECT_EXTENSION;
use crate::error::{Error, Result};
use crate::path::{validate_name, Prefix, TargetId, Workspace};

/// Everything the scheduler and toolchain need to know about one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProperties {
    /// Source files relative to the target's directory, in declaration order.
    pub sources: Vec<String>,
    /// Header files. Advisory only; nothing compiles them.
    pub headers: Vec<String>,
    /// Link an executable instead of archiving a library.
    pub is_executable: bool,
    /// Canonical dependency identifiers.
    pub dependencies: BTreeSet<TargetId>,
}

impl TargetProperties {
    /// A library target with the given dependencies and no sources.
    pub fn library<I: IntoIterator<Item = TargetId>>(dependencies: I) -> Self {
        Self {
            sources: Vec::new(),
            headers: Vec::new(),
            is_executable: false,
            dependencies: dependencies.into_iter().collect(),
        }
    }
}

/// Targets defined by one directory.
pub type DirectoryTargets = BTreeMap<TargetId, TargetProperties>;

/// Reads rule files relative to a workspace.
#[derive(Debug, Clone)]
pub struct RuleLoader<'a> {
    workspace: &'a Workspace,
}

impl<'a> RuleLoader<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    pub fn workspace(&self) -> &Workspace {
        self.workspace
    }

    /// Load and canonicalize the rule file of the directory named by `prefix`.
    pub fn load_directory(&self, prefix: &Prefix) -> Result<DirectoryTargets> {
        log::info!("[Loading] {}", prefix);

        let rule_file = self.workspace.rule_file(prefix);
        if !rule_file.is_file() {
            return Err(Error::RuleFileMissing {
                prefix: prefix.to_string(),
                path: rule_file,
            });
        }

        let raw_targets = config::from_file(&rule_file, &prefix.to_string())?;
        let directory = self.workspace.prefix_to_path(prefix);

        let mut targets = DirectoryTargets::new();
        for (name, raw) in raw_targets {
            let display = format!("{}:{}", prefix, name);
            validate_name(&name).map_err(|e| definition_error(&display, e))?;
            let id = TargetId::new(prefix.clone(), &name)?;

            let record = raw.into_record(&display)?;
            let properties = canonicalize(&id, record, &directory)?;
            log::debug!(
                "{}: {} source(s), {} dependency(ies)",
                id,
                properties.sources.len(),
                properties.dependencies.len()
            );
            targets.insert(id, properties);
        }

        Ok(targets)
    }
}

fn definition_error(target: &str, error: Error) -> Error {
    let message = match error {
        Error::Path { message } => message,
        other => other.to_string(),
    };
    Error::RuleDefinition {
        target: target.to_string(),
        message,
    }
}

/// Qualify every dependency of `record` with the prefix of `id` and expand
/// source globs against `directory`.
pub fn canonicalize(id: &TargetId, record: TargetRecord, directory: &Path) -> Result<TargetProperties> {
    let display = id.to_string();

    let mut dependencies = BTreeSet::new();
    for reference in &record.deps {
        let dependency = TargetId::canonicalize(reference, id.prefix()).map_err(|e| {
            definition_error(&display, e)
        })?;
        dependencies.insert(dependency);
    }

    let mut sources = Vec::new();
    for source in record.sources {
        if is_glob(&source) {
            sources.extend(expand_glob(&display, &source, directory)?);
        } else {
            sources.push(source);
        }
    }
    check_object_collisions(&display, &sources)?;

    Ok(TargetProperties {
        sources,
        headers: record.headers,
        is_executable: record.is_executable,
        dependencies,
    })
}

fn is_glob(source: &str) -> bool {
    source.contains(['*', '?', '['])
}

// Each source compiles to `<stem>.o`, so `a.cc` and `a.cpp` (or one file
// listed twice) would overwrite each other's object.
fn check_object_collisions(target: &str, sources: &[String]) -> Result<()> {
    let mut seen: BTreeMap<PathBuf, &str> = BTreeMap::new();
    for source in sources {
        let object: PathBuf = Path::new(source)
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect::<PathBuf>()
            .with_extension(OBJECT_EXTENSION);
        if let Some(previous) = seen.insert(object.clone(), source) {
            return Err(Error::RuleDefinition {
                target: target.to_string(),
                message: format!(
                    "sources `{}` and `{}` would both compile to `{}`",
                    previous,
                    source,
                    object.display()
                ),
            });
        }
    }
    Ok(())
}

fn expand_glob(target: &str, pattern: &str, directory: &Path) -> Result<Vec<String>> {
    let not_utf8 = || Error::RuleDefinition {
        target: target.to_string(),
        message: format!("source pattern `{}` is not valid UTF-8", pattern),
    };
    // Only the pattern itself is glob syntax; the directory is matched literally.
    let escaped = glob::Pattern::escape(directory.to_str().ok_or_else(not_utf8)?);
    let full = Path::new(&escaped).join(pattern);
    let full = full.to_str().ok_or_else(not_utf8)?;

    let paths = glob::glob(full).map_err(|e| Error::RuleDefinition {
        target: target.to_string(),
        message: format!("invalid source pattern `{}`: {}", pattern, e),
    })?;

    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| Error::Io(e.into_error()))?;
        if !path.is_file() {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(directory) {
            let relative: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            matches.push(relative.join("/"));
        }
    }

    if matches.is_empty() {
        return Err(Error::RuleDefinition {
            target: target.to_string(),
            message: format!("source pattern `{}` matches no files", pattern),
        });
    }
    matches.sort();
    Ok(matches)
}
