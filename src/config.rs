//! # Rule File Schema and Parsing
//!
//! This module defines the on-disk shape of an `xmake.yml` rule file and the
//! explicit defaults step that turns a parsed record into a fully-populated
//! target description.
//!
//! A rule file is a YAML mapping from an unqualified target name to a record:
//!
//! ```yaml
//! core:
//!   srcs: [tensor.cc]
//!   hdrs: [tensor.h, matrix.h]
//!   deps: []
//! simple_mnist:
//!   main: true
//!   srcs: [simple_mnist.cc]
//!   deps: [core, //xeno:sys]
//! ```
//!
//! `srcs`, `hdrs` and `main` may also be spelled `sources`, `headers` and
//! `executable`. Every key except `deps` is optional; unknown keys are
//! rejected so that typos do not silently drop sources.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// The executable flag as written: a YAML bool or a `"true"`/`"false"` string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn resolve(&self) -> Option<bool> {
        match self {
            Flag::Bool(value) => Some(*value),
            Flag::Text(text) if text.eq_ignore_ascii_case("true") => Some(true),
            Flag::Text(text) if text.eq_ignore_ascii_case("false") => Some(false),
            Flag::Text(_) => None,
        }
    }
}

/// One target record exactly as it appears in a rule file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTarget {
    /// Source files, relative to the rule file's directory.
    #[serde(default, alias = "sources")]
    pub srcs: Vec<String>,
    /// Header files. Advisory only.
    #[serde(default, alias = "headers")]
    pub hdrs: Vec<String>,
    /// Dependency references. Required, even when empty.
    #[serde(default)]
    pub deps: Option<Vec<String>>,
    /// Whether the target links an executable.
    #[serde(default, alias = "executable")]
    pub main: Option<Flag>,
}

/// A parsed rule file: target name to record, in name order.
pub type RuleFile = BTreeMap<String, RawTarget>;

/// A target record with every default applied.
///
/// Dependency references are still exactly as written; the loader
/// canonicalizes them against the owning directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRecord {
    pub sources: Vec<String>,
    pub headers: Vec<String>,
    pub is_executable: bool,
    pub deps: Vec<String>,
}

impl RawTarget {
    /// Apply defaults and validate the record.
    ///
    /// `target` is only used for error messages.
    pub fn into_record(self, target: &str) -> Result<TargetRecord> {
        let deps = self.deps.ok_or_else(|| Error::RuleDefinition {
            target: target.to_string(),
            message: "missing required key `deps` (use `deps: []` for none)".to_string(),
        })?;

        let is_executable = match self.main {
            None => false,
            Some(flag) => flag.resolve().ok_or_else(|| Error::RuleDefinition {
                target: target.to_string(),
                message: format!("`main` must be true or false, got {:?}", flag),
            })?,
        };

        for source in &self.srcs {
            validate_source(target, source)?;
        }

        Ok(TargetRecord {
            sources: self.srcs,
            headers: self.hdrs,
            is_executable,
            deps,
        })
    }
}

// Objects mirror source paths under the output directory, so a source must
// stay inside its own directory.
fn validate_source(target: &str, source: &str) -> Result<()> {
    let path = std::path::Path::new(source);
    let escapes = path
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir));
    if source.is_empty() || escapes {
        return Err(Error::RuleDefinition {
            target: target.to_string(),
            message: format!("source `{}` must be a relative path inside the directory", source),
        });
    }
    Ok(())
}

/// Parses the contents of a rule file.
///
/// An empty or comment-only file defines no targets. `prefix` names the
/// directory in error messages.
pub fn parse(yaml_content: &str, prefix: &str) -> Result<RuleFile> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml_content).map_err(|e| Error::RuleParse {
            prefix: prefix.to_string(),
            message: e.to_string(),
        })?;

    if value.is_null() {
        return Ok(RuleFile::new());
    }

    serde_yaml::from_value(value).map_err(|e| Error::RuleParse {
        prefix: prefix.to_string(),
        message: e.to_string(),
    })
}

/// Parse a rule file from disk.
pub fn from_file<P: AsRef<std::path::Path>>(path: P, prefix: &str) -> Result<RuleFile> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_keys() {
        let yaml = r#"
core:
  srcs: [tensor.cc]
  hdrs: [tensor.h, matrix.h]
  deps: []
simple_mnist:
  main: true
  srcs: [simple_mnist.cc]
  deps: [core, //xeno:sys]
"#;

        let rules = parse(yaml, "//xylo").unwrap();
        assert_eq!(rules.len(), 2);

        let core = rules["core"].clone().into_record("//xylo:core").unwrap();
        assert_eq!(core.sources, vec!["tensor.cc"]);
        assert_eq!(core.headers, vec!["tensor.h", "matrix.h"]);
        assert!(!core.is_executable);
        assert!(core.deps.is_empty());

        let app = rules["simple_mnist"]
            .clone()
            .into_record("//xylo:simple_mnist")
            .unwrap();
        assert!(app.is_executable);
        assert_eq!(app.deps, vec!["core", "//xeno:sys"]);
    }

    #[test]
    fn test_parse_descriptive_aliases() {
        let yaml = r#"
tool:
  sources: [main.cc]
  headers: [main.h]
  executable: true
  deps: []
"#;

        let rules = parse(yaml, "//tools").unwrap();
        let tool = rules["tool"].clone().into_record("//tools:tool").unwrap();
        assert_eq!(tool.sources, vec!["main.cc"]);
        assert_eq!(tool.headers, vec!["main.h"]);
        assert!(tool.is_executable);
    }

    #[test]
    fn test_defaults_applied() {
        let rules = parse("empty:\n  deps: []\n", "//").unwrap();
        let record = rules["empty"].clone().into_record("//:empty").unwrap();
        assert_eq!(
            record,
            TargetRecord {
                sources: vec![],
                headers: vec![],
                is_executable: false,
                deps: vec![],
            }
        );
    }

    #[test]
    fn test_main_as_string() {
        let rules = parse(
            "a:\n  main: \"true\"\n  deps: []\nb:\n  main: \"False\"\n  deps: []\n",
            "//",
        )
        .unwrap();
        assert!(rules["a"].clone().into_record("//:a").unwrap().is_executable);
        assert!(!rules["b"].clone().into_record("//:b").unwrap().is_executable);
    }

    #[test]
    fn test_main_invalid_value() {
        let rules = parse("a:\n  main: sometimes\n  deps: []\n", "//").unwrap();
        let result = rules["a"].clone().into_record("//:a");
        assert!(matches!(result, Err(Error::RuleDefinition { .. })));
    }

    #[test]
    fn test_missing_deps_is_definition_error() {
        let rules = parse("lib:\n  srcs: [a.cc]\n", "//lib").unwrap();
        let err = rules["lib"].clone().into_record("//lib:lib").unwrap_err();
        match err {
            Error::RuleDefinition { target, message } => {
                assert_eq!(target, "//lib:lib");
                assert!(message.contains("deps"));
            }
            other => panic!("Expected RuleDefinition, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let result = parse("lib:\n  sorces: [a.cc]\n  deps: []\n", "//lib");
        assert!(matches!(result, Err(Error::RuleParse { .. })));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let result = parse("lib: [unclosed\n", "//lib");
        match result {
            Err(Error::RuleParse { prefix, .. }) => assert_eq!(prefix, "//lib"),
            other => panic!("Expected RuleParse, got {:?}", other),
        }
    }

    #[test]
    fn test_top_level_sequence_is_parse_error() {
        let result = parse("- core\n- main\n", "//lib");
        assert!(matches!(result, Err(Error::RuleParse { .. })));
    }

    #[test]
    fn test_source_escaping_directory_is_rejected() {
        let rules = parse("lib:\n  srcs: [../other.cc]\n  deps: []\n", "//lib").unwrap();
        let result = rules["lib"].clone().into_record("//lib:lib");
        assert!(matches!(result, Err(Error::RuleDefinition { .. })));
    }
}
