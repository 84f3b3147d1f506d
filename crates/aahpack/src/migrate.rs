// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Textual codebase migration driven by a replacement grammar.
//!
//! The grammar file is YAML holding flat lists of alternating old/new
//! strings:
//!
//! ```yaml
//! file:
//!   go:
//!     upgrade_replacer:
//!       - "aah.AppConfig()"
//!       - "aah.App().Config()"
//!   view:
//!     upgrade_replacer:
//!       - "{{ anitcsrftoken . }}"
//!       - "{{ anticsrftoken . }}"
//! ```

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::config::{ConfigSource, ProjectConfig};
use crate::{APP_PACKAGE_DIR, Error, ExcludeSet, Project, Result, walk};

#[cfg(test)]
#[path = "./migrate_test.rs"]
mod migrate_test;

/// Well-known filename of the migration grammar under `~/.aah`.
pub const GRAMMAR_FILENAME: &str = "migrate.conf";

const GO_REPLACER_KEY: &str = "file.go.upgrade_replacer";
const VIEW_REPLACER_KEY: &str = "file.view.upgrade_replacer";
const VIEWS_DIR: &str = "views";
const DEFAULT_VIEW_EXT: &str = ".html";

/// A loaded migration grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    config: ProjectConfig,
}

impl Grammar {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(Self {
            config: ProjectConfig::from_yaml(yaml)?,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::Grammar(format!(
                "grammar file {} does not exist",
                path.display()
            )));
        }
        Ok(Self {
            config: ProjectConfig::load(path)?,
        })
    }

    /// `~/.aah/migrate.conf`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".aah").join(GRAMMAR_FILENAME))
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.config.source_path()
    }

    /// Replacer for Go sources, `None` when the grammar has no entry.
    pub fn go_replacer(&self) -> Result<Option<Replacer>> {
        self.replacer(GO_REPLACER_KEY)
    }

    /// Replacer for view files, `None` when the grammar has no entry.
    pub fn view_replacer(&self) -> Result<Option<Replacer>> {
        self.replacer(VIEW_REPLACER_KEY)
    }

    fn replacer(&self, key: &str) -> Result<Option<Replacer>> {
        self.config
            .string_list(key)
            .map(|list| {
                Replacer::new(list).map_err(|err| match err {
                    Error::Grammar(reason) => Error::Grammar(format!("'{key}': {reason}")),
                    other => other,
                })
            })
            .transpose()
    }
}

/// Replaces many substrings in a single left-to-right pass.
///
/// At each position the first pair, in list order, whose old string
/// matches is applied; replaced text is never rescanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacer {
    pairs: Vec<(String, String)>,
}

impl Replacer {
    /// Build from a flat `old, new, old, new, ...` list.
    pub fn new<I, S>(list: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = list.into_iter().map(Into::into).collect();
        if list.len() % 2 != 0 {
            return Err(Error::Grammar(format!(
                "replacer list has an odd number of entries ({})",
                list.len()
            )));
        }
        let mut pairs = Vec::with_capacity(list.len() / 2);
        let mut items = list.into_iter();
        while let (Some(old), Some(new)) = (items.next(), items.next()) {
            if old.is_empty() {
                return Err(Error::Grammar(format!(
                    "empty search string for replacement {new:?}"
                )));
            }
            pairs.push((old, new));
        }
        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn replace<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let mut out: Option<String> = None;
        let mut copied = 0;
        let mut pos = 0;
        while pos < input.len() {
            let rest = &input[pos..];
            match self.pairs.iter().find(|(old, _)| rest.starts_with(old.as_str())) {
                Some((old, new)) => {
                    let buf = out.get_or_insert_with(|| String::with_capacity(input.len()));
                    buf.push_str(&input[copied..pos]);
                    buf.push_str(new);
                    pos += old.len();
                    copied = pos;
                }
                None => {
                    pos += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        match out {
            Some(mut buf) => {
                buf.push_str(&input[copied..]);
                Cow::Owned(buf)
            }
            None => Cow::Borrowed(input),
        }
    }
}

/// Rewrite one file in place. Returns whether it changed.
///
/// An unreadable file is logged and skipped.
pub fn migrate_file(path: &Path, replacer: &Replacer) -> Result<bool> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!(path = %path.display(), "skipped, unable to read: {err}");
            return Ok(false);
        }
    };
    let Cow::Owned(migrated) = replacer.replace(&content) else {
        return Ok(false);
    };
    if migrated == content {
        return Ok(false);
    }
    std::fs::write(path, migrated).map_err(|e| Error::write(path, e))?;
    Ok(true)
}

/// Migrate the `.go` files of the application package.
///
/// Returns the number of rewritten files.
pub fn migrate_go_sources(project: &Project, grammar: &Grammar) -> Result<usize> {
    let Some(replacer) = grammar.go_replacer()? else {
        tracing::info!("'{GO_REPLACER_KEY}' not found in the grammar file");
        return Ok(0);
    };
    let excludes = project.config.ast_excludes()?;
    let root = project.base_dir.join(APP_PACKAGE_DIR);
    migrate_tree(&project.base_dir, &root, &excludes, "go", &replacer)
}

/// Migrate view templates with the configured view extension.
///
/// Returns the number of rewritten files.
pub fn migrate_view_files(project: &Project, grammar: &Grammar) -> Result<usize> {
    let Some(replacer) = grammar.view_replacer()? else {
        tracing::info!("'{VIEW_REPLACER_KEY}' not found in the grammar file");
        return Ok(0);
    };
    let ext = project.config.string_default("view.ext", DEFAULT_VIEW_EXT);
    let root = project.base_dir.join(VIEWS_DIR);
    migrate_tree(
        &project.base_dir,
        &root,
        &ExcludeSet::default(),
        ext.trim_start_matches('.'),
        &replacer,
    )
}

fn migrate_tree(
    base_dir: &Path,
    root: &Path,
    excludes: &ExcludeSet,
    ext: &str,
    replacer: &Replacer,
) -> Result<usize> {
    if !root.is_dir() {
        tracing::debug!(path = %root.display(), "nothing to migrate");
        return Ok(0);
    }
    let mut count = 0;
    for file in walk::files(root, excludes) {
        let file = file?;
        if file.extension().is_none_or(|e| e != ext) {
            continue;
        }
        if migrate_file(&file, replacer)? {
            let shown = file.strip_prefix(base_dir).unwrap_or(&file);
            tracing::info!("  |-- processed: {}", shown.display());
            count += 1;
        }
    }
    Ok(count)
}
