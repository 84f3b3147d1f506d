// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Glob-style exclusion patterns applied to every tree walk.
//!
//! A pattern without a `/` is matched against the base name of a path,
//! a pattern containing a `/` is matched against the trailing path
//! components of the same length. `*` never crosses a separator.
//!
//! Walks hand over paths relative to the directory the patterns were
//! written for, so directories above it never take part in a match.

use std::path::{Component, Path};

use glob::{MatchOptions, Pattern};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./excludes_test.rs"]
mod excludes_test;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct CompiledPattern {
    source: String,
    pattern: Pattern,
    /// Number of path components the pattern spans; 1 means base name only.
    depth: usize,
}

/// Validated, ordered set of exclusion patterns.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<CompiledPattern>,
}

impl ExcludeSet {
    /// Compile the given patterns, failing on the first empty or malformed one.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for raw in patterns {
            let source = raw.as_ref().trim().trim_end_matches('/');
            if source.is_empty() {
                return Err(Error::InvalidPattern {
                    pattern: raw.as_ref().to_string(),
                    reason: "pattern is empty".to_string(),
                });
            }
            let source = source.trim_start_matches("./");
            let pattern = Pattern::new(source).map_err(|e| Error::InvalidPattern {
                pattern: raw.as_ref().to_string(),
                reason: e.msg.to_string(),
            })?;
            compiled.push(CompiledPattern {
                source: source.to_string(),
                pattern,
                depth: source.split('/').filter(|s| !s.is_empty()).count(),
            });
        }
        Ok(Self { patterns: compiled })
    }

    /// A new set holding these patterns plus the extra ones.
    pub fn with_extra<I, S>(&self, extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let more = Self::new(extra)?;
        let mut patterns = self.patterns.clone();
        for p in more.patterns {
            if !patterns.iter().any(|existing| existing.source == p.source) {
                patterns.push(p);
            }
        }
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// The pattern strings, in the order given.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.source.as_str())
    }

    /// True when any pattern matches the path.
    pub fn matches<P: AsRef<Path>>(&self, path: P) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let components = normal_components(path.as_ref());
        if components.is_empty() {
            return false;
        }
        self.patterns.iter().any(|p| {
            if p.depth > components.len() {
                return false;
            }
            let tail = components[components.len() - p.depth..].join("/");
            p.pattern.matches_with(&tail, MATCH_OPTIONS)
        })
    }
}

/// Path components as `/`-free strings, independent of the host separator.
fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}
