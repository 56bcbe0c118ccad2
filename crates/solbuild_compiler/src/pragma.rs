//! Version range parsing and compiler version selection.
//!
//! Ranges follow the npm grammar the Solidity compiler itself accepts:
//! alternatives separated by `||`, each a space-separated conjunction of
//! comparators (`=`, `>`, `>=`, `<`, `<=`, `^`, `~`, bare versions,
//! `x`/`*` wildcards) or a hyphen range `a - b`. Each alternative is lowered
//! to a [`semver::VersionReq`] with explicit operators, so a bare version
//! means "exactly" as in npm rather than Cargo's implicit caret.

use semver::{Comparator, Version, VersionReq};
use solbuild_source::{version_pragma, SourceUnit};
use std::fmt;

use crate::error::CompileError;

const OPERATORS: &[&str] = &[">=", "<=", ">", "<", "=", "^", "~"];

/// A parsed version range.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRange {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// Parses a range expression.
    pub fn parse(text: &str) -> Result<Self, String> {
        let raw = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if raw.is_empty() {
            return Err("empty version range".to_string());
        }
        let alternatives = raw
            .split("||")
            .map(parse_alternative)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { raw, alternatives })
    }

    /// Returns `true` if `version` satisfies any alternative.
    ///
    /// Pre-releases only match an alternative that names a pre-release of
    /// the same `major.minor.patch`.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// The highest version in `available` satisfying the range.
    pub fn max_satisfying<'a>(&self, available: &'a [Version]) -> Option<&'a Version> {
        available.iter().filter(|v| self.matches(v)).max()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_alternative(text: &str) -> Result<VersionReq, String> {
    let tokens = glue_operators(text.split_whitespace());
    let mut comparators = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        if i + 2 < tokens.len() && tokens[i + 1] == "-" {
            push_comparator(&mut comparators, ">=", &tokens[i])?;
            push_comparator(&mut comparators, "<=", &tokens[i + 2])?;
            i += 3;
            continue;
        }
        let (op, version) = split_operator(&tokens[i]);
        push_comparator(&mut comparators, op, version)?;
        i += 1;
    }

    Ok(VersionReq { comparators })
}

/// Joins a detached operator with the version after it (`>= 0.6.0`).
fn glue_operators<'a>(words: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pending: Option<&str> = None;
    for word in words {
        match pending.take() {
            Some(op) => tokens.push(format!("{op}{word}")),
            None if OPERATORS.contains(&word) => pending = Some(word),
            None => tokens.push(word.to_string()),
        }
    }
    if let Some(op) = pending {
        tokens.push(op.to_string());
    }
    tokens
}

fn split_operator(token: &str) -> (&str, &str) {
    for &op in OPERATORS {
        if let Some(rest) = token.strip_prefix(op) {
            return (op, rest);
        }
    }
    ("=", token)
}

fn push_comparator(
    comparators: &mut Vec<Comparator>,
    op: &str,
    version: &str,
) -> Result<(), String> {
    let version = version.strip_prefix('v').unwrap_or(version);
    if version.is_empty() {
        return Err(format!("operator `{op}` has no version"));
    }

    // `0.6.x` is the partial version `0.6`; a bare wildcard matches anything.
    let parts: Vec<&str> = version
        .split('.')
        .take_while(|p| !matches!(*p, "x" | "X" | "*"))
        .collect();
    if parts.is_empty() {
        return Ok(());
    }
    let version = parts.join(".");

    let comparator = Comparator::parse(&format!("{op}{version}"))
        .map_err(|e| format!("`{op}{version}`: {e}"))?;
    comparators.push(comparator);
    Ok(())
}

/// Selects the compiler version for `unit`: the highest element of
/// `available` satisfying its `pragma solidity` range.
pub fn select_version(unit: &SourceUnit, available: &[Version]) -> Result<Version, CompileError> {
    let constraint = version_pragma(&unit.source).ok_or_else(|| {
        CompileError::MissingVersionPragma {
            unit: unit.path.clone(),
        }
    })?;
    let range =
        VersionRange::parse(&constraint).map_err(|reason| CompileError::InvalidVersionConstraint {
            unit: unit.path.clone(),
            constraint: constraint.clone(),
            reason,
        })?;

    let selected = range
        .max_satisfying(available)
        .cloned()
        .ok_or_else(|| CompileError::NoSatisfyingVersion {
            unit: unit.path.clone(),
            constraint: constraint.clone(),
        })?;
    tracing::debug!(unit = %unit.path, %range, %selected, "selected compiler version");
    Ok(selected)
}
