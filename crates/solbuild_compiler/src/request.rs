//! Standard JSON compiler input and output.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use solbuild_cache::{ContractOutput, SourceEntry};
use solbuild_diagnostics::{Diagnostic, Severity, SourceLocation};

/// One compile request: every source keyed by reference path plus the
/// shared settings object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerInput {
    /// Always `Solidity`.
    pub language: String,
    /// Sources keyed by the path the compiler should know them as.
    pub sources: BTreeMap<String, SourceContent>,
    /// Optimizer, output selection and other settings.
    pub settings: Value,
}

impl CompilerInput {
    /// Creates an empty request with the given settings.
    pub fn new(settings: Value) -> Self {
        Self {
            language: "Solidity".to_string(),
            sources: BTreeMap::new(),
            settings,
        }
    }

    /// Adds a source, replacing any previous entry at `path`.
    pub fn add_source(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.sources.insert(
            path.into(),
            SourceContent {
                content: content.into(),
            },
        );
    }
}

/// Inline source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceContent {
    /// The source text.
    pub content: String,
}

/// The compiler's response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerOutput {
    /// Per-path, per-symbol outputs.
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
    /// Diagnostics of every severity.
    #[serde(default)]
    pub errors: Vec<CompilerMessage>,
    /// Per-path source ids.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceEntry>,
}

impl CompilerOutput {
    /// Ensures every bytecode object carries a `0x` prefix.
    pub fn normalize_bytecode(&mut self) {
        for symbols in self.contracts.values_mut() {
            for output in symbols.values_mut() {
                output.normalize_bytecode();
            }
        }
    }
}

/// A raw diagnostic record as the compiler reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerMessage {
    /// `error`, `warning` or `info`.
    pub severity: String,
    /// Error class such as `TypeError`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Compiler component such as `general`.
    #[serde(default)]
    pub component: Option<String>,
    /// Short message.
    #[serde(default)]
    pub message: String,
    /// Pre-rendered message with source excerpt.
    #[serde(default)]
    pub formatted_message: Option<String>,
    /// Source range, if reported.
    #[serde(default)]
    pub source_location: Option<MessageLocation>,
}

/// Source range of a compiler message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageLocation {
    /// Path of the source.
    pub file: String,
    /// Start byte offset, `-1` if unknown.
    #[serde(default)]
    pub start: i64,
    /// End byte offset, `-1` if unknown.
    #[serde(default)]
    pub end: i64,
}

impl CompilerMessage {
    /// Anything other than a warning fails the batch.
    pub fn is_fatal(&self) -> bool {
        self.severity != "warning"
    }

    /// Converts the record into a [`Diagnostic`] attributed to `version`.
    pub fn to_diagnostic(&self, version: &semver::Version) -> Diagnostic {
        let mut diag = Diagnostic::new(Severity::from_tag(&self.severity), self.message.clone())
            .with_compiler_version(version.to_string());
        if let Some(kind) = &self.kind {
            diag = diag.with_kind(kind.clone());
        }
        if let Some(component) = &self.component {
            diag = diag.with_component(component.clone());
        }
        if let Some(formatted) = &self.formatted_message {
            diag = diag.with_formatted_message(formatted.clone());
        }
        if let Some(loc) = &self.source_location {
            diag = diag.with_location(SourceLocation {
                file: loc.file.clone(),
                start: loc.start,
                end: loc.end,
            });
        }
        diag
    }
}
