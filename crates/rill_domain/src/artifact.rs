use derive_more::{Display, From};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

use crate::document::SourceVersion;

/// Identity of an external rendering engine (e.g. a syntax highlighter or a
/// diagram renderer). One engine instance exists per id for the life of the
/// loader.
#[derive(Debug, Display, From, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineId(String);

impl EngineId {
    pub fn new(id: impl ToString) -> Self {
        Self(id.to_string())
    }
}

/// Stable identity of one rendered block instance within a session.
///
/// Keyed by position, not by content: the same diagram source may fail
/// transiently mid-stream and must still map to its prior good artifact.
#[derive(Debug, Display, From, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl ToString) -> Self {
        Self(id.to_string())
    }

    /// Instance identity derived from a node's span start.
    pub fn at_offset(offset: usize) -> Self {
        Self(format!("block-{offset}"))
    }
}

/// Output of one engine render call (highlighted markup, SVG text, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    content: String,
}

impl Artifact {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }

    /// The absent artifact, returned before any render has succeeded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Theme the embedder is currently presenting in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

/// Per-call rendering context handed to the fallback renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Setters)]
#[setters(strip_option, into)]
pub struct RenderContext {
    pub theme: ThemeMode,
    pub version: SourceVersion,
    /// Language hint for syntax-highlighting engines; diagram engines ignore
    /// it.
    pub language: Option<String>,
}

impl RenderContext {
    pub fn new(theme: ThemeMode, version: SourceVersion) -> Self {
        Self { theme, version, language: None }
    }
}
