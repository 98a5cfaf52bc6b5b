//! Shared types serialized across all pipeline stages.
//!
//! The content manifest is the single source of truth: it is built once by
//! inference and passed by value into the rewriter, the backend compiler,
//! and the extractor. None of those consumers re-derive names or selectors
//! from the tree — they read them from here, which is what keeps the four
//! artifacts (manifest, template, backend schema, seed data) consistent.
//!
//! All maps are `BTreeMap` so every serialized artifact is canonically
//! ordered and re-runs produce byte-identical documents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Manifest format version. Bumped when the document shape changes.
pub const MANIFEST_VERSION: u32 = 1;

/// The canonical schema document of all detected fields and collections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentManifest {
    pub version: u32,
    pub pages: BTreeMap<String, PageSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageSchema {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldMapping>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub collections: BTreeMap<String, CollectionMapping>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageMeta {
    pub route: String,
}

/// A single atomic editable content unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMapping {
    pub selector: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    PlainText,
    RichText,
    Image,
    Link,
    Email,
    Phone,
}

impl FieldType {
    /// The attribute this field binds to, if it is attribute-backed.
    pub fn bound_attribute(self) -> Option<&'static str> {
        match self {
            FieldType::Image => Some("src"),
            FieldType::Link => Some("href"),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    /// Same kebab-case spelling the manifest uses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::PlainText => "plain-text",
            FieldType::RichText => "rich-text",
            FieldType::Image => "image",
            FieldType::Link => "link",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
        };
        f.write_str(name)
    }
}

/// A repeating group of structurally similar items sharing a field schema.
///
/// The container selector resolves to the first matching group member,
/// which serves as the binding template for all repetitions. Item field
/// selectors are relative to that member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionMapping {
    pub selector: String,
    pub fields: BTreeMap<String, ItemSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// An item-relative selector: either bare (text capture) or paired with
/// the attribute to capture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ItemSelector {
    Text(String),
    Attr { selector: String, attribute: String },
}

impl ItemSelector {
    pub fn selector(&self) -> &str {
        match self {
            ItemSelector::Text(s) => s,
            ItemSelector::Attr { selector, .. } => selector,
        }
    }

    pub fn attribute(&self) -> Option<&str> {
        match self {
            ItemSelector::Text(_) => None,
            ItemSelector::Attr { attribute, .. } => Some(attribute),
        }
    }
}

/// Literal values pulled from one page's original tree, shaped like the
/// page's schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageContent {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub collections: BTreeMap<String, Vec<BTreeMap<String, String>>>,
}

pub type ExtractedContent = BTreeMap<String, PageContent>;

/// Non-fatal conditions collected per page and surfaced at batch
/// granularity. None of these stop a page from producing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Malformed input tolerated by parser auto-recovery.
    ParseRecoverable { detail: String },
    /// An inferred selector failed to re-resolve; the field was dropped.
    SelectorUnresolvable { name: String, selector: String },
    /// Two detected fields normalized to one identifier; last write wins.
    SchemaNameCollision { name: String },
    /// A schema entry had no counterpart in the live tree and was skipped.
    UnknownFieldReference { name: String, selector: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ParseRecoverable { detail } => write!(f, "recovered parse: {detail}"),
            Warning::SelectorUnresolvable { name, selector } => {
                write!(f, "selector for '{name}' does not resolve, dropped: {selector}")
            }
            Warning::SchemaNameCollision { name } => {
                write!(f, "ambiguous name '{name}': multiple elements normalize to it")
            }
            Warning::UnknownFieldReference { name, selector } => {
                write!(f, "'{name}' not found in tree, skipped: {selector}")
            }
        }
    }
}
