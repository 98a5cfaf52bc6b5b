//! Backend content-type schema compilation.
//!
//! Projects the content manifest into definitions a separate storage
//! backend consumes: pages with individual fields become `singular`
//! content types, collections become `repeating` types with pluralized
//! names. Attribute names are taken verbatim from the manifest — the
//! naming contract with templates and seed data lives there, not here.
//!
//! Entries that would have zero attributes are omitted; an empty content
//! type is unusable on the backend side.

use crate::naming::{display_name, pluralize, singularize};
use crate::types::{ContentManifest, FieldType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendSchema {
    pub kind: SchemaKind,
    pub collection_name: String,
    pub info: SchemaInfo,
    pub options: SchemaOptions,
    pub attributes: BTreeMap<String, Attribute>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Singular,
    Repeating,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaInfo {
    pub singular_name: String,
    pub plural_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaOptions {
    pub draft_and_publish: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeType {
    ShortText,
    LongFormattedText,
    MediaReference,
    Email,
}

/// Field type → backend attribute type projection.
fn project_type(field_type: FieldType) -> AttributeType {
    match field_type {
        FieldType::PlainText | FieldType::Phone | FieldType::Link => AttributeType::ShortText,
        FieldType::RichText => AttributeType::LongFormattedText,
        FieldType::Image => AttributeType::MediaReference,
        FieldType::Email => AttributeType::Email,
    }
}

/// Compile the manifest into backend content-type definitions, keyed by
/// collection name.
///
/// A collection detected on several pages compiles to one repeating entry
/// whose attributes are the union across pages.
pub fn compile(
    manifest: &ContentManifest,
    draft_and_publish: bool,
) -> BTreeMap<String, BackendSchema> {
    let mut schemas: BTreeMap<String, BackendSchema> = BTreeMap::new();

    for (page_id, page) in &manifest.pages {
        if !page.fields.is_empty() {
            let name = crate::naming::normalize_identifier(page_id);
            let attributes = page
                .fields
                .iter()
                .map(|(fname, mapping)| {
                    (
                        fname.clone(),
                        Attribute {
                            attr_type: project_type(mapping.field_type),
                            required: mapping.required,
                            unique: None,
                            default: mapping.default.clone(),
                        },
                    )
                })
                .collect();
            schemas.insert(
                name.clone(),
                BackendSchema {
                    kind: SchemaKind::Singular,
                    collection_name: name.clone(),
                    info: SchemaInfo {
                        singular_name: name.clone(),
                        plural_name: pluralize(&name),
                        display_name: display_name(&name),
                    },
                    options: SchemaOptions { draft_and_publish },
                    attributes,
                },
            );
        }

        for (cname, collection) in &page.collections {
            let entry = schemas.entry(cname.clone()).or_insert_with(|| {
                let singular = singularize(cname);
                BackendSchema {
                    kind: SchemaKind::Repeating,
                    collection_name: cname.clone(),
                    info: SchemaInfo {
                        singular_name: singular.clone(),
                        plural_name: cname.clone(),
                        display_name: display_name(&singular),
                    },
                    options: SchemaOptions { draft_and_publish },
                    attributes: BTreeMap::new(),
                }
            });
            for (fname, item) in &collection.fields {
                let attr_type = match item.attribute() {
                    Some("src") => AttributeType::MediaReference,
                    _ => AttributeType::ShortText,
                };
                entry.attributes.entry(fname.clone()).or_insert(Attribute {
                    attr_type,
                    required: None,
                    unique: None,
                    default: None,
                });
            }
        }
    }

    schemas.retain(|_, schema| !schema.attributes.is_empty());
    schemas
}
