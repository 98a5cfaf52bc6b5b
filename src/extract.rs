//! Seed content extraction.
//!
//! Re-walks the *original* parsed tree — never the rewritten template —
//! using the manifest's selectors, and pulls the literal values into a
//! dataset shaped like the backend schema. This is the other half of the
//! round-trip invariant: anything inference put in the manifest must come
//! back out of the tree it was inferred from.
//!
//! Capture rules: image fields take the `src` attribute, link fields the
//! `href`, everything else the trimmed text. For collections every
//! matching structural instance yields one item record, not just the
//! binding template; items with no extractable field at all are skipped.
//!
//! Image-like values are normalized to canonical root-relative paths so
//! the seed dataset references assets where the rewritten site will serve
//! them; already root-relative values pass through unchanged.

use crate::dom::{Dom, NodeId};
use crate::links;
use crate::parse::ParsedPage;
use crate::types::{
    ExtractedContent, FieldType, ItemSelector, PageContent, PageSchema, Warning,
};
use std::collections::BTreeMap;

/// Pull every schema entry's literal value out of the original tree.
///
/// Schema entries that fail to resolve are skipped with
/// [`Warning::UnknownFieldReference`]; extraction is best-effort per entry
/// and never fails a page.
pub fn extract(
    page: &ParsedPage,
    schema: &PageSchema,
    asset_root: &str,
    warnings: &mut Vec<Warning>,
) -> PageContent {
    let dom = &page.dom;
    let mut content = PageContent::default();

    for (name, mapping) in &schema.fields {
        let Some(node) = dom.resolve(&mapping.selector) else {
            warnings.push(Warning::UnknownFieldReference {
                name: name.clone(),
                selector: mapping.selector.clone(),
            });
            continue;
        };
        let value = match mapping.field_type.bound_attribute() {
            Some(attr) => dom.element(node).and_then(|e| e.attr(attr)).map(str::to_string),
            None => Some(dom.text_content(node)),
        };
        let Some(value) = value else {
            warnings.push(Warning::UnknownFieldReference {
                name: name.clone(),
                selector: mapping.selector.clone(),
            });
            continue;
        };
        let value = if mapping.field_type == FieldType::Image {
            links::normalize_asset(&value, asset_root)
        } else {
            value
        };
        content.fields.insert(name.clone(), value);
    }

    for (name, collection) in &schema.collections {
        let members = dom.resolve_all(&collection.selector);
        if members.is_empty() {
            warnings.push(Warning::UnknownFieldReference {
                name: name.clone(),
                selector: collection.selector.clone(),
            });
            continue;
        }
        let mut items = Vec::new();
        for member in members {
            let item = extract_item(dom, member, &collection.fields, asset_root);
            // An instance yielding nothing is structural coincidence, not
            // content.
            if !item.is_empty() {
                items.push(item);
            }
            if collection.limit.map(|l| items.len() >= l).unwrap_or(false) {
                break;
            }
        }
        content.collections.insert(name.clone(), items);
    }

    content
}

fn extract_item(
    dom: &Dom,
    member: NodeId,
    fields: &BTreeMap<String, ItemSelector>,
    asset_root: &str,
) -> BTreeMap<String, String> {
    let mut item = BTreeMap::new();
    for (fname, selector) in fields {
        let Some(node) = dom.resolve_from(member, selector.selector()) else {
            continue;
        };
        let value = match selector.attribute() {
            Some(attr) => {
                let Some(value) = dom.element(node).and_then(|e| e.attr(attr)) else {
                    continue;
                };
                if attr == "src" {
                    links::normalize_asset(value, asset_root)
                } else {
                    value.to_string()
                }
            }
            None => dom.text_content(node),
        };
        if !value.is_empty() {
            item.insert(fname.clone(), value);
        }
    }
    item
}

/// Flatten extracted content into the external seed document shape:
/// page id → fields object, collection name → array of item objects.
pub fn seed_document(content: &ExtractedContent) -> serde_json::Value {
    let mut doc = serde_json::Map::new();
    for (page_id, page) in content {
        if !page.fields.is_empty() {
            doc.insert(
                page_id.clone(),
                serde_json::to_value(&page.fields).unwrap_or_default(),
            );
        }
        for (cname, items) in &page.collections {
            // Collections from several pages concatenate under one key.
            let entry = doc
                .entry(cname.clone())
                .or_insert_with(|| serde_json::Value::Array(Vec::new()));
            if let (serde_json::Value::Array(arr), Ok(serde_json::Value::Array(new))) =
                (entry, serde_json::to_value(items))
            {
                arr.extend(new);
            }
        }
    }
    serde_json::Value::Object(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceConfig;
    use crate::detect;
    use crate::manifest;
    use crate::test_helpers::parsed_page;

    fn extracted(body: &str) -> (PageContent, PageSchema, ParsedPage) {
        let page = parsed_page("index", body);
        let mut warnings = Vec::new();
        let detection = detect::detect(&page.dom, &InferenceConfig::default(), &mut warnings);
        let mut pages = std::collections::BTreeMap::new();
        pages.insert("index".to_string(), detection);
        let schema = manifest::build(pages).pages.remove("index").unwrap();
        let content = extract(&page, &schema, "/assets", &mut warnings);
        (content, schema, page)
    }

    #[test]
    fn text_fields_capture_trimmed_text() {
        let (content, _, _) =
            extracted(r#"<section class="hero"><h1>  Welcome   Home </h1></section>"#);
        assert_eq!(content.fields["hero_title"], "Welcome Home");
    }

    #[test]
    fn image_fields_capture_normalized_src() {
        let (content, _, _) = extracted(r#"<img class="hero-img" src="../images/hero.png">"#);
        assert_eq!(content.fields["hero_img"], "/assets/images/hero.png");
    }

    #[test]
    fn rooted_image_paths_preserved() {
        let (content, _, _) = extracted(r#"<img class="hero-img" src="/assets/images/hero.png">"#);
        assert_eq!(content.fields["hero_img"], "/assets/images/hero.png");
    }

    #[test]
    fn every_collection_instance_yields_an_item() {
        let (content, _, _) = extracted(
            r#"<div>
                <div class="story-card"><h3>Alpha</h3><p>First description long enough.</p></div>
                <div class="story-card"><h3>Beta</h3><p>Second description long enough.</p></div>
                <div class="story-card"><h3>Gamma</h3><p>Third description long enough.</p></div>
            </div>"#,
        );
        let items = &content.collections["story_cards"];
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["title"], "Alpha");
        assert_eq!(items[2]["title"], "Gamma");
    }

    #[test]
    fn item_without_extractable_fields_skipped() {
        let (content, _, _) = extracted(
            r#"<div>
                <div class="card"><h3>Alpha</h3><p>A description long enough to count.</p></div>
                <div class="card"><h3>Beta</h3><p>Another description long enough too.</p></div>
                <div class="card"></div>
            </div>"#,
        );
        let items = &content.collections["cards"];
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn item_link_captures_href() {
        let (content, _, _) = extracted(
            r#"<div>
                <div class="card"><h3>A</h3><a href="read-a.html">Read</a></div>
                <div class="card"><h3>B</h3><a href="read-b.html">Read</a></div>
            </div>"#,
        );
        let items = &content.collections["cards"];
        assert_eq!(items[0]["link"], "read-a.html");
        assert_eq!(items[1]["link"], "read-b.html");
    }

    #[test]
    fn round_trip_every_manifest_entry_yields_content() {
        let (content, schema, _) = extracted(
            r#"<section class="hero"><h1>Welcome</h1>
               <p>Intro paragraph long enough to become a field.</p></section>
               <div>
                 <div class="card"><img src="a.png"><h3>A</h3><p>Long enough description.</p></div>
                 <div class="card"><img src="b.png"><h3>B</h3><p>Long enough description.</p></div>
               </div>"#,
        );
        for name in schema.fields.keys() {
            assert!(
                content.fields.get(name).map(|v| !v.is_empty()).unwrap_or(false),
                "field {name} must extract a value"
            );
        }
        for name in schema.collections.keys() {
            assert!(!content.collections[name].is_empty());
        }
    }

    #[test]
    fn seed_document_shape() {
        let (content, _, _) = extracted(
            r#"<section class="hero"><h1>Welcome</h1></section>
               <div>
                 <div class="card"><h3>A</h3><p>Long enough description text.</p></div>
                 <div class="card"><h3>B</h3><p>Long enough description text.</p></div>
               </div>"#,
        );
        let mut all = ExtractedContent::new();
        all.insert("index".to_string(), content);
        let doc = seed_document(&all);

        assert!(doc["index"]["hero_title"].is_string());
        assert!(doc["cards"].is_array());
        assert_eq!(doc["cards"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn unknown_selector_warns_and_skips() {
        let page = parsed_page("index", "<p>short</p>");
        let mut schema = PageSchema {
            fields: Default::default(),
            collections: Default::default(),
            meta: crate::types::PageMeta {
                route: "/".to_string(),
            },
        };
        schema.fields.insert(
            "ghost".to_string(),
            crate::types::FieldMapping {
                selector: "div.gone > h1".to_string(),
                field_type: FieldType::PlainText,
                required: None,
                default: None,
            },
        );
        let mut warnings = Vec::new();
        let content = extract(&page, &schema, "/assets", &mut warnings);
        assert!(content.fields.is_empty());
        assert!(matches!(
            warnings.as_slice(),
            [Warning::UnknownFieldReference { name, .. }] if name == "ghost"
        ));
    }
}
