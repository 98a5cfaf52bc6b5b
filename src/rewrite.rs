//! Template rewriting: literal content out, binding placeholders in.
//!
//! Consumes a parsed page plus its schema and produces a portable template:
//!
//! - text fields become `{{ content.<name> }}` interpolations;
//! - image fields bind their `src` attribute to `{{ content.<name> }}`;
//! - rich-text fields get a raw injection marker `{{{ content.<name> }}}` —
//!   rendered unescaped, since the content originates from the store;
//! - the first collection container gets `data-repeat="content.<name>"`
//!   and `data-key="index"`, item fields bind `{{ item.<f> }}`, and all
//!   later repetitions are deleted (the renderer materializes them);
//! - internal navigation links become canonical root-relative routes and
//!   local asset references are rooted under the configured asset prefix.
//!
//! All selectors are resolved to node ids before any mutation, so sibling
//! ordinals cannot shift under the resolver mid-rewrite.
//!
//! Rewriting is idempotent: the root element is stamped `data-bound` and a
//! stamped document is returned unchanged.

use crate::config::SiteConfig;
use crate::dom::{Dom, NodeId};
use crate::links;
use crate::parse::ParsedPage;
use crate::types::{FieldType, PageSchema, Warning};

/// Marker attribute detecting an already-rewritten document.
const BOUND_MARKER: &str = "data-bound";

/// A rewritten page template, ready for an external writer/formatter.
#[derive(Debug, Clone)]
pub struct PortableTemplate {
    pub page_id: String,
    pub html: String,
}

/// Rewrite a parsed page against its schema.
///
/// The page's tree is cloned; the original stays untouched for the
/// extractor. Schema entries that no longer resolve in the live tree are
/// skipped with [`Warning::UnknownFieldReference`].
pub fn rewrite(
    page: &ParsedPage,
    schema: &PageSchema,
    config: &SiteConfig,
    warnings: &mut Vec<Warning>,
) -> PortableTemplate {
    let mut dom = page.dom.clone();

    let already_bound = dom
        .html()
        .and_then(|html| dom.element(html).map(|el| el.attr(BOUND_MARKER).is_some()))
        .unwrap_or(false);
    if already_bound {
        return PortableTemplate {
            page_id: page.page_id.clone(),
            html: dom.serialize(),
        };
    }

    // Resolution phase: pin every schema entry to a node id up front.
    let mut field_targets: Vec<(&str, FieldType, NodeId)> = Vec::new();
    for (name, mapping) in &schema.fields {
        match dom.resolve(&mapping.selector) {
            Some(node) => field_targets.push((name, mapping.field_type, node)),
            None => warnings.push(Warning::UnknownFieldReference {
                name: name.clone(),
                selector: mapping.selector.clone(),
            }),
        }
    }

    struct CollectionTarget<'a> {
        name: &'a str,
        members: Vec<NodeId>,
        item_fields: Vec<(&'a str, Option<&'a str>, NodeId)>,
    }
    let mut collection_targets: Vec<CollectionTarget<'_>> = Vec::new();
    for (name, mapping) in &schema.collections {
        let members = dom.resolve_all(&mapping.selector);
        let Some(&first) = members.first() else {
            warnings.push(Warning::UnknownFieldReference {
                name: name.clone(),
                selector: mapping.selector.clone(),
            });
            continue;
        };
        let mut item_fields = Vec::new();
        for (fname, item) in &mapping.fields {
            match dom.resolve_from(first, item.selector()) {
                Some(node) => item_fields.push((fname.as_str(), item.attribute(), node)),
                None => warnings.push(Warning::UnknownFieldReference {
                    name: format!("{name}.{fname}"),
                    selector: item.selector().to_string(),
                }),
            }
        }
        collection_targets.push(CollectionTarget {
            name,
            members,
            item_fields,
        });
    }

    // Mutation phase.
    for (name, field_type, node) in field_targets {
        bind_field(&mut dom, node, field_type, &format!("content.{name}"));
    }

    for target in collection_targets {
        let first = target.members[0];
        dom.set_attr(first, "data-repeat", &format!("content.{}", target.name));
        dom.set_attr(first, "data-key", "index");
        for (fname, attribute, node) in target.item_fields {
            let binding = format!("item.{fname}");
            match attribute {
                Some(attr) => {
                    dom.set_attr(node, attr, &format!("{{{{ {binding} }}}}"));
                    if attr == "src" {
                        strip_responsive_hints(&mut dom, node);
                    }
                }
                None => dom.set_text(node, &format!("{{{{ {binding} }}}}")),
            }
        }
        for &extra in &target.members[1..] {
            dom.detach(extra);
        }
    }

    normalize_references(&mut dom, config);

    if let Some(html) = dom.html() {
        dom.set_attr(html, BOUND_MARKER, "true");
    }

    PortableTemplate {
        page_id: page.page_id.clone(),
        html: dom.serialize(),
    }
}

fn bind_field(dom: &mut Dom, node: NodeId, field_type: FieldType, binding: &str) {
    match field_type {
        FieldType::RichText => dom.set_text(node, &format!("{{{{{{ {binding} }}}}}}")),
        FieldType::Image => {
            dom.set_attr(node, "src", &format!("{{{{ {binding} }}}}"));
            strip_responsive_hints(dom, node);
        }
        FieldType::Link => dom.set_attr(node, "href", &format!("{{{{ {binding} }}}}")),
        FieldType::PlainText | FieldType::Email | FieldType::Phone => {
            dom.set_text(node, &format!("{{{{ {binding} }}}}"));
        }
    }
}

/// Responsive-hint attributes describe the original export's asset layout
/// and are meaningless once sources are bound.
fn strip_responsive_hints(dom: &mut Dom, node: NodeId) {
    dom.remove_attr(node, "srcset");
    dom.remove_attr(node, "sizes");
}

/// Canonicalize every remaining literal link and asset reference.
/// Placeholder values are already bound and skipped.
fn normalize_references(dom: &mut Dom, config: &SiteConfig) {
    let Some(body) = dom.body() else {
        return;
    };
    for el in dom.descendant_elements(body) {
        match dom.tag(el) {
            Some("a") => {
                let href = dom.element(el).and_then(|e| e.attr("href")).map(str::to_string);
                if let Some(href) = href {
                    if !href.starts_with("{{") {
                        dom.set_attr(el, "href", &links::normalize_link(&href));
                    }
                }
            }
            Some("img") => {
                let src = dom.element(el).and_then(|e| e.attr("src")).map(str::to_string);
                if let Some(src) = src {
                    if !src.starts_with("{{") {
                        dom.set_attr(
                            el,
                            "src",
                            &links::normalize_asset(&src, &config.assets.root_prefix),
                        );
                    }
                }
                strip_responsive_hints(dom, el);
            }
            _ => {}
        }
    }
}
