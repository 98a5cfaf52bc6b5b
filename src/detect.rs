//! Heuristic schema inference over a parsed page tree.
//!
//! Two-pass classification:
//!
//! 1. **Collections** — elements sharing a repeating-content class under
//!    one parent are grouped; groups of two or more structurally similar
//!    members become a collection. The first member is the binding
//!    template: its image/label/heading/paragraph/link children become the
//!    item field schema, and every member's subtree is marked *owned* so
//!    pass 2 never registers the same content again.
//! 2. **Fields** — the remaining tree is walked in document order through
//!    an ordered chain of predicate rules (heading, paragraph, image,
//!    call-to-action). The first rule that claims a node wins.
//!
//! Ownership is a set of stable arena node ids, never in-place tree flags,
//! so inference stays a pure function of its input: identical input yields
//! an identical field/collection set on every run.
//!
//! Misclassification here is not an error. The heuristics deliberately
//! over-detect — an extra editable field costs a little noise, while an
//! undetected one silently hides content from editors.
//!
//! Every selector this module emits is re-resolved against the same tree
//! before being accepted; anything that fails to round-trip is dropped
//! with a [`Warning::SelectorUnresolvable`].

use crate::config::InferenceConfig;
use crate::dom::{Dom, NodeId};
use crate::naming::{normalize_identifier, pluralize};
use crate::types::{CollectionMapping, FieldMapping, FieldType, ItemSelector, Warning};
use std::collections::{BTreeMap, HashSet};

/// Class tokens that mark repeating content. An element whose class list
/// contains one of these (as a `-`/`_`-separated token) is a collection
/// candidate.
const REPEAT_TOKENS: &[&str] = &[
    "card", "item", "post", "feature", "product", "service", "testimonial", "slide", "tile",
    "entry", "member", "story", "article", "teaser", "review", "step", "benefit", "plan",
    "project", "box",
];

/// Substrings in an image's class or src that mark it as decorative.
const DECORATIVE_PATTERNS: &[&str] = &[
    "logo", "icon", "arrow", "divider", "spacer", "decor", "shape", "pattern", "badge-img",
];

/// Ancestor tags/class substrings that disqualify an image as content.
const EXCLUDED_CONTAINER_TAGS: &[&str] = &["nav", "footer", "button"];
const EXCLUDED_CONTAINER_CLASSES: &[&str] = &["nav", "menu", "footer", "logo", "button"];

/// Class tokens that mark a link as a control rather than content.
const CONTROL_LINK_TOKENS: &[&str] = &["button", "btn", "cta", "control", "toggle"];

/// What inference produces for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDetection {
    pub fields: BTreeMap<String, FieldMapping>,
    pub collections: BTreeMap<String, CollectionMapping>,
}

/// Classify a page tree into individual fields and repeating collections.
pub fn detect(dom: &Dom, config: &InferenceConfig, warnings: &mut Vec<Warning>) -> PageDetection {
    let mut detection = PageDetection::default();
    let Some(body) = dom.body() else {
        return detection;
    };

    let mut owned: HashSet<NodeId> = HashSet::new();
    detect_collections(dom, body, config, &mut detection, &mut owned, warnings);
    detect_fields(dom, body, config, &detection.collections, &owned, &mut detection.fields, warnings);
    detection
}

// =============================================================================
// Pass 1: collections
// =============================================================================

fn detect_collections(
    dom: &Dom,
    body: NodeId,
    config: &InferenceConfig,
    detection: &mut PageDetection,
    owned: &mut HashSet<NodeId>,
    warnings: &mut Vec<Warning>,
) {
    // Group candidates by (parent, primary class): repetitions are siblings
    // sharing the structural class. Vec keyed in discovery (document) order
    // so traversal order determines sequencing, never membership.
    let mut groups: Vec<((NodeId, String), Vec<NodeId>)> = Vec::new();
    for el in dom.descendant_elements(body) {
        if owned.contains(&el) {
            continue;
        }
        let Some(class) = primary_repeat_class(dom, el, config) else {
            continue;
        };
        let Some(parent) = dom.parent(el) else {
            continue;
        };
        let key = (parent, class);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(el),
            None => groups.push((key, vec![el])),
        }
    }

    for ((_, class), members) in groups {
        // Members claimed by an earlier (enclosing) collection are gone.
        let members: Vec<NodeId> = members
            .into_iter()
            .filter(|m| !owned.contains(m))
            .collect();
        let Some(&first_member) = members.first() else {
            continue;
        };
        // Repetition means same tag as the first member.
        let first_tag = dom.tag(first_member).unwrap_or_default().to_string();
        let members: Vec<NodeId> = members
            .into_iter()
            .filter(|&m| dom.tag(m) == Some(first_tag.as_str()))
            .collect();
        if members.len() < 2 || !structurally_similar(dom, members[0], members[1]) {
            continue;
        }

        let name = pluralize(&normalize_identifier(&class));
        if name.is_empty() {
            continue;
        }

        let first = members[0];
        let Some(selector) = dom.selector_for_container(first) else {
            continue;
        };
        // Round-trip check: the container selector must find the first
        // member first, and every sibling repetition after it.
        let resolved = dom.resolve_all(&selector);
        if resolved.first() != Some(&first) || resolved.len() < 2 {
            warnings.push(Warning::SelectorUnresolvable {
                name: name.clone(),
                selector,
            });
            continue;
        }

        let fields = item_fields(dom, first, config, &name, warnings);
        if fields.is_empty() {
            continue;
        }

        // Every member's subtree is owned from here on; pass 2 must not
        // re-register the same content as individual fields.
        for &member in &members {
            owned.insert(member);
            owned.extend(dom.descendants(member));
        }

        if detection.collections.contains_key(&name) {
            warnings.push(Warning::SchemaNameCollision { name: name.clone() });
        }
        detection.collections.insert(
            name,
            CollectionMapping {
                selector,
                fields,
                limit: None,
            },
        );
    }
}

/// The first class whose token list contains a repeating-content token.
fn primary_repeat_class(dom: &Dom, el: NodeId, config: &InferenceConfig) -> Option<String> {
    let element = dom.element(el)?;
    for class in element.classes() {
        let is_repeat = class
            .split(['-', '_'])
            .any(|tok| {
                let tok = tok.to_ascii_lowercase();
                REPEAT_TOKENS.contains(&tok.as_str())
                    || config.extra_repeat_tokens.iter().any(|t| t == &tok)
            });
        if is_repeat {
            return Some(class.to_string());
        }
    }
    None
}

/// Two members are structurally similar when their descendant tag
/// signatures overlap by at least half.
fn structurally_similar(dom: &Dom, a: NodeId, b: NodeId) -> bool {
    let sig = |n: NodeId| -> Vec<String> {
        let mut tags: Vec<String> = dom
            .descendant_elements(n)
            .into_iter()
            .filter_map(|e| dom.tag(e).map(str::to_string))
            .collect();
        tags.sort();
        tags
    };
    let (sa, sb) = (sig(a), sig(b));
    if sa.is_empty() && sb.is_empty() {
        return true;
    }
    let mut remaining = sb.clone();
    let mut shared = 0usize;
    for tag in &sa {
        if let Some(pos) = remaining.iter().position(|t| t == tag) {
            remaining.remove(pos);
            shared += 1;
        }
    }
    shared * 2 >= sa.len() + sb.len()
}

/// Scan the first group member for the item field schema: a leading
/// non-decorative image, a short label, the first heading, the first long
/// paragraph, and a non-control link.
fn item_fields(
    dom: &Dom,
    item: NodeId,
    config: &InferenceConfig,
    collection: &str,
    warnings: &mut Vec<Warning>,
) -> BTreeMap<String, ItemSelector> {
    let mut fields = BTreeMap::new();
    let descendants = dom.descendant_elements(item);

    let heading_pos = descendants.iter().position(|&n| is_heading(dom, n));

    let image = descendants
        .iter()
        .find(|&&n| dom.tag(n) == Some("img") && !is_decorative_image(dom, n, config));
    if let Some(&img) = image {
        add_item_field(
            dom, item, collection, &mut fields, "image", img,
            Some("src"), warnings,
        );
    }

    let label = descendants.iter().enumerate().find(|&(i, &n)| {
        if heading_pos.map(|h| i >= h).unwrap_or(false) {
            return false;
        }
        if !matches!(dom.tag(n), Some("span") | Some("small")) {
            return false;
        }
        let text = dom.text_content(n);
        !text.is_empty() && text.len() <= 30
    });
    if let Some((_, &node)) = label {
        add_item_field(dom, item, collection, &mut fields, "label", node, None, warnings);
    }

    if let Some(pos) = heading_pos {
        add_item_field(
            dom, item, collection, &mut fields, "title", descendants[pos], None, warnings,
        );
    }

    let paragraph = descendants.iter().find(|&&n| {
        dom.tag(n) == Some("p") && dom.text_content(n).len() > config.min_paragraph_len
    });
    if let Some(&p) = paragraph {
        add_item_field(dom, item, collection, &mut fields, "description", p, None, warnings);
    }

    let link = descendants.iter().find(|&&n| {
        dom.tag(n) == Some("a")
            && dom.element(n).map(|e| e.attr("href").is_some()).unwrap_or(false)
            && !is_control_link(dom, n)
    });
    if let Some(&a) = link {
        add_item_field(dom, item, collection, &mut fields, "link", a, Some("href"), warnings);
    }

    fields
}

#[allow(clippy::too_many_arguments)]
fn add_item_field(
    dom: &Dom,
    item: NodeId,
    collection: &str,
    fields: &mut BTreeMap<String, ItemSelector>,
    name: &str,
    node: NodeId,
    attribute: Option<&str>,
    warnings: &mut Vec<Warning>,
) {
    let Some(selector) = dom.selector_relative(node, item) else {
        return;
    };
    // Relative selectors must address the same node back through the item.
    if dom.resolve_from(item, &selector) != Some(node) {
        warnings.push(Warning::SelectorUnresolvable {
            name: format!("{collection}.{name}"),
            selector,
        });
        return;
    }
    let mapping = match attribute {
        Some(attr) => ItemSelector::Attr {
            selector,
            attribute: attr.to_string(),
        },
        None => ItemSelector::Text(selector),
    };
    fields.insert(name.to_string(), mapping);
}

fn is_control_link(dom: &Dom, node: NodeId) -> bool {
    dom.element(node)
        .map(|el| {
            el.classes().any(|c| {
                let c = c.to_ascii_lowercase();
                CONTROL_LINK_TOKENS.iter().any(|t| c.contains(t))
            })
        })
        .unwrap_or(false)
}

// =============================================================================
// Pass 2: individual fields
// =============================================================================

/// One heuristic in the field classification chain. Rules run in order per
/// node; the first one that claims a node wins. Keeping them as data makes
/// each independently testable and the chain extensible.
struct FieldRule {
    #[allow(dead_code)]
    name: &'static str,
    apply: fn(&mut FieldPass<'_>, NodeId) -> Option<(String, FieldType)>,
}

const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        name: "heading",
        apply: heading_rule,
    },
    FieldRule {
        name: "paragraph",
        apply: paragraph_rule,
    },
    FieldRule {
        name: "content-image",
        apply: image_rule,
    },
    FieldRule {
        name: "call-to-action",
        apply: cta_rule,
    },
];

/// Mutable state threaded through the field pass: ordinal counters for
/// fallback names and the one-shot call-to-action latch.
struct FieldPass<'a> {
    dom: &'a Dom,
    config: &'a InferenceConfig,
    heading_count: usize,
    paragraph_count: usize,
    image_count: usize,
    cta_taken: bool,
}

fn detect_fields(
    dom: &Dom,
    body: NodeId,
    config: &InferenceConfig,
    collections: &BTreeMap<String, CollectionMapping>,
    owned: &HashSet<NodeId>,
    fields: &mut BTreeMap<String, FieldMapping>,
    warnings: &mut Vec<Warning>,
) {
    let mut pass = FieldPass {
        dom,
        config,
        heading_count: 0,
        paragraph_count: 0,
        image_count: 0,
        cta_taken: false,
    };

    for el in dom.descendant_elements(body) {
        if owned.contains(&el) {
            continue;
        }
        let Some(claim) = FIELD_RULES.iter().find_map(|rule| (rule.apply)(&mut pass, el))
        else {
            continue;
        };
        let (name, field_type) = claim;

        let Some(selector) = dom.selector_for(el) else {
            continue;
        };
        if dom.resolve(&selector) != Some(el) {
            warnings.push(Warning::SelectorUnresolvable { name, selector });
            continue;
        }
        if fields.contains_key(&name) || collections.contains_key(&name) {
            warnings.push(Warning::SchemaNameCollision { name: name.clone() });
        }
        fields.insert(
            name,
            FieldMapping {
                selector,
                field_type,
                required: None,
                default: None,
            },
        );
    }
}

fn heading_rule(pass: &mut FieldPass<'_>, el: NodeId) -> Option<(String, FieldType)> {
    if !is_heading(pass.dom, el) || pass.dom.text_content(el).is_empty() {
        return None;
    }
    pass.heading_count += 1;
    let name = own_class_name(pass.dom, el)
        .or_else(|| context_name(pass, el, "title"))
        .unwrap_or_else(|| format!("heading_{}", pass.heading_count));
    Some((name, FieldType::PlainText))
}

fn paragraph_rule(pass: &mut FieldPass<'_>, el: NodeId) -> Option<(String, FieldType)> {
    if pass.dom.tag(el) != Some("p") {
        return None;
    }
    let text = pass.dom.text_content(el);
    if text.len() <= pass.config.min_paragraph_len {
        return None;
    }
    pass.paragraph_count += 1;
    let name = own_class_name(pass.dom, el)
        .or_else(|| context_name(pass, el, "text"))
        .unwrap_or_else(|| format!("paragraph_{}", pass.paragraph_count));
    let field_type = if has_inline_formatting(pass.dom, el) {
        FieldType::RichText
    } else {
        FieldType::PlainText
    };
    Some((name, field_type))
}

fn image_rule(pass: &mut FieldPass<'_>, el: NodeId) -> Option<(String, FieldType)> {
    if pass.dom.tag(el) != Some("img") {
        return None;
    }
    pass.dom.element(el)?.attr("src")?;
    if is_decorative_image(pass.dom, el, pass.config) {
        return None;
    }
    pass.image_count += 1;
    let name = own_class_name(pass.dom, el)
        .or_else(|| context_name(pass, el, "image"))
        .unwrap_or_else(|| format!("image_{}", pass.image_count));
    Some((name, FieldType::Image))
}

fn cta_rule(pass: &mut FieldPass<'_>, el: NodeId) -> Option<(String, FieldType)> {
    if pass.cta_taken {
        return None;
    }
    let tag = pass.dom.tag(el)?;
    if tag != "a" && tag != "button" {
        return None;
    }
    let element = pass.dom.element(el)?;
    let is_button = tag == "button"
        || element.classes().any(|c| {
            let c = c.to_ascii_lowercase();
            CONTROL_LINK_TOKENS
                .iter()
                .any(|t| c.split(['-', '_']).any(|tok| tok == *t) || c == *t)
        });
    if !is_button || pass.dom.text_content(el).is_empty() {
        return None;
    }
    pass.cta_taken = true;

    // mailto/tel call-to-actions get contact typing so the backend can
    // validate them.
    let field_type = match element.attr("href") {
        Some(href) if href.starts_with("mailto:") => FieldType::Email,
        Some(href) if href.starts_with("tel:") => FieldType::Phone,
        _ => FieldType::PlainText,
    };
    let name = own_class_name(pass.dom, el).unwrap_or_else(|| "cta".to_string());
    Some((name, field_type))
}

// =============================================================================
// Shared predicates and naming helpers
// =============================================================================

fn is_heading(dom: &Dom, el: NodeId) -> bool {
    matches!(
        dom.tag(el),
        Some("h1") | Some("h2") | Some("h3") | Some("h4") | Some("h5") | Some("h6")
    )
}

/// Normalized first class of the element itself, if usable as a name.
fn own_class_name(dom: &Dom, el: NodeId) -> Option<String> {
    let class = dom.element(el)?.first_class()?;
    let name = normalize_identifier(class);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Name modifier from the nearest classed ancestor within the configured
/// depth: `section.hero > h1` → `hero_title`.
fn context_name(pass: &FieldPass<'_>, el: NodeId, suffix: &str) -> Option<String> {
    let dom = pass.dom;
    let body = dom.body()?;
    let mut cur = dom.parent(el)?;
    for _ in 0..pass.config.max_ancestor_depth {
        if cur == body {
            return None;
        }
        if let Some(class) = dom.element(cur).and_then(|e| e.first_class()) {
            let modifier = normalize_identifier(class);
            if !modifier.is_empty() {
                return Some(format!("{modifier}_{suffix}"));
            }
        }
        cur = dom.parent(cur)?;
    }
    None
}

fn has_inline_formatting(dom: &Dom, el: NodeId) -> bool {
    dom.descendant_elements(el).into_iter().any(|n| {
        matches!(
            dom.tag(n),
            Some("a") | Some("strong") | Some("em") | Some("b") | Some("i") | Some("u")
                | Some("code") | Some("br")
        )
    })
}

/// An image is decorative when its class/src matches a decorative pattern
/// or it sits inside a navigation, button, footer, or logo container.
fn is_decorative_image(dom: &Dom, el: NodeId, config: &InferenceConfig) -> bool {
    if let Some(element) = dom.element(el) {
        let mut haystacks: Vec<String> = element.classes().map(str::to_ascii_lowercase).collect();
        if let Some(src) = element.attr("src") {
            haystacks.push(src.to_ascii_lowercase());
        }
        let decorative = haystacks.iter().any(|h| {
            DECORATIVE_PATTERNS.iter().any(|p| h.contains(p))
                || config
                    .extra_decorative_patterns
                    .iter()
                    .any(|p| h.contains(p.as_str()))
        });
        if decorative {
            return true;
        }
    }

    let body = dom.body();
    let mut cur = dom.parent(el);
    while let Some(node) = cur {
        if Some(node) == body {
            break;
        }
        if let Some(element) = dom.element(node) {
            if EXCLUDED_CONTAINER_TAGS.contains(&element.tag.as_str()) {
                return true;
            }
            let excluded = element.classes().any(|c| {
                let c = c.to_ascii_lowercase();
                EXCLUDED_CONTAINER_CLASSES.iter().any(|t| c.contains(t))
            });
            if excluded {
                return true;
            }
        }
        cur = dom.parent(node);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::page_dom;

    fn run(dom: &Dom) -> (PageDetection, Vec<Warning>) {
        let mut warnings = Vec::new();
        let detection = detect(dom, &InferenceConfig::default(), &mut warnings);
        (detection, warnings)
    }

    // =========================================================================
    // Collection detection
    // =========================================================================

    const STORY_CARDS: &str = r#"
        <div class="grid">
            <div class="story-card">
                <img src="images/a.png" alt="">
                <h3>First story</h3>
                <p>A description that is comfortably over twenty characters.</p>
            </div>
            <div class="story-card">
                <img src="images/b.png" alt="">
                <h3>Second story</h3>
                <p>Another description that is also over twenty characters.</p>
            </div>
            <div class="story-card">
                <img src="images/c.png" alt="">
                <h3>Third story</h3>
                <p>Yet another description that is over twenty characters.</p>
            </div>
        </div>"#;

    #[test]
    fn sibling_cards_become_one_collection() {
        let dom = page_dom(STORY_CARDS);
        let (detection, _) = run(&dom);

        assert_eq!(detection.collections.len(), 1);
        let cards = detection.collections.get("story_cards").unwrap();
        assert!(cards.fields.contains_key("image"));
        assert!(cards.fields.contains_key("title"));
        assert!(cards.fields.contains_key("description"));
    }

    #[test]
    fn collection_members_never_duplicate_as_fields() {
        let dom = page_dom(STORY_CARDS);
        let (detection, _) = run(&dom);
        // Headings, paragraphs, and images inside the cards are owned.
        assert!(detection.fields.is_empty());
    }

    #[test]
    fn container_selector_matches_all_members() {
        let dom = page_dom(STORY_CARDS);
        let (detection, _) = run(&dom);
        let cards = detection.collections.get("story_cards").unwrap();
        assert_eq!(dom.resolve_all(&cards.selector).len(), 3);
    }

    #[test]
    fn item_image_captures_src_attribute() {
        let dom = page_dom(STORY_CARDS);
        let (detection, _) = run(&dom);
        let cards = detection.collections.get("story_cards").unwrap();
        assert_eq!(cards.fields.get("image").unwrap().attribute(), Some("src"));
    }

    #[test]
    fn single_element_is_not_a_collection() {
        let dom = page_dom(
            r#"<div class="story-card"><h3>Lonely</h3>
               <p>One card alone is just page content, not repetition.</p></div>"#,
        );
        let (detection, _) = run(&dom);
        assert!(detection.collections.is_empty());
        // Its heading surfaces as an individual field instead.
        assert!(!detection.fields.is_empty());
    }

    #[test]
    fn dissimilar_members_are_not_grouped() {
        let dom = page_dom(
            r#"<div>
                <div class="item"><img src="a.png"><h3>A</h3><p>Long enough description here.</p></div>
                <div class="item"><table><tr><td>totally different structure</td></tr></table></div>
            </div>"#,
        );
        let (detection, _) = run(&dom);
        assert!(detection.collections.is_empty());
    }

    #[test]
    fn collection_name_is_pluralized() {
        let dom = page_dom(
            r#"<ul>
                <li class="story"><h3>A</h3><p>First long enough description.</p></li>
                <li class="story"><h3>B</h3><p>Second long enough description.</p></li>
            </ul>"#,
        );
        let (detection, _) = run(&dom);
        assert!(detection.collections.contains_key("stories"));
    }

    #[test]
    fn item_link_skips_control_links() {
        let dom = page_dom(
            r#"<div>
                <div class="card"><h3>A</h3><a class="btn-primary" href="/x">Go</a>
                    <a href="read.html">Read</a></div>
                <div class="card"><h3>B</h3><a class="btn-primary" href="/y">Go</a>
                    <a href="more.html">More</a></div>
            </div>"#,
        );
        let (detection, _) = run(&dom);
        let cards = detection.collections.get("cards").unwrap();
        let link = cards.fields.get("link").unwrap();
        let first = dom.resolve_all(&cards.selector)[0];
        let target = dom.resolve_from(first, link.selector()).unwrap();
        assert_eq!(dom.element(target).unwrap().attr("href"), Some("read.html"));
    }

    // =========================================================================
    // Field detection
    // =========================================================================

    #[test]
    fn heading_named_from_own_class() {
        let dom = page_dom(r#"<h1 class="page-title">Welcome</h1>"#);
        let (detection, _) = run(&dom);
        assert!(detection.fields.contains_key("page_title"));
    }

    #[test]
    fn heading_named_from_ancestor_context() {
        let dom = page_dom(r#"<section class="hero"><div><h1>Welcome</h1></div></section>"#);
        let (detection, _) = run(&dom);
        assert!(detection.fields.contains_key("hero_title"));
    }

    #[test]
    fn heading_ordinal_fallback() {
        let dom = page_dom("<h2>First</h2><h2>Second</h2>");
        let (detection, _) = run(&dom);
        assert!(detection.fields.contains_key("heading_1"));
        assert!(detection.fields.contains_key("heading_2"));
    }

    #[test]
    fn short_paragraphs_ignored() {
        let dom = page_dom("<p>tiny</p>");
        let (detection, _) = run(&dom);
        assert!(detection.fields.is_empty());
    }

    #[test]
    fn formatted_paragraph_is_rich_text() {
        let dom = page_dom(
            r#"<p class="intro">Some long text with a <a href="/x">link</a> inside of it.</p>
               <p class="plain">Some long text with no formatting in it at all.</p>"#,
        );
        let (detection, _) = run(&dom);
        assert_eq!(
            detection.fields.get("intro").unwrap().field_type,
            FieldType::RichText
        );
        assert_eq!(
            detection.fields.get("plain").unwrap().field_type,
            FieldType::PlainText
        );
    }

    #[test]
    fn nav_and_logo_images_excluded() {
        let dom = page_dom(
            r#"<nav><img src="images/menu.png"></nav>
               <div class="site-logo"><img src="images/brand.png"></div>
               <img src="images/logo-small.png">
               <img class="hero-img" src="images/hero.png">"#,
        );
        let (detection, _) = run(&dom);
        let image_fields: Vec<_> = detection
            .fields
            .values()
            .filter(|f| f.field_type == FieldType::Image)
            .collect();
        assert_eq!(image_fields.len(), 1);
        assert!(detection.fields.contains_key("hero_img"));
    }

    #[test]
    fn footer_images_excluded() {
        let dom = page_dom(r#"<footer><img src="images/social.png"></footer>"#);
        let (detection, _) = run(&dom);
        assert!(detection.fields.is_empty());
    }

    #[test]
    fn primary_cta_text_detected_once() {
        let dom = page_dom(
            r#"<a class="button" href="/signup">Sign up</a>
               <a class="button" href="/more">Secondary</a>"#,
        );
        let (detection, _) = run(&dom);
        let f = detection.fields.get("button").unwrap();
        assert_eq!(f.field_type, FieldType::PlainText);
        let el = dom.resolve(&f.selector).unwrap();
        assert_eq!(dom.text_content(el), "Sign up");
        assert_eq!(detection.fields.len(), 1);
    }

    #[test]
    fn mailto_cta_typed_as_email() {
        let dom = page_dom(r#"<a class="cta" href="mailto:hi@example.com">Email us</a>"#);
        let (detection, _) = run(&dom);
        assert_eq!(
            detection.fields.get("cta").unwrap().field_type,
            FieldType::Email
        );
    }

    #[test]
    fn tel_cta_typed_as_phone() {
        let dom = page_dom(r#"<a class="cta" href="tel:+15551234">Call us</a>"#);
        let (detection, _) = run(&dom);
        assert_eq!(
            detection.fields.get("cta").unwrap().field_type,
            FieldType::Phone
        );
    }

    #[test]
    fn name_collision_warns_and_last_write_wins() {
        let dom = page_dom(
            r#"<section class="about"><h2 class="blurb">First</h2></section>
               <section class="team"><h2 class="blurb">Second</h2></section>"#,
        );
        let (detection, warnings) = run(&dom);
        assert_eq!(detection.fields.len(), 1);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::SchemaNameCollision { name } if name == "blurb")));
        let el = dom.resolve(&detection.fields.get("blurb").unwrap().selector).unwrap();
        assert_eq!(dom.text_content(el), "Second");
    }

    // =========================================================================
    // Invariants
    // =========================================================================

    #[test]
    fn every_emitted_selector_resolves() {
        let dom = page_dom(&format!(
            r#"<section class="hero"><h1>Big Welcome</h1>
               <p>An introduction paragraph that is long enough to count.</p>
               <img class="hero-img" src="images/hero.png"></section>{STORY_CARDS}"#
        ));
        let (detection, _) = run(&dom);
        for mapping in detection.fields.values() {
            assert!(dom.resolve(&mapping.selector).is_some(), "{}", mapping.selector);
        }
        for collection in detection.collections.values() {
            let members = dom.resolve_all(&collection.selector);
            assert!(members.len() >= 2);
            for item in collection.fields.values() {
                assert!(dom.resolve_from(members[0], item.selector()).is_some());
            }
        }
    }

    #[test]
    fn identical_input_yields_identical_detection() {
        let html = format!(
            r#"<section class="hero"><h1>Welcome</h1></section>{STORY_CARDS}
               <p>Closing paragraph, also long enough to be detected.</p>"#
        );
        let (a, _) = run(&page_dom(&html));
        let (b, _) = run(&page_dom(&html));
        assert_eq!(a, b);
    }
}
