//! End-to-end pipeline test over a small multi-page site.
//!
//! Exercises the full chain — parse, detect, manifest, rewrite, backend,
//! extract — and asserts the cross-artifact consistency the tool promises:
//! every name in the manifest appears spelled identically in the template
//! bindings, the backend schemas, and the seed data.
//!
//! Run with: cargo test --test pipeline

use sitecast::config::SiteConfig;
use sitecast::pipeline::{self, PageInput};

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><title>{title}</title></head><body>{body}</body></html>"
    )
}

fn demo_site() -> Vec<PageInput> {
    let index = r#"
        <section class="hero">
            <h1>Field Notes</h1>
            <p>Dispatches from the workshop, published whenever something interesting breaks.</p>
            <img class="hero-img" src="images/workbench.jpg" srcset="images/workbench@2x.jpg 2x">
            <a class="cta-button" href="signup.html">Subscribe</a>
        </section>
        <div class="grid">
            <div class="story-card">
                <img src="images/lathe.jpg">
                <h3>Restoring the lathe</h3>
                <p>Three weekends of rust removal, and what came out the other side.</p>
                <a href="posts/lathe.html">Read more</a>
            </div>
            <div class="story-card">
                <img src="images/kiln.jpg">
                <h3>Kiln firing log</h3>
                <p>Temperature curves from the first four firings, annotated.</p>
                <a href="posts/kiln.html">Read more</a>
            </div>
            <div class="story-card">
                <img src="images/bench.jpg">
                <h3>A better bench hook</h3>
                <p>Small jig, outsized improvement. Plans included at the end.</p>
                <a href="posts/bench.html">Read more</a>
            </div>
        </div>
        <nav><a href="about.html">About</a> <a href="index.html">Home</a></nav>"#;

    let about = r#"
        <section class="bio">
            <h1>About the workshop</h1>
            <p>One garage, too many machines, and a habit of <em>writing everything down</em>.</p>
        </section>
        <a class="contact-button" href="mailto:shop@example.com">Get in touch</a>"#;

    let pricing = r#"
        <div class="plans">
            <div class="plan-card"><h3>Hobbyist</h3><p>Access to the monthly dispatch archive.</p></div>
            <div class="plan-card"><h3>Member</h3><p>Everything, plus the annotated build plans.</p></div>
        </div>"#;

    vec![
        PageInput {
            page_id: "index".to_string(),
            raw_html: document("Home", index),
        },
        PageInput {
            page_id: "about".to_string(),
            raw_html: document("About", about),
        },
        PageInput {
            page_id: "pricing".to_string(),
            raw_html: document("Pricing", pricing),
        },
    ]
}

#[test]
fn three_page_site_produces_consistent_artifacts() {
    let report = pipeline::run(demo_site(), &SiteConfig::default()).unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(report.manifest.pages.len(), 3);
    assert_eq!(report.templates.len(), 3);

    // Every manifest field name appears as a binding in its page template
    // and as a key in the extracted content.
    for (page_id, page) in &report.manifest.pages {
        let template = report
            .templates
            .iter()
            .find(|t| &t.page_id == page_id)
            .unwrap();
        for name in page.fields.keys() {
            assert!(
                template.html.contains(&format!("content.{name}")),
                "{page_id}: field '{name}' missing from template"
            );
            assert!(
                report.content[page_id].fields.contains_key(name),
                "{page_id}: field '{name}' missing from extracted content"
            );
        }
        for name in page.collections.keys() {
            assert!(
                template.html.contains(&format!("data-repeat=\"content.{name}\"")),
                "{page_id}: collection '{name}' missing repeat directive"
            );
        }
    }
}

#[test]
fn collections_flow_into_backend_and_seed() {
    let report = pipeline::run(demo_site(), &SiteConfig::default()).unwrap();

    let cards = &report.backend_schemas["story_cards"];
    assert_eq!(cards.info.singular_name, "story_card");
    for attr in ["title", "description", "image", "link"] {
        assert!(cards.attributes.contains_key(attr), "missing attribute {attr}");
    }

    let items = report.seed["story_cards"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["title"], "Restoring the lathe");
    // Item images are extracted as rooted asset paths.
    assert_eq!(items[0]["image"], "/assets/images/lathe.jpg");

    let plans = report.seed["plan_cards"].as_array().unwrap();
    assert_eq!(plans.len(), 2);
}

#[test]
fn backend_attribute_names_match_manifest() {
    let report = pipeline::run(demo_site(), &SiteConfig::default()).unwrap();

    for (page_id, page) in &report.manifest.pages {
        if page.fields.is_empty() {
            continue;
        }
        let schema = &report.backend_schemas[page_id.as_str()];
        for name in page.fields.keys() {
            assert!(
                schema.attributes.contains_key(name),
                "{page_id}: '{name}' not in backend schema"
            );
        }
    }
}

#[test]
fn templates_bind_and_normalize() {
    let report = pipeline::run(demo_site(), &SiteConfig::default()).unwrap();
    let index = report
        .templates
        .iter()
        .find(|t| t.page_id == "index")
        .unwrap();

    // Literal content is gone, placeholders in its place.
    assert!(!index.html.contains("Field Notes"));
    assert!(index.html.contains("{{ content.hero_title }}"));
    assert!(index.html.contains(r#"src="{{ content.hero_img }}""#));
    assert!(!index.html.contains("srcset"));

    // Only the first card remains, as the binding template.
    assert_eq!(index.html.matches("story-card").count(), 1);
    assert!(index.html.contains("{{ item.title }}"));

    // Remaining literal references are canonicalized.
    assert!(index.html.contains(r#"href="/about""#));
    assert!(index.html.contains(r#"href="/""#));
}

#[test]
fn email_cta_becomes_email_attribute() {
    let report = pipeline::run(demo_site(), &SiteConfig::default()).unwrap();
    let about = &report.backend_schemas["about"];
    let cta = about
        .attributes
        .iter()
        .find(|(name, _)| name.contains("contact"))
        .map(|(_, attr)| attr)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&cta.attr_type).unwrap(),
        serde_json::json!("email")
    );
}

#[test]
fn rerun_over_same_input_is_byte_identical() {
    let first = pipeline::run(demo_site(), &SiteConfig::default()).unwrap();
    let second = pipeline::run(demo_site(), &SiteConfig::default()).unwrap();

    assert_eq!(
        serde_json::to_string(&first.manifest).unwrap(),
        serde_json::to_string(&second.manifest).unwrap()
    );
    assert_eq!(first.seed, second.seed);
    for (a, b) in first.templates.iter().zip(&second.templates) {
        assert_eq!(a.html, b.html);
    }
}
