//! Shared test utilities for the sitecast test suite.
//!
//! Provides HTML fixture builders used across module tests so each test
//! states only the markup it cares about.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let dom = page_dom(r#"<section class="hero"><h1>Hi</h1></section>"#);
//! let page = parsed_page("index", r#"<h1>Hi</h1>"#);
//! ```

use crate::dom::Dom;
use crate::parse::{self, ParsedPage};

/// Wrap a body fragment in a full document and parse it.
pub fn page_dom(body: &str) -> Dom {
    Dom::parse(&full_document("Test Page", body))
}

/// Wrap a body fragment and run it through the page loader.
pub fn parsed_page(page_id: &str, body: &str) -> ParsedPage {
    let mut warnings = Vec::new();
    parse::parse(&full_document("Test Page", body), page_id, &mut warnings)
        .expect("fixture pages always have a body")
}

/// A complete document around the given body fragment.
pub fn full_document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><title>{title}</title></head><body>{body}</body></html>"
    )
}
