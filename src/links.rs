//! Link and asset reference normalization.
//!
//! Exported sites carry file-relative references (`about.html`,
//! `../images/hero.png`) that only make sense relative to the export's
//! directory layout. Rewritten templates serve from canonical routes, so
//! both the rewriter and the extractor funnel every reference through the
//! two normalizers here.
//!
//! ## Navigation links
//!
//! Internal hrefs become root-relative routes with the `.html` suffix and
//! any `index` / `./` / `../` segments collapsed:
//!
//! - `"about.html"` → `"/about"`
//! - `"../index.html"` → `"/"`
//! - `"press/release.html"` → `"/press/release"`
//!
//! External, fragment, and protocol links (`https:`, `//`, `#`, `mailto:`,
//! `tel:`) pass through unchanged.
//!
//! ## Asset references
//!
//! Local asset paths are collapsed and rooted under a single asset prefix;
//! remote references pass through. Already-rooted paths are preserved so
//! normalization is idempotent.

/// True when a reference leaves the exported site: absolute URLs,
/// protocol-relative URLs, fragments, and non-navigational schemes.
pub fn is_external(href: &str) -> bool {
    href.starts_with("http://")
        || href.starts_with("https://")
        || href.starts_with("//")
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
}

/// Normalize an internal navigation href to a canonical root-relative route.
///
/// External references are returned unchanged. A link that collapses to
/// nothing (`"index.html"`, `"./"`) becomes the site root `"/"`.
pub fn normalize_link(href: &str) -> String {
    if is_external(href) {
        return href.to_string();
    }

    // Split off a fragment or query suffix before path surgery.
    let (path, suffix) = match href.find(['#', '?']) {
        Some(pos) => (&href[..pos], &href[pos..]),
        None => (href, ""),
    };

    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            // Parent segments from the export layout have no meaning once
            // routes are root-relative; they collapse against what's there.
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    // Drop the .html suffix and any trailing index segment.
    if let Some(last) = segments.last_mut() {
        let stem = last
            .strip_suffix(".html")
            .or_else(|| last.strip_suffix(".htm"))
            .unwrap_or(last);
        *last = stem;
    }
    if segments.last() == Some(&"index") || segments.last() == Some(&"") {
        segments.pop();
    }

    if segments.is_empty() {
        format!("/{suffix}")
    } else {
        format!("/{}{}", segments.join("/"), suffix)
    }
}

/// Normalize a local asset reference under `root` (e.g. `/assets`).
///
/// - `"images/hero.png"` → `"/assets/images/hero.png"`
/// - `"../images/hero.png"` → `"/assets/images/hero.png"`
/// - `"/assets/images/hero.png"` → unchanged
/// - `"https://cdn.example.com/x.png"` → unchanged
pub fn normalize_asset(src: &str, root: &str) -> String {
    if is_external(src) {
        return src.to_string();
    }
    let root = root.trim_end_matches('/');
    if src.starts_with('/') {
        // Already root-relative; leave it alone so re-runs are stable.
        return src.to_string();
    }

    let mut segments: Vec<&str> = Vec::new();
    for seg in src.split('/') {
        match seg {
            "" | "." | ".." => {}
            other => segments.push(other),
        }
    }
    format!("{root}/{}", segments.join("/"))
}
