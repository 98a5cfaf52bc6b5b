//! Centralized identifier naming for all pipeline artifacts.
//!
//! The same field or collection name appears in four places: the content
//! manifest, the rewritten template bindings, the backend schema attributes,
//! and the seed data keys. All four must agree byte-for-byte, so every name
//! is normalized exactly once — here — and reused verbatim downstream. No
//! consumer re-derives names from the tree.
//!
//! ## Normalization
//!
//! Identifiers are lowercased with separator runs collapsed to a single
//! underscore:
//! - `"Story-Card"` → `"story_card"`
//! - `"hero__title"` → `"hero_title"`
//! - `"FAQ Item"` → `"faq_item"`
//!
//! ## Pluralization
//!
//! Repeating backend types get pluralized names using English suffix rules:
//! consonant+`y` → `ies`, sibilant endings (`s`/`x`/`z`/`ch`/`sh`) → `es`,
//! everything else → `s`.

/// Normalize a raw class token or page id into a schema identifier.
///
/// Lowercases, maps `-`, `/`, space, and `.` to `_`, collapses separator
/// runs, and trims leading/trailing separators. Characters outside
/// `[a-z0-9_]` are dropped.
pub fn normalize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_sep = true; // trim leading separators
    for ch in raw.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_sep = false;
        } else if matches!(ch, '-' | '_' | ' ' | '.' | '/') && !last_sep {
            out.push('_');
            last_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Pluralize an identifier for repeating backend types.
///
/// - `"card"` → `"cards"`
/// - `"story"` → `"stories"`
/// - `"box"` → `"boxes"`
/// - `"button"` → `"buttons"`
pub fn pluralize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix('y') {
        let before = stem.chars().next_back();
        if before.map(|c| !is_vowel(c)).unwrap_or(false) {
            return format!("{stem}ies");
        }
    }
    if name.ends_with('s')
        || name.ends_with('x')
        || name.ends_with('z')
        || name.ends_with("ch")
        || name.ends_with("sh")
    {
        return format!("{name}es");
    }
    format!("{name}s")
}

/// Inverse of [`pluralize`] for names that went through it.
///
/// Used by the backend compiler to recover the singular info name from a
/// manifest collection identifier. Only undoes the three suffix rules; it
/// is not a general English singularizer.
pub fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = name.strip_suffix("es") {
        if stem.ends_with('s')
            || stem.ends_with('x')
            || stem.ends_with('z')
            || stem.ends_with("ch")
            || stem.ends_with("sh")
        {
            return stem.to_string();
        }
    }
    name.strip_suffix('s').unwrap_or(name).to_string()
}

/// Human-readable display name: underscores to spaces, each word capitalized.
///
/// `"story_card"` → `"Story Card"`, `"press_release"` → `"Press Release"`.
pub fn display_name(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive the canonical route for a page id.
///
/// `"index"` → `"/"`, `"press-release/article"` → `"/press-release/article"`.
pub fn derive_route(page_id: &str) -> String {
    if page_id == "index" {
        "/".to_string()
    } else {
        format!("/{page_id}")
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
