//! # Sitecast
//!
//! Schema inference and codegen for exported static HTML sites. Point it
//! at a directory of exported pages and it infers which parts of the
//! markup are *content* — headings, body copy, images, calls to action,
//! repeating card grids — and which are structure. From that single
//! inference it generates everything a headless migration needs.
//!
//! # Architecture: One Manifest, Three Projections
//!
//! Sitecast runs a per-page inference chain and merges the results into a
//! single content manifest, which is then projected into three artifacts:
//!
//! ```text
//! 1. Parse     *.html    →  page trees        (html5ever, recovery tolerated)
//! 2. Detect    tree      →  fields/collections (heuristic inference)
//! 3. Manifest  pages     →  content-manifest.json
//! 4. Project   manifest  →  templates/         (binding placeholders)
//!                        →  backend/*.schema.json (content types)
//!                        →  seed.json           (extracted literal content)
//! ```
//!
//! The manifest is the single source of truth. The rewriter, the backend
//! compiler, and the extractor all read names and selectors from it and
//! never re-derive them from the tree — that is what keeps a field named
//! `hero_title` spelled identically in all four artifacts.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`parse`] | Stage 1 — loads raw markup into a mutable tree, strips scripts/styles, collects asset and nav references |
//! | [`dom`] | The tree itself: arena storage, CSS-like selector generation and resolution, serialization |
//! | [`detect`] | Stage 2 — heuristic field and collection inference over the tree |
//! | [`manifest`] | Stage 3 — merges per-page detections into the versioned manifest, construct-then-load store |
//! | [`rewrite`] | Projection — replaces literal content with binding placeholders, producing portable templates |
//! | [`backend`] | Projection — compiles the manifest into backend content-type schemas |
//! | [`extract`] | Projection — pulls literal values back out of the original trees as seed content |
//! | [`pipeline`] | Orchestration — parallel per-page fan-out, warning collection, report assembly |
//! | [`config`] | `config.toml` loading, validation, and merging over stock defaults |
//! | [`types`] | Shared types serialized between stages (manifest document, warnings) |
//! | [`naming`] | Identifier normalization, pluralization, display names, routes |
//! | [`links`] | Link and asset path canonicalization |
//! | [`output`] | CLI output formatting — inventory display of inference results |
//!
//! # Design Decisions
//!
//! ## Selectors Over Node Handles
//!
//! The manifest stores CSS-like child paths (`section.hero > h1`), not
//! node ids. Selectors survive serialization, are human-auditable in the
//! manifest JSON, and re-resolve against a freshly parsed tree — which is
//! exactly what the extractor and a re-run both need. The cost is that a
//! selector can fail to re-resolve after markup changes; that is surfaced
//! as a warning, never a panic.
//!
//! ## Heuristics Over Configuration
//!
//! There is no per-site annotation format. Detection rides entirely on
//! conventions already present in exported markup: class vocabulary
//! (`card`, `item`, `post`), structural repetition, element roles, and
//! text length. The config file only *tunes* the heuristics (thresholds,
//! extra vocabulary) — it never names individual fields.
//!
//! ## Deterministic Artifacts
//!
//! Every map in every serialized document is a `BTreeMap` and every
//! traversal is document-ordered, so re-running over unchanged input
//! produces byte-identical artifacts. Rewriting is additionally
//! idempotent: rewritten documents are stamped and pass through
//! unchanged.

pub mod backend;
pub mod config;
pub mod detect;
pub mod dom;
pub mod extract;
pub mod links;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod rewrite;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
