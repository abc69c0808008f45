//! # Adaptive Picture
//!
//! An HTML post-processor that turns document-library images into responsive
//! `<picture>` elements. Content editors insert images with a
//! `data-fileEntryId` attribute pointing at a managed file; the host platform
//! pre-generates resized copies of that file ("adaptive media"). This crate
//! connects the two at render time:
//!
//! ```text
//! <img data-fileEntryId="1989" src="/documents/1989"/>
//!   ↓  lookup file 1989 → variants 800w, 1400w
//! <picture>
//!   <source media="(max-width:800px)" srcset="…/800"/>
//!   <source media="(max-width:1400px) and (min-width:800px)" srcset="…/1400"/>
//!   <img src="/documents/1989"/>
//! </picture>
//! ```
//!
//! (Line breaks added for readability; the real output has none.)
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`media`] | Variant records (`AdaptiveMedia`), file ids and versions |
//! | [`finder`] | Collaborator traits: `FileEntryLookup`, `AdaptiveMediaFinder` |
//! | [`picture`] | Pure breakpoint math and `<picture>`/`<source>` rendering |
//! | [`transform`] | `HtmlContentTransformer`: finds adaptable `<img>` tags and rewrites them |
//! | [`catalog`] | JSON-backed implementation of both collaborator traits |
//! | [`site`] | Parallel rewrite of a whole directory tree |
//! | [`config`] | `adaptive.toml` loading, merging and validation |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Pattern Matching, Not Parsing
//!
//! Fragments are scanned with a regular expression rather than parsed into a
//! DOM. Re-serializing a parsed document would normalize whitespace, quoting
//! and attribute order everywhere; matching leaves every byte outside a
//! replaced tag exactly as the author wrote it.
//!
//! ## Degrade, Don't Fail
//!
//! A rendering pipeline should never break a page because an optional
//! enhancement is missing. Unknown files, finder outages and images without
//! variants all leave the original `<img>` in place. The detailed API
//! ([`HtmlContentTransformer::transform_detailed`]) reports those cases for
//! callers that care.
//!
//! ## Collaborators Behind Traits
//!
//! The document library and the media index belong to the host platform. The
//! transformer only sees two single-method traits, so hosts plug in their own
//! services and tests plug in an in-memory mock.

pub mod catalog;
pub mod config;
pub mod finder;
pub mod media;
pub mod output;
pub mod picture;
pub mod site;
pub mod transform;

pub use catalog::Catalog;
pub use finder::{AdaptiveMediaFinder, ConfigurationStatus, FileEntryLookup, LookupError, MediaQuery};
pub use media::{AdaptiveMedia, FileEntryId, FileVersion};
pub use transform::{HtmlContentTransformer, ImageOutcome, ImageStatus, TransformOptions, Transformed};

#[cfg(test)]
pub(crate) mod test_helpers;
