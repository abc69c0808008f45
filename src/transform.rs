//! HTML content transformer: `<img data-fileEntryId>` → `<picture>`.
//!
//! Scans an HTML fragment for `<img>` tags carrying a `data-fileEntryId`
//! attribute, resolves the referenced file through [`FileEntryLookup`],
//! asks the [`AdaptiveMediaFinder`] for its variants and, when at least one
//! variant has a width, swaps the tag for a `<picture>`:
//!
//! ```text
//! <img data-fileEntryId="1989" src="adaptable"/>
//!   ↓
//! <picture><source media="(max-width:1989px)" srcset="http://very.adaptive.com/1989"/><img src="adaptable"/></picture>
//! ```
//!
//! ## Matching
//!
//! - Tag and attribute names match case-insensitively (`data-fileentryid`,
//!   `<IMG …>`).
//! - Whitespace inside the tag, newlines included, is tolerated anywhere.
//! - Only a double-quoted run of decimal digits counts as an id
//!   (`data-fileEntryId="1989"`). Single-quoted (`'1989'`) and unquoted
//!   (`=1989`) values are not recognized, so those tags are left alone, as is
//!   any other value or a number too large for [`FileEntryId`].
//!
//! The attribute, with the whitespace in front of it, is removed from the
//! `<img>` kept inside the `<picture>`. Every byte outside a replaced tag is
//! copied through unchanged.
//!
//! ## Failure Handling
//!
//! A tag whose file cannot be resolved, whose variant query fails, or which
//! has no sized variants is left exactly as it was. These cases are logged at
//! `debug` and reported through [`Transformed::outcomes`]; they are never
//! errors for the caller.

use crate::config::AdaptiveConfig;
use crate::finder::{AdaptiveMediaFinder, ConfigurationStatus, FileEntryLookup, LookupError, MediaQuery};
use crate::media::FileEntryId;
use crate::picture::{self, Breakpoint};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static IMG_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("img tag pattern is valid"));

static FILE_ENTRY_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+data-fileentryid\s*=\s*"(\d+)""#)
        .expect("file entry attribute pattern is valid")
});

/// Knobs for the transformer, derived from [`AdaptiveConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Which variant configurations to use when building sources.
    pub status: ConfigurationStatus,
}

impl TransformOptions {
    pub fn from_config(config: &AdaptiveConfig) -> Self {
        Self {
            status: config.transform.configuration_status,
        }
    }
}

/// What happened to one matched `<img>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// Replaced by a `<picture>` with this many `<source>` elements.
    Replaced { sources: usize },
    /// The file resolved but no variant with a width exists.
    NoVariants,
    /// The file or its variants could not be looked up.
    Unresolved(LookupError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutcome {
    pub file_entry_id: FileEntryId,
    pub status: ImageStatus,
}

/// Result of [`HtmlContentTransformer::transform_detailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub html: String,
    /// One entry per matched tag, in document order.
    pub outcomes: Vec<ImageOutcome>,
}

impl Transformed {
    pub fn replaced(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ImageStatus::Replaced { .. }))
            .count()
    }
}

/// An `<img>` tag that carries a usable file entry id.
struct AdaptableImage<'h> {
    id: FileEntryId,
    /// The tag with the attribute (and its leading whitespace) removed.
    stripped: String,
    tag: &'h str,
}

impl<'h> AdaptableImage<'h> {
    fn parse(tag: &'h str) -> Option<Self> {
        let caps = FILE_ENTRY_ATTRIBUTE.captures(tag)?;
        let attr = caps.get(0)?;
        let id = caps[1].parse::<FileEntryId>().ok()?;
        let mut stripped = String::with_capacity(tag.len());
        stripped.push_str(&tag[..attr.start()]);
        stripped.push_str(&tag[attr.end()..]);
        Some(Self { id, stripped, tag })
    }
}

/// Rewrites adaptable `<img>` tags into responsive `<picture>` elements.
pub struct HtmlContentTransformer<L, F> {
    lookup: L,
    finder: F,
    options: TransformOptions,
}

impl<L: FileEntryLookup, F: AdaptiveMediaFinder> HtmlContentTransformer<L, F> {
    pub fn new(lookup: L, finder: F) -> Self {
        Self {
            lookup,
            finder,
            options: TransformOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> TransformOptions {
        self.options
    }

    /// Rewrite every adaptable image in `html`.
    pub fn transform(&self, html: &str) -> String {
        self.transform_detailed(html).html
    }

    /// Like [`transform`](Self::transform), also reporting what happened to
    /// each matched tag.
    pub fn transform_detailed(&self, html: &str) -> Transformed {
        let mut out = String::with_capacity(html.len());
        let mut outcomes = Vec::new();
        let mut last = 0;

        for m in IMG_TAG.find_iter(html) {
            let Some(image) = AdaptableImage::parse(m.as_str()) else {
                continue;
            };
            out.push_str(&html[last..m.start()]);
            last = m.end();

            let status = match self.breakpoints_for(image.id) {
                Ok(bps) if bps.is_empty() => {
                    debug!(file_entry_id = %image.id, "no sized adaptive media, leaving image untouched");
                    out.push_str(image.tag);
                    ImageStatus::NoVariants
                }
                Ok(bps) => {
                    out.push_str(&picture::render_picture(&image.stripped, &bps));
                    ImageStatus::Replaced { sources: bps.len() }
                }
                Err(err) => {
                    debug!(file_entry_id = %image.id, error = %err, "lookup failed, leaving image untouched");
                    out.push_str(image.tag);
                    ImageStatus::Unresolved(err)
                }
            };
            outcomes.push(ImageOutcome {
                file_entry_id: image.id,
                status,
            });
        }

        out.push_str(&html[last..]);
        Transformed {
            html: out,
            outcomes,
        }
    }

    fn breakpoints_for(&self, id: FileEntryId) -> Result<Vec<Breakpoint>, LookupError> {
        let version = self.lookup.file_version(id)?;
        let query = MediaQuery::for_version(&version).with_status(self.options.status);
        let variants = self.finder.adaptive_media(&query)?;
        Ok(picture::breakpoints(variants))
    }
}
