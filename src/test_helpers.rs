//! Shared test utilities for the adaptive-picture test suite.
//!
//! Provides fixture builders for the media model and [`MockLibrary`], an
//! in-memory stand-in for both collaborator traits that records every query
//! it receives.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let library = MockLibrary::new().with_file(1989, vec![variant(800, "http://x/800")]);
//! let transformer = HtmlContentTransformer::new(&library, &library);
//! transformer.transform("<img data-fileEntryId=\"1989\"/>");
//! assert_eq!(library.queries().len(), 1);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use crate::finder::{AdaptiveMediaFinder, FileEntryLookup, LookupError, MediaQuery};
use crate::media::{AdaptiveMedia, FileEntryId, FileVersion};
use url::Url;

// =========================================================================
// Fixture builders
// =========================================================================

/// A version record for `id` with predictable field values.
pub fn file_version(id: u64) -> FileVersion {
    FileVersion {
        file_entry_id: FileEntryId(id),
        file_version_id: id * 10,
        version: "1.0".to_string(),
        file_name: format!("file-{id}.jpg"),
        mime_type: "image/jpeg".to_string(),
    }
}

/// Parse an absolute URL, panicking on typos in test data.
pub fn url(uri: &str) -> Url {
    Url::parse(uri).unwrap_or_else(|e| panic!("bad test url {uri:?}: {e}"))
}

/// A variant with only a width and a URI.
pub fn variant(width: u32, uri: &str) -> AdaptiveMedia {
    AdaptiveMedia::builder(url(uri)).width(width).build()
}

// =========================================================================
// MockLibrary
// =========================================================================

/// In-memory file library and media finder.
///
/// Uses Mutex (not RefCell) so it is Sync, as both collaborator traits
/// require.
#[derive(Default)]
pub struct MockLibrary {
    files: HashMap<u64, Vec<AdaptiveMedia>>,
    /// When set, every id resolves and gets these variants.
    answer_all: Option<Vec<AdaptiveMedia>>,
    failing_finder: bool,
    queries: Mutex<Vec<MediaQuery>>,
}

impl MockLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve any file entry id and answer every query with `variants`.
    pub fn answering_all(variants: Vec<AdaptiveMedia>) -> Self {
        Self {
            answer_all: Some(variants),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, id: u64, variants: Vec<AdaptiveMedia>) -> Self {
        self.files.insert(id, variants);
        self
    }

    /// Make every finder call fail with [`LookupError::Unavailable`].
    pub fn failing_finder(mut self) -> Self {
        self.failing_finder = true;
        self
    }

    /// Queries received so far, in call order.
    pub fn queries(&self) -> Vec<MediaQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl FileEntryLookup for MockLibrary {
    fn file_version(&self, id: FileEntryId) -> Result<FileVersion, LookupError> {
        if self.answer_all.is_some() || self.files.contains_key(&id.0) {
            Ok(file_version(id.0))
        } else {
            Err(LookupError::NoSuchFileEntry(id))
        }
    }
}

impl AdaptiveMediaFinder for MockLibrary {
    fn adaptive_media<'a>(
        &'a self,
        query: &MediaQuery,
    ) -> Result<Box<dyn Iterator<Item = AdaptiveMedia> + 'a>, LookupError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.failing_finder {
            return Err(LookupError::Unavailable("mock finder offline".to_string()));
        }
        let variants = self
            .answer_all
            .as_ref()
            .or_else(|| self.files.get(&query.file_entry_id.0))
            .cloned()
            .unwrap_or_default();
        Ok(Box::new(variants.into_iter()))
    }
}
