//! Collaborator interfaces: file lookup and adaptive media finder.
//!
//! The transformer never talks to a document library or a media index
//! directly. It goes through two narrow traits:
//!
//! - [`FileEntryLookup`] resolves the id found in markup to a [`FileVersion`].
//! - [`AdaptiveMediaFinder`] lists the variants available for that version.
//!
//! Production hosts implement these over their own services; the crate ships
//! [`Catalog`](crate::catalog::Catalog), a JSON-backed implementation of both.
//! Both traits require `Sync` so a single transformer can be shared by the
//! rayon workers of [`build_site`](crate::site::build_site).

use crate::media::{AdaptiveMedia, FileEntryId, FileVersion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no file entry with id {0}")]
    NoSuchFileEntry(FileEntryId),
    #[error("file entry {0} has no version")]
    NoSuchFileVersion(FileEntryId),
    #[error("lookup service unavailable: {0}")]
    Unavailable(String),
}

/// Which resize configurations a query accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationStatus {
    /// Only variants whose configuration is currently enabled.
    #[default]
    Enabled,
    /// Only variants whose configuration has been disabled.
    Disabled,
    Any,
}

impl ConfigurationStatus {
    pub fn accepts(self, enabled: bool) -> bool {
        match self {
            ConfigurationStatus::Enabled => enabled,
            ConfigurationStatus::Disabled => !enabled,
            ConfigurationStatus::Any => true,
        }
    }
}

/// A request for the variants of one file version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaQuery {
    pub file_entry_id: FileEntryId,
    pub file_version_id: u64,
    pub status: ConfigurationStatus,
}

impl MediaQuery {
    pub fn for_version(version: &FileVersion) -> Self {
        Self {
            file_entry_id: version.file_entry_id,
            file_version_id: version.file_version_id,
            status: ConfigurationStatus::default(),
        }
    }

    pub fn with_status(mut self, status: ConfigurationStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether a variant of `version` whose configuration is `enabled`
    /// belongs in this query's result.
    pub fn matches(&self, version: &FileVersion, enabled: bool) -> bool {
        version.file_entry_id == self.file_entry_id
            && version.file_version_id == self.file_version_id
            && self.status.accepts(enabled)
    }
}

/// Resolves a file entry id to the version adaptive media is generated from.
pub trait FileEntryLookup: Sync {
    fn file_version(&self, id: FileEntryId) -> Result<FileVersion, LookupError>;
}

/// Lists the adaptive media variants matching a query.
///
/// The sequence is lazy; callers may stop early and must not assume any
/// particular order.
pub trait AdaptiveMediaFinder: Sync {
    fn adaptive_media<'a>(
        &'a self,
        query: &MediaQuery,
    ) -> Result<Box<dyn Iterator<Item = AdaptiveMedia> + 'a>, LookupError>;
}

impl<T: FileEntryLookup + ?Sized> FileEntryLookup for &T {
    fn file_version(&self, id: FileEntryId) -> Result<FileVersion, LookupError> {
        (**self).file_version(id)
    }
}

impl<T: AdaptiveMediaFinder + ?Sized> AdaptiveMediaFinder for &T {
    fn adaptive_media<'a>(
        &'a self,
        query: &MediaQuery,
    ) -> Result<Box<dyn Iterator<Item = AdaptiveMedia> + 'a>, LookupError> {
        (**self).adaptive_media(query)
    }
}
