//! JSON-backed catalog of files and their adaptive media.
//!
//! The catalog stands in for the host platform's document library and media
//! index: it implements both [`FileEntryLookup`] and [`AdaptiveMediaFinder`]
//! over a single JSON document, which is what the CLI reads.
//!
//! ## Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": [
//!     {
//!       "file_entry_id": 1989,
//!       "file_version_id": 2001,
//!       "version": "1.0",
//!       "file_name": "sunset.jpg",
//!       "mime_type": "image/jpeg",
//!       "variants": [
//!         { "uri": "https://cdn.example.com/sunset-800.jpg",
//!           "configuration_uuid": "small", "enabled": true,
//!           "width": 800, "height": 533, "content_length": 48211 }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Every field of a variant except `uri` is optional. `uri` must be an
//! absolute URL with a host-style path (`https://…`, `file:///…`); relative
//! paths and opaque schemes such as `javascript:` or `data:` are rejected. `enabled` defaults to
//! `true`. A variant without `width` is kept in the catalog but never turns
//! into a `<source>`.

use crate::finder::{AdaptiveMediaFinder, FileEntryLookup, LookupError, MediaQuery};
use crate::media::{AdaptiveMedia, AttributeValue, FileEntryId, FileVersion, MediaAttribute};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Version of the catalog format understood by this build.
pub const CATALOG_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported catalog version {found} (expected {})", CATALOG_VERSION)]
    Version { found: u32 },
    #[error("file entry {0} appears more than once")]
    DuplicateEntry(FileEntryId),
    #[error("file entry {id}: invalid variant uri {uri:?}: {reason}")]
    InvalidUri {
        id: FileEntryId,
        uri: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    version: u32,
    #[serde(default)]
    entries: Vec<CatalogEntry>,
}

/// One file entry with the variants generated for its current version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntry {
    pub file_entry_id: FileEntryId,
    pub file_version_id: u64,
    #[serde(default = "default_version_label")]
    pub version: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub variants: Vec<CatalogVariant>,
}

fn default_version_label() -> String {
    "1.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogVariant {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_uuid: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl CatalogVariant {
    fn to_media(&self, entry: &CatalogEntry, uri: &Url) -> AdaptiveMedia {
        let mut builder = AdaptiveMedia::builder(uri.clone()).attribute(
            MediaAttribute::FileName,
            AttributeValue::Text(entry.file_name.clone()),
        );
        if let Some(uuid) = &self.configuration_uuid {
            builder = builder.configuration_uuid(uuid.clone());
        }
        if let Some(w) = self.width {
            builder = builder.width(w);
        }
        if let Some(h) = self.height {
            builder = builder.height(h);
        }
        if let Some(len) = self.content_length {
            builder = builder.attribute(MediaAttribute::ContentLength, AttributeValue::Integer(len));
        }
        if let Some(ct) = &self.content_type {
            builder = builder.attribute(MediaAttribute::ContentType, AttributeValue::Text(ct.clone()));
        }
        builder.build()
    }
}

impl CatalogEntry {
    fn file_version(&self) -> FileVersion {
        FileVersion {
            file_entry_id: self.file_entry_id,
            file_version_id: self.file_version_id,
            version: self.version.clone(),
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
        }
    }
}

/// In-memory index over a catalog document.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    /// Parsed variant URLs, parallel to `entries[i].variants`.
    urls: Vec<Vec<Url>>,
    by_id: HashMap<FileEntryId, usize>,
}

impl Catalog {
    /// Read and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        if file.version != CATALOG_VERSION {
            return Err(CatalogError::Version {
                found: file.version,
            });
        }
        Self::from_entries(file.entries)
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(entries.len());
        let mut urls = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            let parsed = entry
                .variants
                .iter()
                .map(|v| {
                    parse_variant_uri(&v.uri).map_err(|reason| CatalogError::InvalidUri {
                        id: entry.file_entry_id,
                        uri: v.uri.clone(),
                        reason,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            urls.push(parsed);
            if by_id.insert(entry.file_entry_id, idx).is_some() {
                return Err(CatalogError::DuplicateEntry(entry.file_entry_id));
            }
        }
        Ok(Self {
            entries,
            urls,
            by_id,
        })
    }

    /// Serialize back to the on-disk format.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            version: CATALOG_VERSION,
            entries: self.entries.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, id: FileEntryId) -> Option<&CatalogEntry> {
        self.by_id.get(&id).map(|&idx| &self.entries[idx])
    }

    fn entry_with_urls(&self, id: FileEntryId) -> Option<(&CatalogEntry, &[Url])> {
        self.by_id
            .get(&id)
            .map(|&idx| (&self.entries[idx], self.urls[idx].as_slice()))
    }

    pub fn variant_count(&self) -> usize {
        self.entries.iter().map(|e| e.variants.len()).sum()
    }
}

/// Parse a variant URI. Relative references fail to parse; opaque URLs
/// (`javascript:`, `data:`, `mailto:`) parse but cannot serve an image.
fn parse_variant_uri(uri: &str) -> Result<Url, String> {
    let url = Url::parse(uri).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err(format!("{} URLs cannot serve images", url.scheme()));
    }
    Ok(url)
}

impl FileEntryLookup for Catalog {
    fn file_version(&self, id: FileEntryId) -> Result<FileVersion, LookupError> {
        self.entry(id)
            .map(CatalogEntry::file_version)
            .ok_or(LookupError::NoSuchFileEntry(id))
    }
}

impl AdaptiveMediaFinder for Catalog {
    fn adaptive_media<'a>(
        &'a self,
        query: &MediaQuery,
    ) -> Result<Box<dyn Iterator<Item = AdaptiveMedia> + 'a>, LookupError> {
        let Some((entry, urls)) = self.entry_with_urls(query.file_entry_id) else {
            return Ok(Box::new(std::iter::empty()));
        };
        let version = entry.file_version();
        let query = query.clone();
        Ok(Box::new(
            entry
                .variants
                .iter()
                .zip(urls)
                .filter(move |(v, _)| query.matches(&version, v.enabled))
                .map(move |(v, uri)| v.to_media(entry, uri)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::ConfigurationStatus;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
  "version": 1,
  "entries": [
    {
      "file_entry_id": 1989,
      "file_version_id": 2001,
      "version": "1.3",
      "file_name": "sunset.jpg",
      "mime_type": "image/jpeg",
      "variants": [
        { "uri": "https://cdn.example.com/sunset-1400.jpg", "configuration_uuid": "large", "width": 1400, "height": 933 },
        { "uri": "https://cdn.example.com/sunset-800.jpg", "configuration_uuid": "small", "width": 800, "height": 533, "content_length": 48211 },
        { "uri": "https://cdn.example.com/sunset-300.jpg", "configuration_uuid": "thumb", "enabled": false, "width": 300 }
      ]
    },
    { "file_entry_id": 7, "file_version_id": 8 }
  ]
}"#;

    fn uris(catalog: &Catalog, id: u64, status: ConfigurationStatus) -> Vec<String> {
        let version = catalog.file_version(FileEntryId(id)).unwrap();
        let query = MediaQuery::for_version(&version).with_status(status);
        catalog
            .adaptive_media(&query)
            .unwrap()
            .map(|m| m.uri().to_string())
            .collect()
    }

    #[test]
    fn parses_sample() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.entries().len(), 2);
        assert_eq!(catalog.variant_count(), 3);
    }

    #[test]
    fn lookup_returns_file_version() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let version = catalog.file_version(FileEntryId(1989)).unwrap();
        assert_eq!(version.file_version_id, 2001);
        assert_eq!(version.version, "1.3");
        assert_eq!(version.file_name, "sunset.jpg");
    }

    #[test]
    fn entry_defaults_applied() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let version = catalog.file_version(FileEntryId(7)).unwrap();
        assert_eq!(version.version, "1.0");
        assert!(uris(&catalog, 7, ConfigurationStatus::Any).is_empty());
    }

    #[test]
    fn lookup_missing_entry() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(
            catalog.file_version(FileEntryId(1)),
            Err(LookupError::NoSuchFileEntry(FileEntryId(1)))
        );
    }

    #[test]
    fn finder_filters_by_status_in_catalog_order() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(
            uris(&catalog, 1989, ConfigurationStatus::Enabled),
            vec![
                "https://cdn.example.com/sunset-1400.jpg",
                "https://cdn.example.com/sunset-800.jpg",
            ]
        );
        assert_eq!(
            uris(&catalog, 1989, ConfigurationStatus::Disabled),
            vec!["https://cdn.example.com/sunset-300.jpg"]
        );
        assert_eq!(uris(&catalog, 1989, ConfigurationStatus::Any).len(), 3);
    }

    #[test]
    fn finder_ignores_stale_version() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let mut version = catalog.file_version(FileEntryId(1989)).unwrap();
        version.file_version_id = 1;
        let query = MediaQuery::for_version(&version);
        assert_eq!(catalog.adaptive_media(&query).unwrap().count(), 0);
    }

    #[test]
    fn variant_attributes_mapped() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let version = catalog.file_version(FileEntryId(1989)).unwrap();
        let small = catalog
            .adaptive_media(&MediaQuery::for_version(&version))
            .unwrap()
            .find(|m| m.configuration_uuid() == Some("small"))
            .unwrap();
        assert_eq!(small.width(), Some(800));
        assert_eq!(small.height(), Some(533));
        assert_eq!(
            small.attribute(MediaAttribute::ContentLength),
            Some(&AttributeValue::Integer(48211))
        );
        assert_eq!(
            small.attribute(MediaAttribute::FileName),
            Some(&AttributeValue::Text("sunset.jpg".into()))
        );
    }

    #[test]
    fn rejects_unknown_version() {
        let err = Catalog::from_json(r#"{"version": 2, "entries": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Version { found: 2 }));
    }

    #[test]
    fn rejects_duplicate_entries() {
        let json = r#"{"version": 1, "entries": [
            {"file_entry_id": 1, "file_version_id": 1},
            {"file_entry_id": 1, "file_version_id": 2}
        ]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateEntry(FileEntryId(1)))
        ));
    }

    fn catalog_with_uri(uri: &str) -> Result<Catalog, CatalogError> {
        let json = format!(
            r#"{{"version": 1, "entries": [
                {{"file_entry_id": 1, "file_version_id": 1, "variants": [{{"uri": {uri:?}, "width": 10}}]}}
            ]}}"#
        );
        Catalog::from_json(&json)
    }

    #[test]
    fn rejects_uri_with_space_in_host() {
        assert!(matches!(
            catalog_with_uri("http://bad host/x.jpg"),
            Err(CatalogError::InvalidUri { .. })
        ));
    }

    #[test]
    fn rejects_relative_uri() {
        for uri in ["relative/x.jpg", "/documents/x.jpg", "has space.jpg", ""] {
            match catalog_with_uri(uri) {
                Err(CatalogError::InvalidUri { id, uri: bad, .. }) => {
                    assert_eq!(id, FileEntryId(1));
                    assert_eq!(bad, uri);
                }
                other => panic!("{uri:?} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_opaque_uri() {
        for uri in ["javascript:alert(1)", "data:image/png;base64,AAAA", "mailto:a@b.c"] {
            assert!(
                matches!(catalog_with_uri(uri), Err(CatalogError::InvalidUri { .. })),
                "{uri:?} accepted"
            );
        }
    }

    #[test]
    fn accepts_absolute_uri_and_serves_it_verbatim() {
        let catalog = catalog_with_uri("https://cdn.example.com/a/b-800.jpg?v=2").unwrap();
        assert_eq!(
            uris(&catalog, 1, ConfigurationStatus::Any),
            vec!["https://cdn.example.com/a/b-800.jpg?v=2"]
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let json = r#"{"version": 1, "entries": [{"file_entry_id": 1, "file_version_id": 1, "widht": 3}]}"#;
        assert!(matches!(Catalog::from_json(json), Err(CatalogError::Json(_))));
    }

    #[test]
    fn load_and_save_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let catalog = Catalog::load(&path).unwrap();
        let reparsed = Catalog::from_json(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(reparsed.entries(), catalog.entries());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            Catalog::load(&tmp.path().join("nope.json")),
            Err(CatalogError::Io(_))
        ));
    }
}
