//! Adaptive media records and the file references that lead to them.
//!
//! An [`AdaptiveMedia`] is one pre-generated variant of an original image:
//! an absolute [`Url`] the browser can fetch plus a bag of typed attributes
//! describing it.
//! Variants are produced by the host's media pipeline and are only ever read
//! here, so every type in this module is immutable once built.
//!
//! ## Attributes
//!
//! | Name | Type | Meaning |
//! |---|---|---|
//! | `configuration-uuid` | text | Resize configuration that produced the variant |
//! | `content-length` | integer | Encoded size in bytes |
//! | `content-type` | text | MIME type of the variant |
//! | `file-name` | text | Download file name |
//! | `image-width` | integer | Pixel width, drives the media queries |
//! | `image-height` | integer | Pixel height |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Identifier of a document-library file entry, as written in markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileEntryId(pub u64);

impl FromStr for FileEntryId {
    type Err = std::num::ParseIntError;

    /// Parse the decimal digits of a `data-fileEntryId` value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(FileEntryId)
    }
}

impl fmt::Display for FileEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The version of a file entry that adaptive media is generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersion {
    pub file_entry_id: FileEntryId,
    pub file_version_id: u64,
    /// Human version label, e.g. `"1.0"`.
    pub version: String,
    pub file_name: String,
    pub mime_type: String,
}

/// Kind of processor that generated a variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaProcessor {
    #[default]
    Image,
}

/// Known attribute names carried by a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MediaAttribute {
    ConfigurationUuid,
    ContentLength,
    ContentType,
    FileName,
    ImageWidth,
    ImageHeight,
}

impl MediaAttribute {
    pub const ALL: [MediaAttribute; 6] = [
        MediaAttribute::ConfigurationUuid,
        MediaAttribute::ContentLength,
        MediaAttribute::ContentType,
        MediaAttribute::FileName,
        MediaAttribute::ImageWidth,
        MediaAttribute::ImageHeight,
    ];

    /// Wire name of the attribute.
    pub fn name(self) -> &'static str {
        match self {
            MediaAttribute::ConfigurationUuid => "configuration-uuid",
            MediaAttribute::ContentLength => "content-length",
            MediaAttribute::ContentType => "content-type",
            MediaAttribute::FileName => "file-name",
            MediaAttribute::ImageWidth => "image-width",
            MediaAttribute::ImageHeight => "image-height",
        }
    }

    /// Look up an attribute by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

impl fmt::Display for MediaAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed value of a [`MediaAttribute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Integer(u64),
    Text(String),
}

impl AttributeValue {
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            AttributeValue::Integer(n) => Some(*n),
            AttributeValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Integer(_) => None,
        }
    }
}

/// One pre-generated variant of an original image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveMedia {
    processor: MediaProcessor,
    attributes: BTreeMap<MediaAttribute, AttributeValue>,
    uri: Url,
}

impl AdaptiveMedia {
    /// Start building a variant served from `uri`.
    pub fn builder(uri: Url) -> AdaptiveMediaBuilder {
        AdaptiveMediaBuilder {
            media: AdaptiveMedia {
                processor: MediaProcessor::Image,
                attributes: BTreeMap::new(),
                uri,
            },
        }
    }

    pub fn processor(&self) -> MediaProcessor {
        self.processor
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn attribute(&self, attribute: MediaAttribute) -> Option<&AttributeValue> {
        self.attributes.get(&attribute)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (MediaAttribute, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (*k, v))
    }

    /// Pixel width, if the variant carries a usable one.
    ///
    /// Widths that do not fit in `u32` are treated as absent.
    pub fn width(&self) -> Option<u32> {
        self.dimension(MediaAttribute::ImageWidth)
    }

    pub fn height(&self) -> Option<u32> {
        self.dimension(MediaAttribute::ImageHeight)
    }

    pub fn configuration_uuid(&self) -> Option<&str> {
        self.attribute(MediaAttribute::ConfigurationUuid)
            .and_then(AttributeValue::as_text)
    }

    fn dimension(&self, attribute: MediaAttribute) -> Option<u32> {
        self.attribute(attribute)
            .and_then(AttributeValue::as_integer)
            .and_then(|n| u32::try_from(n).ok())
    }
}

/// Builder returned by [`AdaptiveMedia::builder`].
#[derive(Debug, Clone)]
pub struct AdaptiveMediaBuilder {
    media: AdaptiveMedia,
}

impl AdaptiveMediaBuilder {
    pub fn processor(mut self, processor: MediaProcessor) -> Self {
        self.media.processor = processor;
        self
    }

    pub fn attribute(mut self, attribute: MediaAttribute, value: AttributeValue) -> Self {
        self.media.attributes.insert(attribute, value);
        self
    }

    pub fn width(self, width: u32) -> Self {
        self.attribute(
            MediaAttribute::ImageWidth,
            AttributeValue::Integer(width.into()),
        )
    }

    pub fn height(self, height: u32) -> Self {
        self.attribute(
            MediaAttribute::ImageHeight,
            AttributeValue::Integer(height.into()),
        )
    }

    pub fn configuration_uuid(self, uuid: impl Into<String>) -> Self {
        self.attribute(
            MediaAttribute::ConfigurationUuid,
            AttributeValue::Text(uuid.into()),
        )
    }

    pub fn build(self) -> AdaptiveMedia {
        self.media
    }
}
