//! TIFF-backed slide implementation.
//!
//! Opening a slide reads the header, walks every IFD, identifies pyramid
//! levels and builds the property map. The file stays open, behind a block
//! cache, for as long as the [`TiffSlide`] lives.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::FormatError;
use crate::format::tiff::{PyramidLevel, TiffPyramid, TiffTag};
use crate::format::{detect_format, SlideFormat, SvsMetadata, TiffTagMetadata};
use crate::io::{
    BlockCache, LocalFileReader, RangeReader, DEFAULT_BLOCK_CACHE_CAPACITY, DEFAULT_BLOCK_SIZE,
};

use super::backend::{SlideBackend, SlideHandle};
use super::properties::{
    level_key, SlideProperties, PROPERTY_COMMENT, PROPERTY_LEVEL_COUNT, PROPERTY_VENDOR,
};

// =============================================================================
// TiffBackend
// =============================================================================

/// Slide backend for Aperio SVS and generic pyramidal TIFF files on the
/// local filesystem.
#[derive(Debug, Clone, Copy)]
pub struct TiffBackend {
    block_size: usize,
    block_cache_capacity: usize,
}

impl Default for TiffBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffBackend {
    /// Create a backend with the default block cache settings.
    pub fn new() -> Self {
        Self::with_block_cache(DEFAULT_BLOCK_SIZE, DEFAULT_BLOCK_CACHE_CAPACITY)
    }

    /// Create a backend with a custom block size and cache capacity.
    pub fn with_block_cache(block_size: usize, block_cache_capacity: usize) -> Self {
        Self {
            block_size,
            block_cache_capacity,
        }
    }
}

#[async_trait]
impl SlideBackend for TiffBackend {
    type Handle = TiffSlide;

    async fn detect_format(&self, path: &Path) -> Result<Option<SlideFormat>, FormatError> {
        let reader = LocalFileReader::open(path).await?;
        detect_format(&reader).await
    }

    async fn open(&self, path: &Path) -> Result<TiffSlide, FormatError> {
        let file = LocalFileReader::open(path).await?;
        let reader = BlockCache::with_capacity(file, self.block_size, self.block_cache_capacity);
        TiffSlide::open(reader).await
    }
}

// =============================================================================
// TiffSlide
// =============================================================================

/// An opened TIFF-based slide.
pub struct TiffSlide {
    /// Open file; closed when the slide is dropped
    reader: BlockCache<LocalFileReader>,

    /// Detected container format
    format: SlideFormat,

    /// Pyramid levels, finest first
    levels: Vec<PyramidLevel>,

    /// Slide metadata
    properties: SlideProperties,
}

impl TiffSlide {
    /// Parse an already opened file.
    ///
    /// # Errors
    /// - `UnsupportedFormat` when the file is not TIFF or has no tiled levels
    /// - `Tiff` / `Io` when the structure is broken or truncated
    pub async fn open(reader: BlockCache<LocalFileReader>) -> Result<Self, FormatError> {
        let format = detect_format(&reader)
            .await?
            .ok_or_else(|| FormatError::UnsupportedFormat {
                reason: format!("{} is not a TIFF file", reader.identifier()),
            })?;

        let pyramid = TiffPyramid::parse(&reader).await?;
        debug!(
            ifds = pyramid.ifd_count,
            levels = pyramid.level_count(),
            bigtiff = pyramid.header.is_bigtiff,
            "Parsed TIFF structure"
        );

        if pyramid.levels.is_empty() {
            return Err(FormatError::UnsupportedFormat {
                reason: format!("{} has no tiled pyramid levels", reader.identifier()),
            });
        }

        let tags = TiffTagMetadata::read(&reader, &pyramid.header, &pyramid.first_ifd).await?;
        let properties = build_properties(format, &tags, &pyramid.levels);

        let (width, height) = pyramid.dimensions().unwrap_or_default();
        info!(
            path = reader.identifier(),
            format = format.name(),
            width,
            height,
            levels = pyramid.level_count(),
            properties = properties.iter().count(),
            "Opened slide"
        );
        debug!(
            block_hits = reader.hits(),
            block_misses = reader.misses(),
            "Block cache after open"
        );

        Ok(TiffSlide {
            reader,
            format,
            levels: pyramid.levels,
            properties,
        })
    }

    /// Detected container format.
    pub fn format(&self) -> SlideFormat {
        self.format
    }

    /// Path the slide was opened from.
    pub fn path(&self) -> &str {
        self.reader.identifier()
    }

    /// Pyramid levels, finest first.
    pub fn levels(&self) -> &[PyramidLevel] {
        &self.levels
    }
}

impl Drop for TiffSlide {
    fn drop(&mut self) {
        debug!(path = self.reader.identifier(), "Closing slide");
    }
}

impl SlideHandle for TiffSlide {
    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn level_dimensions(&self) -> Vec<(u32, u32)> {
        self.levels.iter().map(|l| (l.width, l.height)).collect()
    }

    fn level_downsamples(&self) -> Vec<f64> {
        self.levels.iter().map(|l| l.downsample).collect()
    }

    fn properties(&self) -> &SlideProperties {
        &self.properties
    }
}

// =============================================================================
// Property Construction
// =============================================================================

/// Assemble the property map for a slide.
///
/// Vendor values are applied before values derived from baseline tags so
/// they take precedence.
fn build_properties(
    format: SlideFormat,
    tags: &TiffTagMetadata,
    levels: &[PyramidLevel],
) -> SlideProperties {
    let mut properties = SlideProperties::new();
    properties.insert(PROPERTY_VENDOR, format.vendor());

    tags.apply_to(&mut properties);

    if let Some(description) = tags.string(TiffTag::ImageDescription) {
        properties.insert(PROPERTY_COMMENT, description);

        if format == SlideFormat::Aperio {
            SvsMetadata::parse(description).apply_to(&mut properties);
        }
    }

    if format == SlideFormat::GenericTiff {
        tags.apply_mpp_to(&mut properties);
    }

    properties.insert(PROPERTY_LEVEL_COUNT, levels.len().to_string());
    for (index, level) in levels.iter().enumerate() {
        properties.insert(level_key(index, "width"), level.width.to_string());
        properties.insert(level_key(index, "height"), level.height.to_string());
        properties.insert(level_key(index, "downsample"), level.downsample.to_string());
        properties.insert(level_key(index, "tile-width"), level.tile_width.to_string());
        properties.insert(level_key(index, "tile-height"), level.tile_height.to_string());
    }

    properties
}

// =============================================================================
// Tests
// =============================================================================
