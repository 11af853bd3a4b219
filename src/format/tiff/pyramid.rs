//! TIFF pyramid level identification.
//!
//! WSI files contain multiple IFDs (Image File Directories), but not all are
//! pyramid levels. This module walks the directory chain, identifies which
//! IFDs belong to the image pyramid and orders them finest first.
//!
//! # Pyramid Structure
//!
//! A typical WSI file contains:
//! - **Pyramid levels**: Full resolution image and progressively smaller versions
//! - **Label image**: Small image of the slide label
//! - **Macro image**: Overview of the entire glass slide
//! - **Thumbnail**: Small stripped preview
//!
//! # Identification Rules
//!
//! 1. The IFD must be tiled (TileWidth, TileLength, TileOffsets, TileByteCounts)
//!    and carry non-zero image dimensions
//! 2. The largest tiled image is level 0, downsample exactly 1.0
//! 3. Every other candidate must shrink both axes by the same factor
//!    (within 10%) and be strictly coarser than the previous level
//!
//! Label and macro images have a different aspect ratio than the scan
//! area and fail rule 3.

use std::collections::HashSet;

use tracing::debug;

use crate::error::TiffError;
use crate::io::RangeReader;

use super::parser::{ByteOrder, Ifd, TiffHeader, BIGTIFF_HEADER_SIZE, MAX_IFD_ENTRIES};

// =============================================================================
// Constants
// =============================================================================

/// Maximum number of IFDs to parse
pub const MAX_IFDS: usize = 100;

/// Maximum relative disagreement between the X and Y downsample of a level
const AXIS_RATIO_TOLERANCE: f64 = 0.1;

// =============================================================================
// PyramidLevel
// =============================================================================

/// A single level in the image pyramid.
///
/// Level 0 is the highest resolution (full size), with higher levels being
/// progressively smaller.
#[derive(Debug, Clone)]
pub struct PyramidLevel {
    /// Index of this level in the pyramid (0 = highest resolution)
    pub level_index: usize,

    /// Index of the IFD in the file's IFD chain
    pub ifd_index: usize,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Tile width in pixels
    pub tile_width: u32,

    /// Tile height in pixels
    pub tile_height: u32,

    /// Number of tiles in X direction
    pub tiles_x: u32,

    /// Number of tiles in Y direction
    pub tiles_y: u32,

    /// Downsample factor relative to level 0 (1.0 for level 0)
    pub downsample: f64,
}

impl PyramidLevel {
    /// Create a PyramidLevel from a parsed IFD.
    ///
    /// Returns None if the IFD is not tiled or has zero-sized dimensions.
    fn from_ifd(ifd: &Ifd, ifd_index: usize, byte_order: ByteOrder) -> Option<Self> {
        if !ifd.is_tiled() {
            return None;
        }

        let tile_width = ifd.tile_width(byte_order).filter(|&v| v > 0)?;
        let tile_height = ifd.tile_height(byte_order).filter(|&v| v > 0)?;
        let width = ifd.image_width(byte_order).filter(|&v| v > 0)?;
        let height = ifd.image_height(byte_order).filter(|&v| v > 0)?;

        Some(PyramidLevel {
            level_index: 0,
            ifd_index,
            width,
            height,
            tile_width,
            tile_height,
            tiles_x: width.div_ceil(tile_width),
            tiles_y: height.div_ceil(tile_height),
            downsample: 1.0,
        })
    }

    /// Pixel area, used to order candidates.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

// =============================================================================
// TiffPyramid
// =============================================================================

/// A parsed TIFF image pyramid.
#[derive(Debug, Clone)]
pub struct TiffPyramid {
    /// The TIFF header
    pub header: TiffHeader,

    /// Pyramid levels, sorted by resolution (0 = highest)
    pub levels: Vec<PyramidLevel>,

    /// The first IFD in the file; vendor metadata lives here
    pub first_ifd: Ifd,

    /// Number of IFDs walked
    pub ifd_count: usize,
}

impl TiffPyramid {
    /// Parse a TIFF file and identify pyramid levels.
    ///
    /// Reads the header, walks the whole IFD chain and keeps the IFDs that
    /// form a consistent pyramid.
    pub async fn parse<R: RangeReader>(reader: &R) -> Result<Self, TiffError> {
        let header = read_header(reader).await?;
        let ifds = Self::parse_all_ifds(reader, &header).await?;
        Ok(Self::build_pyramid(header, ifds))
    }

    /// Parse all IFDs in the file following the next-IFD chain.
    ///
    /// Stops at a zero offset, at an offset already visited, or after
    /// `MAX_IFDS` directories.
    async fn parse_all_ifds<R: RangeReader>(
        reader: &R,
        header: &TiffHeader,
    ) -> Result<Vec<Ifd>, TiffError> {
        let mut ifds = Vec::new();
        let mut visited = HashSet::new();
        let mut offset = header.first_ifd_offset;

        while offset != 0 && ifds.len() < MAX_IFDS {
            if !visited.insert(offset) {
                debug!(offset, "IFD chain loops back, stopping");
                break;
            }

            let ifd = read_ifd(reader, header, offset).await?;
            debug!(
                index = ifds.len(),
                offset,
                entries = ifd.entries.len(),
                "Parsed IFD"
            );

            offset = ifd.next_ifd_offset;
            ifds.push(ifd);
        }

        Ok(ifds)
    }

    /// Build the pyramid structure from parsed IFDs.
    fn build_pyramid(header: TiffHeader, ifds: Vec<Ifd>) -> Self {
        let byte_order = header.byte_order;

        let mut candidates: Vec<PyramidLevel> = ifds
            .iter()
            .enumerate()
            .filter_map(|(ifd_index, ifd)| PyramidLevel::from_ifd(ifd, ifd_index, byte_order))
            .collect();

        // Largest first; stable so equal areas keep file order
        candidates.sort_by_key(|level| std::cmp::Reverse(level.area()));

        let levels = Self::filter_pyramid_levels(candidates);
        let ifd_count = ifds.len();
        let first_ifd = ifds.into_iter().next().unwrap_or_default();

        TiffPyramid {
            header,
            levels,
            first_ifd,
            ifd_count,
        }
    }

    /// Keep only candidates that form a consistent pyramid.
    fn filter_pyramid_levels(candidates: Vec<PyramidLevel>) -> Vec<PyramidLevel> {
        let mut iter = candidates.into_iter();
        let Some(mut base) = iter.next() else {
            return Vec::new();
        };

        base.level_index = 0;
        base.downsample = 1.0;
        let base_width = base.width as f64;
        let base_height = base.height as f64;
        let mut levels = vec![base];

        for mut level in iter {
            let downsample_x = base_width / level.width as f64;
            let downsample_y = base_height / level.height as f64;
            let previous = levels.last().map(|l| l.downsample).unwrap_or(1.0);

            if !Self::axes_agree(downsample_x, downsample_y) {
                debug!(
                    ifd_index = level.ifd_index,
                    width = level.width,
                    height = level.height,
                    "Skipping IFD with mismatched aspect ratio"
                );
                continue;
            }

            let downsample = (downsample_x + downsample_y) / 2.0;
            if downsample <= previous {
                debug!(
                    ifd_index = level.ifd_index,
                    downsample, "Skipping IFD not coarser than previous level"
                );
                continue;
            }

            level.level_index = levels.len();
            level.downsample = downsample;
            levels.push(level);
        }

        levels
    }

    /// Check that the X and Y downsample describe the same scaling.
    fn axes_agree(downsample_x: f64, downsample_y: f64) -> bool {
        let larger = downsample_x.max(downsample_y);
        (downsample_x - downsample_y).abs() <= larger * AXIS_RATIO_TOLERANCE
    }

    /// Get the number of pyramid levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Get a pyramid level by index.
    pub fn get_level(&self, level: usize) -> Option<&PyramidLevel> {
        self.levels.get(level)
    }

    /// Get the base (highest resolution) level.
    pub fn base_level(&self) -> Option<&PyramidLevel> {
        self.levels.first()
    }

    /// Get dimensions of the base level.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.base_level().map(|l| (l.width, l.height))
    }
}

// =============================================================================
// Header and IFD reads
// =============================================================================

/// Read and parse the file header.
///
/// Reads up to 16 bytes so that both classic TIFF and BigTIFF headers are
/// covered, without failing on files shorter than a BigTIFF header.
pub async fn read_header<R: RangeReader>(reader: &R) -> Result<TiffHeader, TiffError> {
    let len = reader.size().min(BIGTIFF_HEADER_SIZE as u64) as usize;
    let header_bytes = reader.read_exact_at(0, len).await?;
    TiffHeader::parse(&header_bytes, reader.size())
}

/// Read one IFD at `offset`: entry count first, then the full directory.
pub async fn read_ifd<R: RangeReader>(
    reader: &R,
    header: &TiffHeader,
    offset: u64,
) -> Result<Ifd, TiffError> {
    if offset >= reader.size() {
        return Err(TiffError::InvalidIfdOffset(offset));
    }

    let count_bytes = reader.read_exact_at(offset, header.ifd_count_size()).await?;
    let entry_count = header.read_entry_count(&count_bytes);
    if entry_count > MAX_IFD_ENTRIES {
        return Err(TiffError::InvalidTagValue {
            tag: "IFD",
            message: format!("entry count {} at offset {}", entry_count, offset),
        });
    }

    let ifd_size = Ifd::calculate_size(entry_count, header);
    let ifd_bytes = reader.read_exact_at(offset, ifd_size).await?;
    Ifd::parse(&ifd_bytes, header)
}

// =============================================================================
// Tests
// =============================================================================
