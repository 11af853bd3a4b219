//! Format detection for Whole Slide Image files.
//!
//! Detection examines magic bytes and vendor-specific markers. Currently
//! recognised:
//!
//! - **Aperio SVS**: TIFF-based format identified by "Aperio" string in ImageDescription
//! - **Generic Pyramidal TIFF**: Any other TIFF or BigTIFF file
//!
//! Files that are not TIFF at all are reported as undetected rather than as
//! an error, so callers can print an "unknown" format.

use tracing::debug;

use crate::error::FormatError;
use crate::io::RangeReader;

use super::tiff::{
    read_ifd, ByteOrder, Ifd, TiffHeader, TiffTag, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE,
};

// =============================================================================
// SlideFormat
// =============================================================================

/// Detected slide format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideFormat {
    /// Aperio SVS format (TIFF with Aperio metadata in ImageDescription)
    Aperio,

    /// Generic pyramidal TIFF (standard tiled TIFF with multiple resolutions)
    GenericTiff,
}

impl SlideFormat {
    /// Vendor identifier, as printed by the inspector and stored in
    /// `openslide.vendor`.
    pub const fn vendor(&self) -> &'static str {
        match self {
            SlideFormat::Aperio => "aperio",
            SlideFormat::GenericTiff => "generic-tiff",
        }
    }

    /// Get a human-readable name for the format.
    pub const fn name(&self) -> &'static str {
        match self {
            SlideFormat::Aperio => "Aperio SVS",
            SlideFormat::GenericTiff => "Generic Pyramidal TIFF",
        }
    }
}

// =============================================================================
// Format Detection
// =============================================================================

/// Maximum bytes to read from ImageDescription for format detection.
/// Only enough to find markers, not the whole description.
const MAX_DESCRIPTION_BYTES: usize = 1024;

/// Marker string for Aperio SVS format.
const APERIO_MARKER: &[u8] = b"Aperio";

/// Detect the format of a slide file.
///
/// # Returns
/// * `Ok(Some(format))` - The detected format
/// * `Ok(None)` - The file is not a TIFF or BigTIFF file
/// * `Err(FormatError)` - The file looks like TIFF but its structure is broken,
///   or it could not be read
///
/// # Format Detection Logic
///
/// 1. Read initial bytes and verify TIFF/BigTIFF magic
/// 2. Parse the first IFD to access ImageDescription tag
/// 3. If ImageDescription contains "Aperio", classify as SVS
/// 4. Otherwise, classify as generic pyramidal TIFF
pub async fn detect_format<R: RangeReader>(
    reader: &R,
) -> Result<Option<SlideFormat>, FormatError> {
    let size = reader.size();
    if size < TIFF_HEADER_SIZE as u64 {
        debug!(size, "File too small for a TIFF header");
        return Ok(None);
    }

    let read_len = size.min(BIGTIFF_HEADER_SIZE as u64) as usize;
    let header_bytes = reader.read_exact_at(0, read_len).await?;
    if !is_tiff_header(&header_bytes) {
        return Ok(None);
    }

    let header = TiffHeader::parse(&header_bytes, size)?;
    let ifd = read_ifd(reader, &header, header.first_ifd_offset).await?;

    let format = match read_image_description(reader, &ifd, &header).await? {
        Some(description) if contains_aperio_marker(&description) => SlideFormat::Aperio,
        _ => SlideFormat::GenericTiff,
    };

    Ok(Some(format))
}

/// Read the beginning of the ImageDescription tag value from an IFD.
///
/// Returns None if the tag is not present.
async fn read_image_description<R: RangeReader>(
    reader: &R,
    ifd: &Ifd,
    header: &TiffHeader,
) -> Result<Option<Vec<u8>>, FormatError> {
    let entry = match ifd.get_entry_by_tag(TiffTag::ImageDescription) {
        Some(e) => e,
        None => return Ok(None),
    };

    let read_len = entry.count.min(MAX_DESCRIPTION_BYTES as u64) as usize;
    if read_len == 0 {
        return Ok(None);
    }

    let bytes = if entry.is_inline {
        entry.value_offset_bytes[..read_len.min(entry.value_offset_bytes.len())].to_vec()
    } else {
        let offset = entry.value_offset(header.byte_order);
        reader.read_exact_at(offset, read_len).await?.to_vec()
    };

    Ok(Some(bytes))
}

/// Check if bytes contain the Aperio marker.
fn contains_aperio_marker(data: &[u8]) -> bool {
    // Simple substring search
    data.windows(APERIO_MARKER.len())
        .any(|window| window == APERIO_MARKER)
}

/// Check if bytes start with TIFF or BigTIFF magic and version.
pub fn is_tiff_header(bytes: &[u8]) -> bool {
    if bytes.len() < TIFF_HEADER_SIZE {
        return false;
    }

    // Check magic bytes
    let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
    if magic != 0x4949 && magic != 0x4D4D {
        return false;
    }

    // Check version
    let byte_order = if magic == 0x4949 {
        ByteOrder::LittleEndian
    } else {
        ByteOrder::BigEndian
    };

    let version = byte_order.read_u16(&bytes[2..4]);
    version == 42 || version == 43
}

// =============================================================================
// Tests
// =============================================================================
