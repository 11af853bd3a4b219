//! Baseline TIFF tag metadata.
//!
//! Every TIFF-based slide exposes the descriptive tags of its first IFD as
//! `tiff.*` properties. For generic pyramidal TIFF files the resolution tags
//! are also the only source of microns-per-pixel.
//!
//! Tags with an unexpected type or an unreadable value are skipped; a tag
//! whose value lies outside the file is a truncated container and fails.

use tracing::debug;

use crate::error::TiffError;
use crate::io::RangeReader;
use crate::slide::{SlideProperties, PROPERTY_MPP_X, PROPERTY_MPP_Y};

use super::tiff::{Ifd, ResolutionUnit, TiffHeader, TiffTag, ValueReader};

/// Property prefix for baseline TIFF tags.
const TIFF_PREFIX: &str = "tiff.";

/// ASCII tags surfaced as properties, in tag order.
const ASCII_TAGS: [TiffTag; 9] = [
    TiffTag::DocumentName,
    TiffTag::ImageDescription,
    TiffTag::Make,
    TiffTag::Model,
    TiffTag::Software,
    TiffTag::DateTime,
    TiffTag::Artist,
    TiffTag::HostComputer,
    TiffTag::Copyright,
];

/// Microns per centimeter.
const MICRONS_PER_CM: f64 = 10_000.0;

// =============================================================================
// TiffTagMetadata
// =============================================================================

/// Descriptive and resolution tags read from one IFD.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TiffTagMetadata {
    /// ASCII tag values, in `ASCII_TAGS` order
    pub strings: Vec<(TiffTag, String)>,

    /// Pixels per unit in X
    pub x_resolution: Option<f64>,

    /// Pixels per unit in Y
    pub y_resolution: Option<f64>,

    /// Unit of the resolution tags
    pub resolution_unit: Option<ResolutionUnit>,
}

impl TiffTagMetadata {
    /// Read the metadata tags present in `ifd`.
    pub async fn read<R: RangeReader>(
        reader: &R,
        header: &TiffHeader,
        ifd: &Ifd,
    ) -> Result<Self, TiffError> {
        let values = ValueReader::new(reader, header);
        let mut metadata = TiffTagMetadata::default();

        for tag in ASCII_TAGS {
            let Some(entry) = ifd.get_entry_by_tag(tag) else {
                continue;
            };
            if let Some(value) = skip_invalid(tag, values.read_string(tag, entry).await)? {
                metadata.strings.push((tag, value));
            }
        }

        if let Some(entry) = ifd.get_entry_by_tag(TiffTag::XResolution) {
            let value = values.read_rational(TiffTag::XResolution, entry).await;
            metadata.x_resolution = skip_invalid(TiffTag::XResolution, value)?;
        }

        if let Some(entry) = ifd.get_entry_by_tag(TiffTag::YResolution) {
            let value = values.read_rational(TiffTag::YResolution, entry).await;
            metadata.y_resolution = skip_invalid(TiffTag::YResolution, value)?;
        }

        if let Some(entry) = ifd.get_entry_by_tag(TiffTag::ResolutionUnit) {
            let value = values.read_u32(TiffTag::ResolutionUnit, entry).await;
            let raw = skip_invalid(TiffTag::ResolutionUnit, value)?;
            metadata.resolution_unit = raw
                .and_then(|v| u16::try_from(v).ok())
                .and_then(ResolutionUnit::from_u16);
        }

        Ok(metadata)
    }

    /// Value of an ASCII tag, if it was read.
    pub fn string(&self, tag: TiffTag) -> Option<&str> {
        self.strings
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Microns per pixel in X and Y.
    ///
    /// Only derived when the unit is centimeter and both resolutions are
    /// positive.
    pub fn mpp(&self) -> Option<(f64, f64)> {
        if self.resolution_unit != Some(ResolutionUnit::Centimeter) {
            return None;
        }

        let x = self.x_resolution.filter(|&r| r > 0.0)?;
        let y = self.y_resolution.filter(|&r| r > 0.0)?;
        Some((MICRONS_PER_CM / x, MICRONS_PER_CM / y))
    }

    /// Add the `tiff.*` properties.
    pub fn apply_to(&self, properties: &mut SlideProperties) {
        for (tag, value) in &self.strings {
            properties.insert(tiff_key(*tag), value.clone());
        }

        if let Some(x) = self.x_resolution {
            properties.insert(tiff_key(TiffTag::XResolution), x.to_string());
        }
        if let Some(y) = self.y_resolution {
            properties.insert(tiff_key(TiffTag::YResolution), y.to_string());
        }
        if let Some(unit) = self.resolution_unit {
            properties.insert(tiff_key(TiffTag::ResolutionUnit), unit.name());
        }
    }

    /// Add `openslide.mpp-x/-y` derived from the resolution tags.
    ///
    /// Existing values are left alone so vendor metadata takes precedence.
    pub fn apply_mpp_to(&self, properties: &mut SlideProperties) {
        let Some((mpp_x, mpp_y)) = self.mpp() else {
            return;
        };

        if !properties.contains(PROPERTY_MPP_X) {
            properties.insert(PROPERTY_MPP_X, mpp_x.to_string());
        }
        if !properties.contains(PROPERTY_MPP_Y) {
            properties.insert(PROPERTY_MPP_Y, mpp_y.to_string());
        }
    }
}

fn tiff_key(tag: TiffTag) -> String {
    format!("{}{}", TIFF_PREFIX, tag.name())
}

/// Turn tag-level decoding failures into a skipped tag.
///
/// I/O failures still propagate.
fn skip_invalid<T>(tag: TiffTag, result: Result<T, TiffError>) -> Result<Option<T>, TiffError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(TiffError::Io(e)) => Err(TiffError::Io(e)),
        Err(e) => {
            debug!(tag = tag.name(), error = %e, "Skipping unreadable tag");
            Ok(None)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
