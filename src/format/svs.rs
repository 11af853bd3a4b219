//! Aperio SVS metadata.
//!
//! SVS files are TIFF files whose first ImageDescription carries vendor
//! metadata:
//!
//! ```text
//! Aperio Image Library v12.0.15
//! 46920x33600 [0,100 46000x32914] (256x256) JPEG/RGB Q=70|AppMag = 20|MPP = 0.4990|...
//! ```
//!
//! The first segment identifies the library and summarises the scan; every
//! later `|`-separated segment is a `key = value` pair.

use std::collections::BTreeMap;

use crate::slide::{SlideProperties, PROPERTY_MPP_X, PROPERTY_MPP_Y, PROPERTY_OBJECTIVE_POWER};

/// Property prefix for Aperio key/value pairs.
const APERIO_PREFIX: &str = "aperio.";

/// Separator between a key and its value.
const PAIR_SEPARATOR: &str = " = ";

/// Apparent magnification key.
const KEY_APP_MAG: &str = "AppMag";

/// Microns per pixel key.
const KEY_MPP: &str = "MPP";

// =============================================================================
// SVS Metadata
// =============================================================================

/// Parsed metadata from an SVS ImageDescription.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvsMetadata {
    /// Microns per pixel (resolution)
    pub mpp: Option<f64>,

    /// Objective magnification (e.g., 20, 40)
    pub magnification: Option<f64>,

    /// Every key/value pair from ImageDescription, values trimmed
    pub properties: BTreeMap<String, String>,
}

impl SvsMetadata {
    /// Parse metadata from an ImageDescription string.
    ///
    /// The first segment (library banner and dimension summary) is skipped.
    /// Every other segment must split on `" = "` into exactly a key and a
    /// value; anything else is ignored. Later duplicates of a key replace
    /// earlier ones.
    pub fn parse(description: &str) -> Self {
        let mut metadata = SvsMetadata::default();

        for part in description.split('|').skip(1) {
            let mut pieces = part.split(PAIR_SEPARATOR);
            let (Some(key), Some(value), None) = (pieces.next(), pieces.next(), pieces.next())
            else {
                continue;
            };

            let key = key.trim();
            let value = value.trim();
            if key.is_empty() {
                continue;
            }

            match key {
                KEY_MPP => metadata.mpp = value.parse::<f64>().ok(),
                KEY_APP_MAG => metadata.magnification = value.parse::<f64>().ok(),
                _ => {}
            }

            metadata
                .properties
                .insert(key.to_string(), value.to_string());
        }

        metadata
    }

    /// Add the `aperio.*` properties plus the normalized objective power
    /// and microns-per-pixel values derived from them.
    ///
    /// Normalized values copy the vendor's text verbatim, and only when it
    /// parses as a number.
    pub fn apply_to(&self, properties: &mut SlideProperties) {
        for (key, value) in &self.properties {
            properties.insert(format!("{}{}", APERIO_PREFIX, key), value.clone());
        }

        if self.magnification.is_some() {
            if let Some(value) = self.properties.get(KEY_APP_MAG) {
                properties.insert(PROPERTY_OBJECTIVE_POWER, value.clone());
            }
        }

        if self.mpp.is_some() {
            if let Some(value) = self.properties.get(KEY_MPP) {
                properties.insert(PROPERTY_MPP_X, value.clone());
                properties.insert(PROPERTY_MPP_Y, value.clone());
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
