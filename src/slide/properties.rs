//! Slide property map.
//!
//! Properties are string key/value pairs namespaced by origin:
//! `openslide.*` for normalized values, `aperio.*` for vendor metadata and
//! `tiff.*` for baseline TIFF tags. Keys are kept sorted so that printing
//! the map is deterministic.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::InspectError;

/// Normalized vendor identifier.
pub const PROPERTY_VENDOR: &str = "openslide.vendor";

/// Number of pyramid levels.
pub const PROPERTY_LEVEL_COUNT: &str = "openslide.level-count";

/// Free-form comment, taken from the first ImageDescription.
pub const PROPERTY_COMMENT: &str = "openslide.comment";

/// Magnification of the objective used for the scan.
pub const PROPERTY_OBJECTIVE_POWER: &str = "openslide.objective-power";

/// Microns per pixel in X.
pub const PROPERTY_MPP_X: &str = "openslide.mpp-x";

/// Microns per pixel in Y.
pub const PROPERTY_MPP_Y: &str = "openslide.mpp-y";

/// Key for a per-level property, e.g. `openslide.level[2].downsample`.
pub fn level_key(level: usize, field: &str) -> String {
    format!("openslide.level[{}].{}", level, field)
}

/// Ordered string-to-string property map of an opened slide.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SlideProperties {
    entries: BTreeMap<String, String>,
}

impl SlideProperties {
    /// Create an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a property.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a property.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a property that must be present.
    ///
    /// # Errors
    /// `InspectError::MissingProperty` naming the key when it is absent.
    pub fn require(&self, key: &str) -> Result<&str, InspectError> {
        self.get(key).ok_or_else(|| InspectError::MissingProperty {
            key: key.to_string(),
        })
    }

    /// Whether a property is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Formats as a map literal: `{"key": "value", ...}`.
impl fmt::Debug for SlideProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SlideProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = SlideProperties::new();
        for (key, value) in iter {
            properties.insert(key, value);
        }
        properties
    }
}
