//! Slide decoding capability.
//!
//! The inspector talks to slides only through these two traits:
//!
//! - [`SlideBackend`] detects the container format of a path and opens it
//! - [`SlideHandle`] exposes the read-only accessors of an opened slide
//!
//! Dropping a handle releases everything it holds, including the open file.
//! The TIFF implementation lives in [`super::TiffBackend`]; tests substitute
//! an in-memory backend.

use std::path::Path;

use async_trait::async_trait;

use crate::error::FormatError;
use crate::format::SlideFormat;

use super::properties::SlideProperties;

// =============================================================================
// SlideHandle Trait
// =============================================================================

/// Read-only view of an opened multi-resolution slide.
pub trait SlideHandle: Send + Sync {
    /// Get the number of pyramid levels.
    ///
    /// Level 0 is always the highest resolution (full size).
    fn level_count(&self) -> usize;

    /// Dimensions of every level as `(width, height)`, finest first.
    ///
    /// Has exactly `level_count()` entries.
    fn level_dimensions(&self) -> Vec<(u32, u32)>;

    /// Downsample factor of every level relative to level 0.
    ///
    /// Has exactly `level_count()` entries, starts at 1.0 and never
    /// decreases.
    fn level_downsamples(&self) -> Vec<f64>;

    /// Slide metadata.
    fn properties(&self) -> &SlideProperties;

    /// Get dimensions of the full-resolution (level 0) image.
    ///
    /// `(0, 0)` for a handle without levels.
    fn dimensions(&self) -> (u32, u32) {
        self.level_dimensions().first().copied().unwrap_or((0, 0))
    }
}

// =============================================================================
// SlideBackend Trait
// =============================================================================

/// Opens slides from filesystem paths.
#[async_trait]
pub trait SlideBackend: Send + Sync {
    /// Handle type produced by [`SlideBackend::open`].
    type Handle: SlideHandle;

    /// Identify the container format of a file.
    ///
    /// Returns `Ok(None)` when the file is readable but not a recognised
    /// container.
    async fn detect_format(&self, path: &Path) -> Result<Option<SlideFormat>, FormatError>;

    /// Open a slide.
    ///
    /// # Errors
    /// - `FormatError::Io(IoError::NotFound)` when the path does not exist
    /// - any other `FormatError` when the container cannot be parsed
    async fn open(&self, path: &Path) -> Result<Self::Handle, FormatError>;
}
