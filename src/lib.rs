//! # WSI Inspect
//!
//! Print the pyramid layout and metadata properties of a Whole Slide Image.
//!
//! Slides are read through native parsers for Aperio SVS and generic
//! pyramidal TIFF (classic and BigTIFF, either byte order). Only the bytes
//! holding the TIFF structure and its tag values are read; pixel data is
//! never touched.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`io`] - Local file range reader and block caching
//! - [`mod@format`] - TIFF structure parsing, format detection, SVS and TIFF tag metadata
//! - [`slide`] - Slide backend traits, property map and the TIFF backend
//! - [`mod@inspect`] - The inspection report
//! - [`config`] - CLI configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wsi_inspect::{inspect, TiffBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = TiffBackend::new();
//!     let mut out = std::io::stdout().lock();
//!
//!     if let Err(e) = inspect(&backend, Path::new("CMU-1-Small-Region.svs"), &mut out).await {
//!         eprintln!("Error: {}", e);
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod inspect;
pub mod io;
pub mod slide;

// Re-export commonly used types
pub use config::Config;
pub use error::{FormatError, InspectError, IoError, TiffError};
pub use format::tiff::{
    ByteOrder, FieldType, Ifd, IfdEntry, PyramidLevel, ResolutionUnit, TiffHeader, TiffPyramid,
    TiffTag, ValueReader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE,
};
pub use format::{detect_format, is_tiff_header, SlideFormat, SvsMetadata, TiffTagMetadata};
pub use inspect::{inspect, MPP_KEY, OBJECTIVE_POWER_KEY};
pub use io::{BlockCache, LocalFileReader, RangeReader};
pub use slide::{SlideBackend, SlideHandle, SlideProperties, TiffBackend, TiffSlide};
