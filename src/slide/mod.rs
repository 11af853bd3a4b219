//! Slide abstraction layer.
//!
//! This module provides a unified interface for opened Whole Slide Images
//! regardless of their underlying format.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               Inspector                 │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │      SlideBackend / SlideHandle         │
//! │   (format-agnostic slide interface)     │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │        TiffBackend / TiffSlide          │
//! │  (Aperio SVS, generic pyramidal TIFF)   │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   BlockCache<LocalFileReader>           │
//! └─────────────────────────────────────────┘
//! ```

mod backend;
mod properties;
mod tiff_slide;

pub use backend::{SlideBackend, SlideHandle};
pub use properties::{
    level_key, SlideProperties, PROPERTY_COMMENT, PROPERTY_LEVEL_COUNT, PROPERTY_MPP_X,
    PROPERTY_MPP_Y, PROPERTY_OBJECTIVE_POWER, PROPERTY_VENDOR,
};
pub use tiff_slide::{TiffBackend, TiffSlide};
