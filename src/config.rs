//! Command-line configuration for the inspector.
//!
//! The slide path can also be set through the `WSI_SLIDE` environment
//! variable. `RUST_LOG` overrides the log filter chosen by `--verbose`.
//!
//! # Example
//!
//! ```ignore
//! use wsi_inspect::config::Config;
//!
//! let config = Config::parse();
//! println!("Inspecting {}", config.path.display());
//! ```

use std::path::PathBuf;

use clap::Parser;

/// Print the pyramid layout and metadata of a Whole Slide Image.
#[derive(Parser, Debug, Clone)]
#[command(name = "wsi-inspect")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Path to the slide file (.svs, .tif, .tiff)
    #[arg(env = "WSI_SLIDE")]
    pub path: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err(
                "Slide path is required. Pass it as an argument or set WSI_SLIDE".to_string(),
            );
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
