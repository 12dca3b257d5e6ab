//! Configuration for region compositing.
//!
//! [`CompositorConfig`] controls how decoded pixels are stretched onto the
//! destination and whether painted regions are tinted for debugging. It can be
//! built in code, deserialized from a host application's config file via
//! serde, flattened into a host's clap parser, or read from the environment.
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use wholeslide::config::CompositorConfig;
//!
//! #[derive(Parser)]
//! struct ViewerArgs {
//!     slide: std::path::PathBuf,
//!
//!     #[command(flatten)]
//!     compositor: CompositorConfig,
//! }
//!
//! // Or, without a command line
//! let config = CompositorConfig::from_env()?;
//! ```
//!
//! # Environment Variables
//!
//! - `WHOLESLIDE_INTERPOLATION` - `nearest` or `bilinear` (default: bilinear)
//! - `WHOLESLIDE_DEBUG_OVERLAY` - Tint every painted region (default: false)
//! - `WHOLESLIDE_OVERLAY_ALPHA` - Opacity of the debug tint (default: 0.4)

use std::ffi::OsString;
use std::fmt;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tiny_skia::FilterQuality;

// =============================================================================
// Default Values
// =============================================================================

/// Default opacity of the debug overlay tint.
pub const DEFAULT_OVERLAY_ALPHA: f32 = 0.4;

// =============================================================================
// Interpolation
// =============================================================================

/// Filter used when stretching decoded pixels to the destination size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Nearest,
    #[default]
    #[value(alias = "linear")]
    Bilinear,
}

impl Interpolation {
    /// The matching `tiny_skia` sampling quality.
    pub fn filter_quality(self) -> FilterQuality {
        match self {
            Interpolation::Nearest => FilterQuality::Nearest,
            Interpolation::Bilinear => FilterQuality::Bilinear,
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpolation::Nearest => f.write_str("nearest"),
            Interpolation::Bilinear => f.write_str("bilinear"),
        }
    }
}

// =============================================================================
// Compositor Configuration
// =============================================================================

/// Settings for [`crate::region::RegionCompositor`].
#[derive(Parser, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Filter used to stretch decoded pixels onto the destination.
    #[arg(
        long,
        value_enum,
        default_value_t = Interpolation::Bilinear,
        env = "WHOLESLIDE_INTERPOLATION"
    )]
    pub interpolation: Interpolation,

    /// Tint every painted region, alternating red and green.
    ///
    /// Useful to see region boundaries when tiling a viewport.
    #[arg(
        long,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value_t = false,
        env = "WHOLESLIDE_DEBUG_OVERLAY"
    )]
    pub debug_overlay: bool,

    /// Opacity of the debug tint (0.0 - 1.0).
    #[arg(long, default_value_t = DEFAULT_OVERLAY_ALPHA, env = "WHOLESLIDE_OVERLAY_ALPHA")]
    pub overlay_alpha: f32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::default(),
            debug_overlay: false,
            overlay_alpha: DEFAULT_OVERLAY_ALPHA,
        }
    }
}

impl CompositorConfig {
    /// Read the configuration from `WHOLESLIDE_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, String> {
        Self::from_args(std::iter::empty::<OsString>())
    }

    /// Parse `--interpolation`, `--debug-overlay` and `--overlay-alpha`
    /// arguments, falling back to the environment and then the defaults.
    pub fn from_args<I, T>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = std::iter::once(OsString::from("wholeslide"))
            .chain(args.into_iter().map(Into::into));
        let config = Self::try_parse_from(args).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.overlay_alpha) {
            return Err(format!(
                "overlay_alpha must be between 0.0 and 1.0, got {}",
                self.overlay_alpha
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
