//! Viewer configuration
//!
//! Defaults can be overridden through `CBZVIEW_*` environment variables.
//! Unparsable values are logged and ignored.

use fast_image_resize::{FilterType, ResizeAlg};
use tracing::warn;

/// Maximum uncompressed size for a single page entry (32MB)
pub const MAX_ENTRY_SIZE: u64 = 32 * 1024 * 1024;

pub const ENV_DUAL_PAGE: &str = "CBZVIEW_DUAL_PAGE";
pub const ENV_MAX_ENTRY_SIZE: &str = "CBZVIEW_MAX_ENTRY_SIZE";
pub const ENV_RESIZE_FILTER: &str = "CBZVIEW_RESIZE_FILTER";

/// Scaling filter used when compositing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeFilter {
    Nearest,
    Bilinear,
    Lanczos3,
}

impl ResizeFilter {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "nearest" => Some(Self::Nearest),
            "bilinear" => Some(Self::Bilinear),
            "lanczos3" | "lanczos" => Some(Self::Lanczos3),
            _ => None,
        }
    }

    pub(crate) fn resize_alg(self) -> ResizeAlg {
        match self {
            Self::Nearest => ResizeAlg::Nearest,
            Self::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            Self::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Start new viewers in dual-page mode
    pub dual_page_default: bool,
    /// Entries larger than this are refused before extraction
    pub max_entry_size: u64,
    pub resize_filter: ResizeFilter,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            dual_page_default: false,
            max_entry_size: MAX_ENTRY_SIZE,
            resize_filter: ResizeFilter::Bilinear,
            canvas_width: 800,
            canvas_height: 600,
        }
    }
}

impl ViewerConfig {
    /// Defaults overlaid with whatever `CBZVIEW_*` variables are set
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_DUAL_PAGE) {
            match parse_bool(&raw) {
                Some(value) => config.dual_page_default = value,
                None => warn!(key = ENV_DUAL_PAGE, value = %raw, "Ignoring invalid boolean"),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_ENTRY_SIZE) {
            match raw.trim().parse::<u64>() {
                Ok(value) if value > 0 => config.max_entry_size = value,
                _ => warn!(key = ENV_MAX_ENTRY_SIZE, value = %raw, "Ignoring invalid size"),
            }
        }

        if let Some(raw) = lookup(ENV_RESIZE_FILTER) {
            match ResizeFilter::from_name(&raw) {
                Some(filter) => config.resize_filter = filter,
                None => warn!(key = ENV_RESIZE_FILTER, value = %raw, "Ignoring unknown filter"),
            }
        }

        config
    }

    pub fn with_canvas_size(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    pub fn with_dual_page(mut self, dual_page: bool) -> Self {
        self.dual_page_default = dual_page;
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
