//! CBZView - embeddable comic book archive viewer core
//!
//! Opens CBZ (zip) buffers, orders their page images naturally, pages
//! through them in single or dual-page mode and composites decoded pages
//! onto an RGBA canvas. Extraction runs on a background worker that talks
//! to the viewer only through messages.
//!
//! ```no_run
//! use cbzview::{CbzViewer, ViewerConfig};
//! use std::time::Duration;
//!
//! let mut viewer = CbzViewer::spawn(ViewerConfig::from_env())?;
//! viewer.open_file("issue-01.cbz")?;
//! while viewer.is_loading() {
//!     viewer.pump_timeout(Duration::from_millis(50))?;
//! }
//! viewer.toggle_dual_page()?;
//! viewer.next_page()?;
//! viewer.pump_timeout(Duration::from_millis(50))?;
//! let pixels = viewer.canvas().pixels();
//! # let _ = pixels;
//! # Ok::<(), cbzview::CbzError>(())
//! ```

pub mod archive;
pub mod channel;
pub mod config;
pub mod image_processor;
pub mod pagination;
pub mod utils;
pub mod viewer;

pub use archive::{build_index, fetch_page, ArchiveHandle, PageData, PageEntry, PageList};
pub use channel::{Channel, DocumentId, ExtractionSession, WorkerChannel};
pub use config::{ResizeFilter, ViewerConfig};
pub use image_processor::{decode_image, Canvas, Placement};
pub use pagination::{ClickZone, PageRole, Spread, ViewState};
pub use utils::error::{CbzError, Result};
pub use utils::logging::init_logging;
pub use viewer::CbzViewer;
