///! Error types for CBZView

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CbzError>;

/// Everything that can go wrong between receiving an archive buffer and
/// drawing a page.
///
/// All variants are fatal to the current document on the viewer side;
/// nothing is retried automatically.
#[derive(Debug, Error)]
pub enum CbzError {
    /// The buffer is not a zip container, or the zip reader rejected it
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// The archive parsed but contains no supported page images
    #[error("No supported image files found in the archive")]
    NoImagesFound,

    #[error("Invalid page index: {index}. Archive has {count} pages")]
    PageIndexOutOfRange { index: usize, count: usize },

    #[error("Entry '{name}' is too large: {size} bytes (limit: {limit})")]
    EntryTooLarge { name: String, size: u64, limit: u64 },

    /// Page bytes could not be turned into a bitmap
    #[error("Failed to decode page image: {0}")]
    DecodeFailure(String),

    /// The background worker errored or went away
    #[error("Worker channel failure: {0}")]
    ChannelFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for CbzError {
    fn from(err: zip::result::ZipError) -> Self {
        CbzError::InvalidArchive(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_index_message_names_index_and_count() {
        let err = CbzError::PageIndexOutOfRange { index: 10, count: 10 };
        assert_eq!(err.to_string(), "Invalid page index: 10. Archive has 10 pages");
    }

    #[test]
    fn test_zip_error_maps_to_invalid_archive() {
        let err: CbzError = zip::result::ZipError::InvalidArchive("bad cd").into();
        assert!(matches!(err, CbzError::InvalidArchive(_)));
    }
}
