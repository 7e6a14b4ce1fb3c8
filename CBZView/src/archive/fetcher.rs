//! Page extraction
//!
//! Turns a page index into the raw image bytes and MIME type of that page.

use std::io::Read;

use tracing::trace;

use super::{mime_type_for, ArchiveHandle, PageList};
use crate::utils::error::{CbzError, Result};

/// Raw bytes of one page plus the MIME type derived from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageData {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

/// Extract page `index` from the archive
///
/// # Arguments
/// * `handle` - Archive the page list was built from
/// * `pages` - Sorted page list
/// * `index` - 0-based page index, valid in `[0, pages.len())`
/// * `max_entry_size` - Entries declaring a larger uncompressed size are refused
///
/// # Returns
/// * `Err(CbzError::PageIndexOutOfRange)` - Index outside the page list
/// * `Err(CbzError::EntryTooLarge)` - Declared size above `max_entry_size`
/// * `Err(CbzError::InvalidArchive)` - The zip reader failed mid-extraction
pub fn fetch_page(
    handle: &mut ArchiveHandle,
    pages: &PageList,
    index: usize,
    max_entry_size: u64,
) -> Result<PageData> {
    let entry = pages.get(index).ok_or(CbzError::PageIndexOutOfRange {
        index,
        count: pages.len(),
    })?;

    if entry.size > max_entry_size {
        return Err(CbzError::EntryTooLarge {
            name: entry.name.clone(),
            size: entry.size,
            limit: max_entry_size,
        });
    }

    let mut file = handle.zip_mut().by_index(entry.zip_index)?;

    // Cap the read in case the declared size lies
    let mut bytes = Vec::with_capacity(entry.size as usize);
    file.by_ref()
        .take(max_entry_size + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| {
            CbzError::InvalidArchive(format!("Failed to extract '{}': {}", entry.name, e))
        })?;

    if bytes.len() as u64 > max_entry_size {
        return Err(CbzError::EntryTooLarge {
            name: entry.name.clone(),
            size: bytes.len() as u64,
            limit: max_entry_size,
        });
    }

    trace!(index, name = %entry.name, bytes = bytes.len(), "Page extracted");

    Ok(PageData {
        bytes,
        mime_type: mime_type_for(&entry.name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::build_index;
    use crate::archive::test_support::build_zip;
    use crate::config::MAX_ENTRY_SIZE;

    fn three_pages() -> (ArchiveHandle, PageList) {
        let data = build_zip(&[
            ("p3.webp", b"third"),
            ("p1.jpg", b"first"),
            ("p2.PNG", b"second"),
        ]);
        build_index(data).unwrap()
    }

    #[test]
    fn test_fetch_first_and_last_page() {
        let (mut handle, pages) = three_pages();

        let first = fetch_page(&mut handle, &pages, 0, MAX_ENTRY_SIZE).unwrap();
        assert_eq!(first.bytes, b"first");
        assert_eq!(first.mime_type, "image/jpeg");

        let last = fetch_page(&mut handle, &pages, pages.len() - 1, MAX_ENTRY_SIZE).unwrap();
        assert_eq!(last.bytes, b"third");
        assert_eq!(last.mime_type, "image/webp");
    }

    #[test]
    fn test_fetch_uppercase_extension() {
        let (mut handle, pages) = three_pages();
        let page = fetch_page(&mut handle, &pages, 1, MAX_ENTRY_SIZE).unwrap();
        assert_eq!(page.mime_type, "image/png");
    }

    #[test]
    fn test_fetch_out_of_range() {
        let (mut handle, pages) = three_pages();
        let result = fetch_page(&mut handle, &pages, pages.len(), MAX_ENTRY_SIZE);
        match result {
            Err(CbzError::PageIndexOutOfRange { index, count }) => {
                assert_eq!(index, 3);
                assert_eq!(count, 3);
            }
            other => panic!("expected PageIndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_entry_too_large() {
        let (mut handle, pages) = three_pages();
        let result = fetch_page(&mut handle, &pages, 1, 3);
        assert!(matches!(result, Err(CbzError::EntryTooLarge { limit: 3, .. })));
    }
}
