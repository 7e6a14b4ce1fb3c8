///! Comic archive indexing
///!
///! Opens an in-memory zip buffer and builds the naturally sorted page list

use std::io::Cursor;

use tracing::debug;

use crate::utils::error::{CbzError, Result};

pub mod fetcher;
mod utils;

pub use fetcher::{fetch_page, PageData};
pub use utils::{is_page_image, mime_type_for, natural_sort_cmp, GENERIC_MIME_TYPE};

/// Opened zip container over the archive bytes
///
/// Owns the decompression context. Dropping it releases the buffer.
pub struct ArchiveHandle {
    zip: ::zip::ZipArchive<Cursor<Vec<u8>>>,
}

impl ArchiveHandle {
    /// Open a zip container from memory without indexing it
    ///
    /// The container is located through its end-of-central-directory
    /// record, so data prepended to the zip (a self-extractor stub) is
    /// accepted.
    pub fn open(data: Vec<u8>) -> Result<Self> {
        let zip = ::zip::ZipArchive::new(Cursor::new(data)).map_err(|e| {
            CbzError::InvalidArchive(format!("Failed to open ZIP from memory: {}", e))
        })?;

        Ok(Self { zip })
    }

    /// Total number of entries, directories and non-images included
    pub fn entry_count(&self) -> usize {
        self.zip.len()
    }

    pub(crate) fn zip_mut(&mut self) -> &mut ::zip::ZipArchive<Cursor<Vec<u8>>> {
        &mut self.zip
    }
}

impl std::fmt::Debug for ArchiveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveHandle")
            .field("entries", &self.zip.len())
            .finish()
    }
}

/// A page image inside the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub name: String,
    /// Uncompressed size in bytes
    pub size: u64,
    pub compressed_size: u64,
    /// Offset of the entry's compressed data within the archive
    pub data_offset: u64,
    /// Position of the entry in the zip central directory
    pub(crate) zip_index: usize,
}

/// Naturally sorted, immutable list of page entries
#[derive(Debug, Clone, Default)]
pub struct PageList {
    pages: Vec<PageEntry>,
}

impl PageList {
    /// Filter and sort raw entries into page order
    pub fn from_entries(entries: impl IntoIterator<Item = PageEntry>) -> Self {
        let mut pages: Vec<PageEntry> = entries
            .into_iter()
            .filter(|entry| is_page_image(&entry.name))
            .collect();
        pages.sort_by(|a, b| natural_sort_cmp(&a.name, &b.name));
        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PageEntry> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageEntry> {
        self.pages.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.name.as_str())
    }
}

/// Enumerate the non-directory entries of an opened archive
fn list_file_entries(handle: &mut ArchiveHandle) -> Result<Vec<PageEntry>> {
    let zip = handle.zip_mut();
    let mut entries = Vec::with_capacity(zip.len());

    for i in 0..zip.len() {
        // Raw access: metadata only, no decryption or decompression
        let file = zip.by_index_raw(i)?;
        if file.is_dir() {
            continue;
        }
        entries.push(PageEntry {
            name: file.name().to_string(),
            size: file.size(),
            compressed_size: file.compressed_size(),
            data_offset: file.data_start(),
            zip_index: i,
        });
    }

    Ok(entries)
}

/// Open an archive buffer and build its page list
///
/// # Returns
/// * `Ok((ArchiveHandle, PageList))` - Handle for extraction plus sorted pages
/// * `Err(CbzError::InvalidArchive)` - Not a zip container
/// * `Err(CbzError::NoImagesFound)` - No entry matched the page extensions
pub fn build_index(data: Vec<u8>) -> Result<(ArchiveHandle, PageList)> {
    debug!(bytes = data.len(), "Building archive index");

    let mut handle = ArchiveHandle::open(data)?;
    let entries = list_file_entries(&mut handle)?;
    let total_files = entries.len();
    let pages = PageList::from_entries(entries);

    if pages.is_empty() {
        debug!(total_files, "Archive has no page images");
        return Err(CbzError::NoImagesFound);
    }

    debug!(
        total_files,
        pages = pages.len(),
        first = pages.get(0).map(|p| p.name.as_str()).unwrap_or_default(),
        "Archive index built"
    );
    Ok((handle, pages))
}
