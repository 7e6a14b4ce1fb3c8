///! Shared utilities for archive processing
///!
///! Provides page image detection, natural sorting, and MIME mapping

use std::cmp::Ordering;
use std::path::Path;

/// Extensions accepted as comic pages (matched case-insensitively)
const PAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Fallback MIME type for extensions outside the known mapping
pub const GENERIC_MIME_TYPE: &str = "application/octet-stream";

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Check if an entry name is a supported page image based on extension
pub fn is_page_image(name: &str) -> bool {
    match extension_of(name) {
        Some(ext) => PAGE_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

/// MIME type for an entry name. Unknown extensions get [`GENERIC_MIME_TYPE`].
pub fn mime_type_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => GENERIC_MIME_TYPE,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Run<'a> {
    Digits(&'a str),
    Text(&'a str),
}

impl<'a> Run<'a> {
    fn as_str(&self) -> &'a str {
        match self {
            Run::Digits(s) | Run::Text(s) => s,
        }
    }
}

/// Split a name into alternating runs of ASCII digits and everything else
fn split_runs(name: &str) -> Vec<Run<'_>> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (i, c) in name.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                let run = &name[start..i];
                runs.push(if prev { Run::Digits(run) } else { Run::Text(run) });
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }

    if let Some(prev) = in_digits {
        let run = &name[start..];
        runs.push(if prev { Run::Digits(run) } else { Run::Text(run) });
    }

    runs
}

/// Compare two digit runs by value without parsing, so runs of any length work
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural sort comparison
///
/// Digit runs compare numerically, all other runs compare lexically. When one
/// name's runs are a strict prefix of the other's, the shorter name sorts
/// first. So `page2.jpg` < `page10.jpg`, and `page01.jpg` equals `page1.jpg`.
pub fn natural_sort_cmp(a: &str, b: &str) -> Ordering {
    let a_runs = split_runs(a);
    let b_runs = split_runs(b);

    for (a_run, b_run) in a_runs.iter().zip(b_runs.iter()) {
        let ordering = match (a_run, b_run) {
            (Run::Digits(x), Run::Digits(y)) => compare_digit_runs(x, y),
            _ => a_run.as_str().cmp(b_run.as_str()),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    a_runs.len().cmp(&b_runs.len())
}
