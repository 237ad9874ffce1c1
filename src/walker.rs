use crate::error::{Result, ScanError};
use ignore::{DirEntry, WalkBuilder};
use log::debug;
use std::fs;
use std::path::Path;

/// Traversal knobs. The default visits every regular file, hidden ones
/// included, without honoring ignore files or descending symlinked
/// directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    pub follow_links: bool,
    pub include_hidden: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            follow_links: false,
            include_hidden: true,
        }
    }
}

/// Yields every readable entry below `root` (directories included).
/// Entries that cannot be read are logged and skipped.
pub fn walk_dir(root: &Path, options: WalkOptions) -> impl Iterator<Item = DirEntry> {
    WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(!options.include_hidden)
        .follow_links(options.follow_links)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {e}");
                None
            }
        })
}

/// Regular files, plus symlinks that resolve to one.
pub fn is_regular_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => entry.path().is_file(),
        _ => false,
    }
}

/// Fails when the root itself can no longer be enumerated. A vanished or
/// locked root is the one traversal failure that is fatal to a scan.
pub fn ensure_readable(root: &Path) -> Result<()> {
    fs::read_dir(root)
        .map(drop)
        .map_err(|source| ScanError::RootUnavailable {
            path: root.to_path_buf(),
            source,
        })
}

/// Counts regular files below `root`. Returns `None` if `is_cancelled`
/// fires before the walk completes.
pub fn count_files<C>(root: &Path, options: WalkOptions, is_cancelled: C) -> Option<usize>
where
    C: Fn() -> bool,
{
    let mut total = 0;
    for entry in walk_dir(root, options) {
        if is_cancelled() {
            return None;
        }
        if is_regular_file(&entry) {
            total += 1;
        }
    }
    Some(total)
}
