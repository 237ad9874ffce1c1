//! The search engine: walks a tree and collects filename and content matches.
//!
//! The engine holds no state between runs. Progress goes out through a
//! callback and cancellation comes in through a predicate, so the same
//! code serves the background session and direct library callers.
use crate::error::Result;
use crate::processor::process_file;
use crate::record::MatchRecord;
use crate::walker::{self, WalkOptions};
use log::{debug, info};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Tuning that does not change what counts as a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub walk: WalkOptions,
    /// `None` or `Some(1)` runs the sequential two-pass scan. `Some(0)`
    /// uses one worker per CPU.
    pub parallel_jobs: Option<usize>,
}

impl SearchOptions {
    fn worker_count(&self) -> Option<usize> {
        match self.parallel_jobs {
            None | Some(1) => None,
            Some(0) => Some(num_cpus::get().max(1)),
            Some(n) => Some(n),
        }
    }
}

/// Inputs of one scan. `needle` must be non-empty and `extensions`
/// lowercase with a leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub folder: PathBuf,
    pub needle: String,
    pub extensions: Vec<String>,
    pub include_name_matches: bool,
    pub options: SearchOptions,
}

impl SearchRequest {
    pub fn new(
        folder: impl Into<PathBuf>,
        needle: impl Into<String>,
        extensions: Vec<String>,
        include_name_matches: bool,
    ) -> Self {
        Self {
            folder: folder.into(),
            needle: needle.into(),
            extensions,
            include_name_matches,
            options: SearchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }
}

/// Tracks files processed against the sizing total.
struct ProgressTracker<P> {
    total: usize,
    processed: usize,
    last: Option<u8>,
    on_progress: P,
}

impl<P: FnMut(u8)> ProgressTracker<P> {
    fn new(total: usize, on_progress: P) -> Self {
        Self {
            total,
            processed: 0,
            last: None,
            on_progress,
        }
    }

    fn file_done(&mut self) {
        self.processed += 1;
        if self.total == 0 {
            return;
        }
        // Files created between passes could push this past 100.
        let pct = (self.processed * 100 / self.total).min(100) as u8;
        if self.last.is_some_and(|last| pct < last) {
            return;
        }
        self.last = Some(pct);
        (self.on_progress)(pct);
    }

    /// Files removed between passes leave the count short of 100.
    fn complete(&mut self) {
        if self.total > 0 && self.last != Some(100) {
            self.last = Some(100);
            (self.on_progress)(100);
        }
    }
}

/// Walks `request.folder` and returns every match.
///
/// `on_progress` receives `floor(processed / total * 100)` after each file;
/// with no files it is never called. `is_cancelled` is polled before each
/// directory entry and each file; once it returns `true` the records found
/// so far are returned as a normal result.
///
/// Unreadable files are skipped. Only a root that cannot be enumerated
/// fails the scan.
pub fn search<P, C>(request: SearchRequest, on_progress: P, is_cancelled: C) -> Result<Vec<MatchRecord>>
where
    P: FnMut(u8) + Send,
    C: Fn() -> bool + Sync,
{
    let start = Instant::now();
    let needle_lower = request.needle.to_lowercase();
    info!(
        "Scanning {} for {:?} (extensions: {})",
        request.folder.display(),
        request.needle,
        request.extensions.join(",")
    );

    let records = match request.options.worker_count() {
        None => search_sequential(&request, &needle_lower, on_progress, &is_cancelled)?,
        Some(workers) => {
            search_parallel(&request, &needle_lower, workers, on_progress, &is_cancelled)?
        }
    };

    info!(
        "Scan of {} finished in {:.2?}: {} records{}",
        request.folder.display(),
        start.elapsed(),
        records.len(),
        if is_cancelled() { " (cancelled)" } else { "" }
    );
    Ok(records)
}

fn search_sequential<P, C>(
    request: &SearchRequest,
    needle_lower: &str,
    on_progress: P,
    is_cancelled: &C,
) -> Result<Vec<MatchRecord>>
where
    P: FnMut(u8),
    C: Fn() -> bool,
{
    let root = request.folder.as_path();
    let walk = request.options.walk;

    walker::ensure_readable(root)?;
    let Some(total) = walker::count_files(root, walk, is_cancelled) else {
        debug!("Cancelled while sizing {}", root.display());
        return Ok(Vec::new());
    };
    debug!("Sizing pass found {total} files");

    walker::ensure_readable(root)?;
    let mut progress = ProgressTracker::new(total, on_progress);
    let mut records = Vec::new();

    for entry in walker::walk_dir(root, walk) {
        if is_cancelled() {
            return Ok(records);
        }
        if !walker::is_regular_file(&entry) {
            continue;
        }
        if is_cancelled() {
            return Ok(records);
        }
        records.extend(process_file(
            entry.path(),
            needle_lower,
            &request.extensions,
            request.include_name_matches,
        ));
        progress.file_done();
    }

    progress.complete();
    Ok(records)
}

fn collect_files<C>(root: &Path, walk: WalkOptions, is_cancelled: &C) -> Option<Vec<PathBuf>>
where
    C: Fn() -> bool,
{
    let mut files = Vec::new();
    for entry in walker::walk_dir(root, walk) {
        if is_cancelled() {
            return None;
        }
        if walker::is_regular_file(&entry) {
            files.push(entry.into_path());
        }
    }
    Some(files)
}

/// One walk builds the file list, then files are matched on a dedicated
/// pool. Progress is reported under a lock so observers never see it
/// go backwards.
fn search_parallel<P, C>(
    request: &SearchRequest,
    needle_lower: &str,
    workers: usize,
    on_progress: P,
    is_cancelled: &C,
) -> Result<Vec<MatchRecord>>
where
    P: FnMut(u8) + Send,
    C: Fn() -> bool + Sync,
{
    let root = request.folder.as_path();
    walker::ensure_readable(root)?;
    let Some(files) = collect_files(root, request.options.walk, is_cancelled) else {
        debug!("Cancelled while listing {}", root.display());
        return Ok(Vec::new());
    };
    debug!("Matching {} files on {workers} workers", files.len());

    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
    let progress = Mutex::new(ProgressTracker::new(files.len(), on_progress));

    let per_file: Vec<Vec<MatchRecord>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                if is_cancelled() {
                    return Vec::new();
                }
                let found = process_file(
                    path,
                    needle_lower,
                    &request.extensions,
                    request.include_name_matches,
                );
                progress.lock().file_done();
                found
            })
            .collect()
    });

    if !is_cancelled() {
        progress.lock().complete();
    }
    Ok(per_file.into_iter().flatten().collect())
}
