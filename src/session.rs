//! Background scan lifecycle.
//!
//! A [`ScanSession`] runs at most one search on a worker thread and turns
//! its outcome into [`ScanEvent`]s on a crossbeam channel. Every scan that
//! starts produces exactly one `ScanningChanged(false)`: from the worker when
//! it finishes on its own, or from [`ScanSession::stop`] when it is
//! cancelled. A stopped scan's partial results are discarded.
use crate::error::ValidationError;
use crate::extensions::sanitize_extensions;
use crate::record::MatchRecord;
use crate::search::{self, SearchOptions, SearchRequest};
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    ScanningChanged(bool),
    /// 0..=100, never decreasing within one scan.
    ProgressChanged(u8),
    ResultsReady(Vec<MatchRecord>),
    ErrorOccurred(String),
}

/// Checks the inputs `start` would reject.
pub fn validate_inputs(folder: &Path, needle: &str) -> Result<(), ValidationError> {
    if folder.as_os_str().is_empty() {
        return Err(ValidationError::EmptyFolder);
    }
    if !folder.is_dir() {
        return Err(ValidationError::NotADirectory(folder.to_path_buf()));
    }
    if needle.is_empty() {
        return Err(ValidationError::EmptyNeedle);
    }
    Ok(())
}

struct ActiveScan {
    id: u64,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

struct Shared {
    /// Serializes `start` and `stop` so a new scan never overlaps the old one.
    lifecycle: Mutex<()>,
    active: Mutex<Option<ActiveScan>>,
    next_id: AtomicU64,
    events: Sender<ScanEvent>,
}

impl Shared {
    /// Caller must hold `lifecycle`.
    fn stop_active(&self) {
        let taken = {
            let mut active = self.active.lock();
            let taken = active.take();
            if let Some(scan) = &taken {
                scan.cancel.store(true, Ordering::Release);
            }
            taken
        };

        let Some(scan) = taken else {
            return;
        };
        debug!("Waiting for scan #{} to acknowledge cancellation", scan.id);
        if scan.handle.join().is_err() {
            warn!("Scan #{} worker panicked during shutdown", scan.id);
        }
        info!("Scan #{} stopped", scan.id);
        let _ = self.events.send(ScanEvent::ScanningChanged(false));
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.stop_active();
    }
}

/// Owns the active background scan, if any. Clones share the same scan
/// state and event channel.
#[derive(Clone)]
pub struct ScanSession {
    shared: Arc<Shared>,
    options: SearchOptions,
}

impl ScanSession {
    /// Creates a session and the receiving end of its event stream.
    pub fn new() -> (Self, Receiver<ScanEvent>) {
        let (tx, rx) = unbounded();
        (Self::with_sender(tx), rx)
    }

    pub fn with_sender(events: Sender<ScanEvent>) -> Self {
        Self {
            shared: Arc::new(Shared {
                lifecycle: Mutex::new(()),
                active: Mutex::new(None),
                next_id: AtomicU64::new(1),
                events,
            }),
            options: SearchOptions::default(),
        }
    }

    /// Traversal and worker settings applied to scans started afterwards.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_scanning(&self) -> bool {
        self.shared.active.lock().is_some()
    }

    /// Validates the inputs, stops any running scan, then launches a new
    /// one. `extension_filter` is raw user text such as `"log, txt"`.
    pub fn start(
        &self,
        folder: impl Into<PathBuf>,
        needle: &str,
        extension_filter: &str,
        include_name_matches: bool,
    ) -> Result<(), ValidationError> {
        let request = SearchRequest::new(
            folder,
            needle,
            sanitize_extensions(extension_filter),
            include_name_matches,
        )
        .with_options(self.options);
        self.start_request(request)
    }

    /// Like [`start`](Self::start) for an already normalized request.
    pub fn start_request(&self, request: SearchRequest) -> Result<(), ValidationError> {
        validate_inputs(&request.folder, &request.needle)?;

        let _lifecycle = self.shared.lifecycle.lock();
        self.shared.stop_active();

        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = Arc::new(AtomicBool::new(false));

        // Held until the handle is stored, so a fast worker cannot try to
        // retire itself before it is registered.
        let mut active = self.shared.active.lock();
        let _ = self.shared.events.send(ScanEvent::ScanningChanged(true));
        info!("Scan #{id} started in {}", request.folder.display());

        let worker = Worker {
            id,
            cancel: Arc::clone(&cancel),
            events: self.shared.events.clone(),
            shared: Arc::downgrade(&self.shared),
        };
        let handle = thread::Builder::new()
            .name(format!("textscan-{id}"))
            .spawn(move || worker.run(request));

        match handle {
            Ok(handle) => {
                *active = Some(ActiveScan { id, cancel, handle });
            }
            Err(e) => {
                error!("Failed to spawn scan worker: {e}");
                let _ = self
                    .shared
                    .events
                    .send(ScanEvent::ErrorOccurred(format!("Failed to start scan: {e}")));
                let _ = self.shared.events.send(ScanEvent::ScanningChanged(false));
            }
        }
        Ok(())
    }

    /// Cancels the running scan and waits for its worker to exit. Does
    /// nothing when idle.
    pub fn stop(&self) {
        let _lifecycle = self.shared.lifecycle.lock();
        self.shared.stop_active();
    }
}

struct Worker {
    id: u64,
    cancel: Arc<AtomicBool>,
    events: Sender<ScanEvent>,
    shared: Weak<Shared>,
}

impl Worker {
    fn run(self, request: SearchRequest) {
        let progress_tx = self.events.clone();
        let mut last = None;
        let on_progress = move |pct: u8| {
            if last != Some(pct) {
                last = Some(pct);
                let _ = progress_tx.send(ScanEvent::ProgressChanged(pct));
            }
        };
        let cancel = &self.cancel;
        let is_cancelled = || cancel.load(Ordering::Acquire);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            search::search(request, on_progress, is_cancelled)
        }));

        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut active = shared.active.lock();

        // `stop` sets the flag under this lock, then reports the stop itself.
        if self.cancel.load(Ordering::Acquire) {
            debug!("Scan #{} cancelled, discarding its outcome", self.id);
            return;
        }

        match outcome {
            Ok(Ok(records)) => {
                info!("Scan #{} found {} records", self.id, records.len());
                let _ = self.events.send(ScanEvent::ResultsReady(records));
            }
            Ok(Err(e)) => {
                error!("Scan #{} failed: {e}", self.id);
                let _ = self.events.send(ScanEvent::ErrorOccurred(e.to_string()));
            }
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                error!("Scan #{} panicked: {msg}", self.id);
                let _ = self
                    .events
                    .send(ScanEvent::ErrorOccurred(format!("Internal error: {msg}")));
            }
        }
        let _ = self.events.send(ScanEvent::ScanningChanged(false));

        if active.as_ref().is_some_and(|scan| scan.id == self.id) {
            // Dropping our own handle detaches this already finishing thread.
            *active = None;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "scan worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn validation_rejects_bad_inputs() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "x").unwrap();

        assert_eq!(validate_inputs(Path::new(""), "x"), Err(ValidationError::EmptyFolder));
        assert_eq!(
            validate_inputs(&file, "x"),
            Err(ValidationError::NotADirectory(file.clone()))
        );
        assert_eq!(validate_inputs(dir.path(), ""), Err(ValidationError::EmptyNeedle));
        assert_eq!(validate_inputs(dir.path(), "x"), Ok(()));
    }

    #[test]
    fn invalid_start_emits_nothing() {
        let (session, rx) = ScanSession::new();
        assert!(session.start("", "needle", "", false).is_err());
        assert!(!session.is_scanning());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let (session, rx) = ScanSession::new();
        session.stop();
        session.stop();
        assert!(!session.is_scanning());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn panic_payloads_are_readable() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "scan worker panicked");
    }
}
