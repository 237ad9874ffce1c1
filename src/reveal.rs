use log::{debug, warn};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

/// Opens the platform file manager on `path`, selecting it where the
/// file manager supports that. Returns once the helper is spawned.
pub fn reveal_in_file_manager(path: &Path) -> io::Result<()> {
    if cfg!(target_os = "windows") {
        let mut select = OsString::from("/select,");
        select.push(path.as_os_str());
        spawn_detached("explorer", &[select.as_os_str()])
    } else if cfg!(target_os = "macos") {
        spawn_detached("open", &[OsStr::new("-R"), path.as_os_str()])
    } else {
        match spawn_detached("nautilus", &[OsStr::new("--select"), path.as_os_str()]) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("nautilus unavailable ({e}), opening the parent folder instead");
                let folder = path.parent().unwrap_or(path);
                spawn_detached("xdg-open", &[folder.as_os_str()])
            }
        }
    }
}

/// Spawns `program` with its stdio detached. The child is waited on from
/// a background thread.
fn spawn_detached(program: &str, args: &[&OsStr]) -> io::Result<()> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    reap(program.to_string(), child);
    Ok(())
}

fn reap(program: String, mut child: Child) -> Option<JoinHandle<Option<ExitStatus>>> {
    let spawned = thread::Builder::new()
        .name(format!("reap-{program}"))
        .spawn(move || match child.wait() {
            Ok(status) => {
                debug!("{program} exited with {status}");
                Some(status)
            }
            Err(e) => {
                debug!("Could not wait for {program}: {e}");
                None
            }
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            debug!("Could not start reaper thread: {e}");
            None
        }
    }
}
