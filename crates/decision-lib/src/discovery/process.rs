//! Best-effort per-process reads from the process table

use crate::models::PodProcess;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads `comm` and `stat` for a single PID under a process table root
#[derive(Debug, Clone)]
pub struct ProcessInfoReader {
    proc_root: PathBuf,
}

impl ProcessInfoReader {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    /// Build a `PodProcess` for `pid`. Never fails: a process that exited
    /// mid-scan yields an empty command and a zero PPID.
    pub fn read(&self, pid: u32) -> PodProcess {
        let pid_dir = self.proc_root.join(pid.to_string());

        PodProcess {
            pid,
            ppid: read_ppid(&pid_dir).unwrap_or(0),
            command: read_command(&pid_dir).unwrap_or_default(),
            container_id: String::new(),
        }
    }
}

fn read_command(pid_dir: &Path) -> Option<String> {
    let path = pid_dir.join("comm");
    match fs::read_to_string(&path) {
        Ok(content) => Some(content.trim().to_string()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Unable to read process name");
            None
        }
    }
}

fn read_ppid(pid_dir: &Path) -> Option<u32> {
    let path = pid_dir.join("stat");
    let content = fs::read_to_string(&path)
        .map_err(|e| debug!(path = %path.display(), error = %e, "Unable to read process stat"))
        .ok()?;
    parse_ppid(&content)
}

/// Parse the parent PID: the fourth whitespace-separated field of `stat`
pub fn parse_ppid(stat: &str) -> Option<u32> {
    stat.split_whitespace().nth(3)?.parse().ok()
}
