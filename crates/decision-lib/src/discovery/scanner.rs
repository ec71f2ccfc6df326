//! Process table scan that maps live processes to Kubernetes pods

use super::cgroup::{parse_cgroup_line, CgroupLine};
use super::correlator::{PodCorrelator, PodMap};
use super::process::ProcessInfoReader;
use super::DEFAULT_PROC_ROOT;
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scans a procfs-style tree and groups kubepods processes by pod UID
#[derive(Debug, Clone)]
pub struct ProcessTreeScanner {
    proc_root: PathBuf,
    reader: ProcessInfoReader,
}

impl Default for ProcessTreeScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTreeScanner {
    /// Scanner over the host's `/proc`
    pub fn new() -> Self {
        Self::with_root(DEFAULT_PROC_ROOT)
    }

    /// Scanner over a custom process table root (for testing)
    pub fn with_root(proc_root: impl Into<PathBuf>) -> Self {
        let proc_root = proc_root.into();
        Self {
            reader: ProcessInfoReader::new(proc_root.clone()),
            proc_root,
        }
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    /// Run a full discovery pass.
    ///
    /// Only an unreadable root is an error; anything wrong with an
    /// individual process drops that process from the result.
    pub fn scan(&self) -> Result<PodMap> {
        let entries = fs::read_dir(&self.proc_root).map_err(|source| Error::DiscoveryRoot {
            path: self.proc_root.clone(),
            source,
        })?;

        let mut correlator = PodCorrelator::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Failed to read process table entry");
                    continue;
                }
            };

            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let Some(pid) = entry.file_name().to_str().and_then(parse_pid) else {
                continue;
            };

            self.scan_process(pid, &mut correlator);
        }

        let pods = correlator.into_pods();
        debug!(pods = pods.len(), "Process table scan complete");
        Ok(pods)
    }

    fn scan_process(&self, pid: u32, correlator: &mut PodCorrelator) {
        let cgroup_path = self.proc_root.join(pid.to_string()).join("cgroup");
        let file = match File::open(&cgroup_path) {
            Ok(file) => file,
            Err(e) => {
                warn!(pid = pid, error = %e, "Failed to open cgroup file");
                return;
            }
        };

        // Raw lines: a non-UTF-8 controller line must not hide later pod lines
        for line in BufReader::new(file).split(b'\n') {
            let line = match line {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    debug!(pid = pid, error = %e, "Stopped reading cgroup file");
                    break;
                }
            };
            debug!(pid = pid, line = %line, "cgroup line");

            match parse_cgroup_line(&line) {
                CgroupLine::Ignored => {}
                CgroupLine::Unparseable => {
                    warn!(pid = pid, line = %line, "Pod UID not found in cgroup path");
                    break;
                }
                CgroupLine::Pod(identity) => {
                    let mut process = self.reader.read(pid);
                    process.container_id = identity.container_id.unwrap_or_default();
                    correlator.add(&identity.pod_uid, process);
                }
            }
        }
    }
}

/// Only positive integers name process directories
fn parse_pid(name: &str) -> Option<u32> {
    name.parse::<u32>().ok().filter(|pid| *pid > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pid() {
        assert_eq!(parse_pid("1"), Some(1));
        assert_eq!(parse_pid("4242"), Some(4242));
        assert_eq!(parse_pid("0"), None);
        assert_eq!(parse_pid("-3"), None);
        assert_eq!(parse_pid("self"), None);
        assert_eq!(parse_pid("acpi"), None);
    }

    #[test]
    fn test_missing_root_is_discovery_error() {
        let scanner = ProcessTreeScanner::with_root("/nonexistent/proc/root");
        match scanner.scan() {
            Err(Error::DiscoveryRoot { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/proc/root"));
            }
            other => panic!("expected DiscoveryRoot error, got {other:?}"),
        }
    }
}
