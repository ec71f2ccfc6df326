//! Pod and process discovery from the host process table
//!
//! Each scan walks `/proc`, reads every process's cgroup descriptor and
//! groups the processes that live under the kubepods hierarchy by pod UID.
//! Nothing is cached between scans.

mod cgroup;
mod correlator;
mod process;
mod scanner;


pub use cgroup::{
    identity_from_hierarchy, parse_cgroup_line, CgroupIdentity, CgroupLine, KUBEPODS_MARKER,
};
pub use correlator::{PodCorrelator, PodMap};
pub use process::{parse_ppid, ProcessInfoReader};
pub use scanner::ProcessTreeScanner;

/// Standard procfs mount point
pub const DEFAULT_PROC_ROOT: &str = "/proc";
