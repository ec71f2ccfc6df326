//! cgroup descriptor line parsing
//!
//! Extracts pod and container identity from a single line of
//! `/proc/<pid>/cgroup`, for example:
//!
//! ```text
//! 0::/kubelet.slice/kubelet-kubepods.slice/kubelet-kubepods-pod20da609e_6973_4463_a1f9_2db9bcc5becc.slice/cri-containerd-10ec3c89...0635.scope
//! ```
//!
//! Kubernetes encodes the pod UID with underscores in systemd slice names;
//! the parser converts them back to the canonical hyphenated form.

use regex::Regex;
use std::sync::OnceLock;

/// Substring that marks a line as belonging to the Kubernetes pod hierarchy
pub const KUBEPODS_MARKER: &str = "kubepods";

const CONTAINERD_SCOPE_PREFIX: &str = "cri-containerd-";
const SCOPE_SUFFIX: &str = ".scope";

static POD_SEGMENT: OnceLock<Regex> = OnceLock::new();

fn pod_segment_regex() -> &'static Regex {
    POD_SEGMENT.get_or_init(|| {
        Regex::new(r"pod([0-9a-fA-F_]+)(?:\.slice)?").expect("pod segment pattern is valid")
    })
}

/// Identity derived from a kubepods cgroup line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupIdentity {
    pub pod_uid: String,
    pub container_id: Option<String>,
}

/// Outcome of parsing one cgroup line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CgroupLine {
    /// Not a kubepods line, or too few fields to carry a hierarchy path
    Ignored,
    /// A kubepods line whose hierarchy path has no pod UID segment
    Unparseable,
    /// A kubepods line with a pod UID
    Pod(CgroupIdentity),
}

/// Parse a single `hierarchy-id:controllers:path` line.
pub fn parse_cgroup_line(line: &str) -> CgroupLine {
    if !line.contains(KUBEPODS_MARKER) {
        return CgroupLine::Ignored;
    }

    let Some(hierarchy) = line.split(':').nth(2) else {
        return CgroupLine::Ignored;
    };

    match identity_from_hierarchy(hierarchy) {
        Some(identity) => CgroupLine::Pod(identity),
        None => CgroupLine::Unparseable,
    }
}

/// Walk the path segments of a cgroup hierarchy. Later matching segments
/// override earlier ones.
pub fn identity_from_hierarchy(hierarchy: &str) -> Option<CgroupIdentity> {
    let mut pod_uid = None;
    let mut container_id = None;

    for segment in hierarchy.split('/') {
        if let Some(uid) = pod_uid_from_segment(segment) {
            pod_uid = Some(uid);
        }
        if let Some(id) = container_id_from_segment(segment) {
            container_id = Some(id.to_string());
        }
    }

    pod_uid
        .filter(|uid| !uid.is_empty())
        .map(|pod_uid| CgroupIdentity {
            pod_uid,
            container_id,
        })
}

fn pod_uid_from_segment(segment: &str) -> Option<String> {
    pod_segment_regex()
        .captures(segment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace('_', "-"))
}

fn container_id_from_segment(segment: &str) -> Option<&str> {
    segment
        .strip_prefix(CONTAINERD_SCOPE_PREFIX)
        .and_then(|rest| rest.strip_suffix(SCOPE_SUFFIX))
}
