//! Target resolution and lane expansion

use std::fmt;
use std::sync::Arc;

use crate::config::LoadConfig;
use crate::error::{LoadError, Result};

/// Resolve the configured URLs into fully-qualified targets
///
/// With an empty hostname the entries are returned verbatim and must already
/// be absolute. Otherwise each entry is appended to `protocol://hostname`
/// without inserting separators, so paths are expected to start with `/`.
pub fn resolve_targets(config: &LoadConfig) -> Vec<String> {
    if config.hostname.is_empty() {
        return config.urls.clone();
    }

    config
        .urls
        .iter()
        .map(|path| format!("{}://{}{}", config.protocol, config.hostname, path))
        .collect()
}

/// One periodic request loop against one target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerLane {
    /// Fully-qualified URL
    pub target: Arc<str>,

    /// Index within the target's lanes, `0..requests_per_second`
    pub lane_index: usize,
}

impl WorkerLane {
    /// Create a lane
    pub fn new(target: impl Into<Arc<str>>, lane_index: usize) -> Self {
        Self {
            target: target.into(),
            lane_index,
        }
    }
}

impl fmt::Display for WorkerLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.target, self.lane_index)
    }
}

/// Expand targets into `targets.len() * lanes_per_target` lanes, target-major
///
/// Fails with [`LoadError::TooManyLanes`] when the plan overflows or cannot
/// be allocated.
pub fn expand_lanes(targets: &[String], lanes_per_target: usize) -> Result<Vec<WorkerLane>> {
    let too_many = || LoadError::TooManyLanes {
        targets: targets.len(),
        lanes_per_target,
    };
    let total = targets.len().checked_mul(lanes_per_target).ok_or_else(too_many)?;

    let mut lanes = Vec::new();
    lanes.try_reserve_exact(total).map_err(|_| too_many())?;
    for target in targets {
        let target: Arc<str> = Arc::from(target.as_str());
        for lane_index in 0..lanes_per_target {
            lanes.push(WorkerLane::new(Arc::clone(&target), lane_index));
        }
    }
    Ok(lanes)
}
