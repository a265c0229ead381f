//! cpufreq backend over the Linux sysfs tree.
//!
//! Layout under the root (normally `/sys/devices/system/cpu`):
//!
//! ```text
//! online                          "0-3,6"
//! cpuN/cpufreq/cpuinfo_min_freq   kHz
//! cpuN/cpufreq/cpuinfo_max_freq   kHz
//! cpuN/cpufreq/scaling_min_freq   kHz (read/write)
//! cpuN/cpufreq/scaling_max_freq   kHz (read/write)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use wakeboost_types::{CoreId, FreqBounds, FrequencyKhz, HardwareLimits};

use crate::policy::{CpuFreqBackend, CpuFreqError};

const CPUINFO_MIN: &str = "cpuinfo_min_freq";
const CPUINFO_MAX: &str = "cpuinfo_max_freq";
const SCALING_MIN: &str = "scaling_min_freq";
const SCALING_MAX: &str = "scaling_max_freq";

/// Cpu indices from a cpu list must be below this (largest `NR_CPUS`).
const MAX_CPUS: u32 = 8192;

#[derive(Debug, Clone)]
pub struct SysfsCpuFreq {
    root: PathBuf,
}

impl SysfsCpuFreq {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn policy_dir(&self, core: CoreId) -> PathBuf {
        self.root.join(format!("cpu{}", core.index())).join("cpufreq")
    }

    fn attr(&self, core: CoreId, name: &str) -> Result<PathBuf, CpuFreqError> {
        let dir = self.policy_dir(core);
        if !dir.is_dir() {
            return Err(CpuFreqError::UnknownCore(core));
        }
        Ok(dir.join(name))
    }

    fn read_khz(&self, core: CoreId, name: &str) -> Result<FrequencyKhz, CpuFreqError> {
        let path = self.attr(core, name)?;
        let raw = read_attr(&path)?;
        raw.trim()
            .parse()
            .map_err(|_| CpuFreqError::Malformed { path, value: raw })
    }

    fn write_khz(&self, core: CoreId, name: &str, value: FrequencyKhz) -> Result<(), CpuFreqError> {
        let path = self.attr(core, name)?;
        fs::write(&path, value.to_string()).map_err(|source| CpuFreqError::Io { path, source })
    }
}

impl CpuFreqBackend for SysfsCpuFreq {
    fn online_cores(&self) -> Result<Vec<CoreId>, CpuFreqError> {
        let path = self.root.join("online");
        let raw = read_attr(&path)?;
        let cores = parse_cpu_list(&raw).ok_or(CpuFreqError::Malformed { path, value: raw })?;
        Ok(cores
            .into_iter()
            .filter(|core| self.policy_dir(*core).is_dir())
            .collect())
    }

    fn hardware_limits(&self, core: CoreId) -> Result<HardwareLimits, CpuFreqError> {
        Ok(HardwareLimits::new(
            self.read_khz(core, CPUINFO_MIN)?,
            self.read_khz(core, CPUINFO_MAX)?,
        ))
    }

    fn current_bounds(&self, core: CoreId) -> Result<FreqBounds, CpuFreqError> {
        Ok(FreqBounds::new(
            self.read_khz(core, SCALING_MIN)?,
            self.read_khz(core, SCALING_MAX)?,
        ))
    }

    fn apply_bounds(&self, core: CoreId, bounds: FreqBounds) -> Result<(), CpuFreqError> {
        let current = self.current_bounds(core)?;

        // The kernel rejects a write that would leave min above max, so when
        // the window moves up the ceiling goes first.
        let raise_max_first = bounds.min > current.max;
        if raise_max_first && bounds.max != current.max {
            self.write_khz(core, SCALING_MAX, bounds.max)?;
        }
        if bounds.min != current.min {
            self.write_khz(core, SCALING_MIN, bounds.min)?;
        }
        if !raise_max_first && bounds.max != current.max {
            self.write_khz(core, SCALING_MAX, bounds.max)?;
        }
        Ok(())
    }
}

fn read_attr(path: &Path) -> Result<String, CpuFreqError> {
    fs::read_to_string(path).map_err(|source| CpuFreqError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a kernel cpu list such as `0-3,6,8-9`.
///
/// Returns `None` on any malformed element or any index at or above
/// `MAX_CPUS`. An empty (or whitespace-only) list is valid and yields no
/// cores.
#[must_use]
pub fn parse_cpu_list(raw: &str) -> Option<Vec<CoreId>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Vec::new());
    }

    let mut cores = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        match part.split_once('-') {
            Some((start, end)) => {
                let start: u32 = start.parse().ok()?;
                let end: u32 = end.parse().ok()?;
                if start > end || end >= MAX_CPUS {
                    return None;
                }
                cores.extend((start..=end).map(CoreId::new));
            }
            None => {
                let index: u32 = part.parse().ok()?;
                if index >= MAX_CPUS {
                    return None;
                }
                cores.push(CoreId::new(index));
            }
        }
    }
    cores.sort_unstable();
    cores.dedup();
    Some(cores)
}
