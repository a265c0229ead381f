//! Shared test utilities and fixtures
//!
//! A throwaway cpufreq sysfs tree plus helpers for driving a running
//! [`WakeBoost`] under paused tokio time.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use wakeboost_engine::{
    BlankMode, BoostSettings, DisplayEvent, DisplayNotifier, PolicyNotifier, SysfsCpuFreq,
    WakeBoost,
};
use wakeboost_types::{FreqBounds, HardwareLimits};

pub const LITTLE: HardwareLimits = HardwareLimits::new(300_000, 1_800_000);
pub const BIG: HardwareLimits = HardwareLimits::new(650_000, 2_800_000);

/// Fake `/sys/devices/system/cpu`.
pub struct FakeSysfs {
    dir: TempDir,
}

impl FakeSysfs {
    /// Each core starts with scaling bounds equal to its hardware limits.
    pub fn new(online: &str, cores: &[(u32, HardwareLimits)]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("online"), format!("{online}\n")).expect("write online");

        let sysfs = Self { dir };
        for (index, limits) in cores {
            let policy = sysfs.policy_dir(*index);
            fs::create_dir_all(&policy).expect("create policy dir");
            write_khz(&policy.join("cpuinfo_min_freq"), limits.min);
            write_khz(&policy.join("cpuinfo_max_freq"), limits.max);
            write_khz(&policy.join("scaling_min_freq"), limits.min);
            write_khz(&policy.join("scaling_max_freq"), limits.max);
        }
        sysfs
    }

    /// Two little cores and two big ones, all online.
    pub fn big_little() -> Self {
        Self::new("0-3", &[(0, LITTLE), (1, LITTLE), (2, BIG), (3, BIG)])
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn backend(&self) -> Arc<SysfsCpuFreq> {
        Arc::new(SysfsCpuFreq::new(self.root()))
    }

    pub fn policy_dir(&self, core: u32) -> PathBuf {
        self.root().join(format!("cpu{core}")).join("cpufreq")
    }

    /// Scaling bounds as currently written in the tree.
    pub fn bounds(&self, core: u32) -> FreqBounds {
        let policy = self.policy_dir(core);
        FreqBounds::new(
            read_khz(&policy.join("scaling_min_freq")),
            read_khz(&policy.join("scaling_max_freq")),
        )
    }

    pub fn set_bounds(&self, core: u32, bounds: FreqBounds) {
        let policy = self.policy_dir(core);
        write_khz(&policy.join("scaling_min_freq"), bounds.min);
        write_khz(&policy.join("scaling_max_freq"), bounds.max);
    }

    pub fn set_online(&self, online: &str) {
        fs::write(self.root().join("online"), format!("{online}\n")).expect("write online");
    }
}

fn write_khz(path: &Path, khz: u32) {
    fs::write(path, format!("{khz}\n")).expect("write frequency");
}

fn read_khz(path: &Path) -> u32 {
    fs::read_to_string(path)
        .expect("read frequency")
        .trim()
        .parse()
        .expect("numeric frequency")
}

/// A started instance plus the notifiers it is registered with.
pub struct Rig {
    pub wake: WakeBoost,
    pub display: DisplayNotifier,
    pub policy: Arc<PolicyNotifier>,
}

impl Rig {
    pub fn start(sysfs: &FakeSysfs, settings: BoostSettings) -> Self {
        let policy = Arc::new(PolicyNotifier::new(sysfs.backend()));
        let display = DisplayNotifier::new();
        let wake = WakeBoost::start(settings, &policy, &display).expect("start wake boost");
        Self {
            wake,
            display,
            policy,
        }
    }

    pub fn unblank(&self) {
        self.display.notify(DisplayEvent::early(BlankMode::Unblank));
    }

    pub fn blank(&self) {
        self.display.notify(DisplayEvent::early(BlankMode::Powerdown));
    }

    /// Let woken timers queue their work, then drain the queue. Work that
    /// queues more work needs the second pass.
    pub async fn settle(&self) {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        self.wake.flush().await;
        self.wake.flush().await;
    }

    pub async fn advance_ms(&self, millis: u64) {
        tokio::time::advance(Duration::from_millis(millis)).await;
        self.settle().await;
    }
}
