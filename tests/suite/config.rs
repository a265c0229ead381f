//! Config file settings flowing into a running instance.

use std::fs;

use wakeboost_config::{ConfigError, WakeBoostConfig};
use wakeboost_engine::{BoostSettings, BoostState};
use wakeboost_types::{BoostDuration, FreqBounds};

use crate::common::{BIG, FakeSysfs, Rig};

#[tokio::test(start_paused = true)]
async fn configured_wake_duration_drives_the_cycle() {
    let sysfs = FakeSysfs::new("0", &[(0, BIG)]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        format!(
            "[boost]\nwake_boost_ms = 300\ninitial_boost_ms = 10\n\n[cpufreq]\nsysfs_root = {:?}\n",
            sysfs.root().display().to_string()
        ),
    )
    .unwrap();

    let settings = WakeBoostConfig::load_from(&path).unwrap().unwrap().settings();
    assert_eq!(settings.sysfs_root, sysfs.root());
    assert_eq!(settings.initial_boost, BoostDuration::from_millis(10));

    let rig = Rig::start(
        &sysfs,
        BoostSettings {
            wake_boost: settings.wake_boost,
            initial_boost: settings.initial_boost,
        },
    );
    assert_eq!(rig.wake.param().get(), "10");

    rig.unblank();
    rig.settle().await;
    assert_eq!(rig.wake.param().get(), "300");
    assert_eq!(sysfs.bounds(0), FreqBounds::new(BIG.max, BIG.max));

    rig.advance_ms(300).await;
    assert_eq!(rig.wake.controller().state(), BoostState::Idle);
    assert_eq!(sysfs.bounds(0), FreqBounds::from(BIG));
}

#[test]
fn unreadable_duration_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[boost]\nwake_boost_ms = \"soon\"\n").unwrap();

    let err = WakeBoostConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), &path);
}
