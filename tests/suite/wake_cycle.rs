//! Full wake cycles against a sysfs tree.

use wakeboost_engine::{BoostSettings, BoostState, CoreId};
use wakeboost_types::FreqBounds;

use crate::common::{BIG, FakeSysfs, LITTLE, Rig};

#[tokio::test(start_paused = true)]
async fn wake_pins_each_cluster_to_its_own_ceiling() {
    let sysfs = FakeSysfs::big_little();
    let rig = Rig::start(&sysfs, BoostSettings::default());

    rig.unblank();
    rig.settle().await;

    assert_eq!(rig.wake.controller().state(), BoostState::Boosted);
    for core in [0, 1] {
        assert_eq!(sysfs.bounds(core), FreqBounds::new(LITTLE.max, LITTLE.max));
    }
    for core in [2, 3] {
        assert_eq!(sysfs.bounds(core), FreqBounds::new(BIG.max, BIG.max));
    }

    rig.advance_ms(1999).await;
    assert_eq!(sysfs.bounds(2), FreqBounds::new(BIG.max, BIG.max));

    rig.advance_ms(1).await;
    assert_eq!(rig.wake.controller().state(), BoostState::Idle);
    for core in [0, 1] {
        assert_eq!(sysfs.bounds(core), FreqBounds::from(LITTLE));
    }
    for core in [2, 3] {
        assert_eq!(sysfs.bounds(core), FreqBounds::from(BIG));
    }
}

#[tokio::test(start_paused = true)]
async fn user_ceiling_is_restored_after_release() {
    let sysfs = FakeSysfs::big_little();
    let capped = FreqBounds::new(BIG.min, 2_000_000);
    sysfs.set_bounds(3, capped);
    let rig = Rig::start(&sysfs, BoostSettings::default());

    rig.unblank();
    rig.settle().await;
    // Boosting lifts a lower user ceiling along with the floor.
    assert_eq!(sysfs.bounds(3), FreqBounds::new(BIG.max, BIG.max));

    rig.advance_ms(2000).await;
    assert_eq!(sysfs.bounds(3), capped);
}

#[tokio::test(start_paused = true)]
async fn display_off_restores_bounds_early() {
    let sysfs = FakeSysfs::big_little();
    let rig = Rig::start(&sysfs, BoostSettings::default());

    rig.unblank();
    rig.settle().await;
    rig.advance_ms(250).await;

    rig.blank();
    rig.settle().await;
    assert_eq!(rig.wake.controller().state(), BoostState::Idle);
    assert!(!rig.wake.controller().unboost_pending());
    assert_eq!(sysfs.bounds(0), FreqBounds::from(LITTLE));
    assert_eq!(sysfs.bounds(2), FreqBounds::from(BIG));
}

#[tokio::test(start_paused = true)]
async fn offline_cores_are_left_alone() {
    let sysfs = FakeSysfs::big_little();
    sysfs.set_online("0-1");
    let rig = Rig::start(&sysfs, BoostSettings::default());

    rig.unblank();
    rig.settle().await;

    assert_eq!(sysfs.bounds(0), FreqBounds::new(LITTLE.max, LITTLE.max));
    assert_eq!(sysfs.bounds(2), FreqBounds::from(BIG));
}

#[tokio::test(start_paused = true)]
async fn core_coming_online_mid_boost_is_boosted_on_evaluation() {
    let sysfs = FakeSysfs::big_little();
    sysfs.set_online("0-1");
    let rig = Rig::start(&sysfs, BoostSettings::default());

    rig.unblank();
    rig.settle().await;

    sysfs.set_online("0-3");
    rig.policy.update_policy(CoreId::new(2)).unwrap();
    assert_eq!(sysfs.bounds(2), FreqBounds::new(BIG.max, BIG.max));
}

#[tokio::test(start_paused = true)]
async fn missing_policy_directory_does_not_stop_other_cores() {
    // cpu4 is listed online but has no cpufreq policy.
    let sysfs = FakeSysfs::new("0,4", &[(0, LITTLE)]);
    let rig = Rig::start(&sysfs, BoostSettings::default());

    rig.unblank();
    rig.settle().await;

    assert_eq!(rig.wake.controller().state(), BoostState::Boosted);
    assert_eq!(sysfs.bounds(0), FreqBounds::new(LITTLE.max, LITTLE.max));
}

#[tokio::test(start_paused = true)]
async fn display_off_before_boost_runs_restores_bounds() {
    let sysfs = FakeSysfs::big_little();
    let rig = Rig::start(&sysfs, BoostSettings::default());

    rig.unblank();
    rig.blank();
    rig.settle().await;

    assert_eq!(rig.wake.controller().state(), BoostState::Idle);
    assert!(!rig.wake.controller().unboost_pending());
    assert_eq!(sysfs.bounds(0), FreqBounds::from(LITTLE));
    assert_eq!(sysfs.bounds(3), FreqBounds::from(BIG));
}
