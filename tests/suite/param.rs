//! The `wake_boost` parameter end to end.

use wakeboost_engine::{BoostParam, BoostSettings, BoostState, ParamError};
use wakeboost_types::{BoostDuration, FreqBounds};

use crate::common::{FakeSysfs, LITTLE, Rig};

#[tokio::test(start_paused = true)]
async fn write_boosts_for_the_written_duration() {
    let sysfs = FakeSysfs::new("0", &[(0, LITTLE)]);
    let rig = Rig::start(&sysfs, BoostSettings::default());

    rig.wake.param().set("5000\n").unwrap();
    rig.settle().await;
    assert_eq!(rig.wake.param().get(), "5000");
    assert_eq!(sysfs.bounds(0), FreqBounds::new(LITTLE.max, LITTLE.max));

    rig.advance_ms(4999).await;
    assert_eq!(rig.wake.controller().state(), BoostState::Boosted);

    rig.advance_ms(1).await;
    assert_eq!(rig.wake.controller().state(), BoostState::Idle);
    assert_eq!(sysfs.bounds(0), FreqBounds::from(LITTLE));
}

#[tokio::test(start_paused = true)]
async fn initial_value_comes_from_settings() {
    let sysfs = FakeSysfs::new("0", &[(0, LITTLE)]);
    let rig = Rig::start(
        &sysfs,
        BoostSettings {
            initial_boost: BoostDuration::from_millis(800),
            ..BoostSettings::default()
        },
    );

    assert_eq!(rig.wake.param().get(), "800");
    assert_eq!(rig.wake.controller().state(), BoostState::Idle);
}

#[tokio::test(start_paused = true)]
async fn rejected_write_touches_nothing() {
    let sysfs = FakeSysfs::new("0", &[(0, LITTLE)]);
    let rig = Rig::start(&sysfs, BoostSettings::default());

    let err = rig.wake.param().set("4294967296").unwrap_err();
    let ParamError::Invalid { name, .. } = err;
    assert_eq!(name, BoostParam::NAME);

    rig.settle().await;
    assert_eq!(rig.wake.param().get(), "0");
    assert_eq!(rig.wake.controller().state(), BoostState::Idle);
    assert_eq!(sysfs.bounds(0), FreqBounds::from(LITTLE));
}

#[tokio::test(start_paused = true)]
async fn wake_resets_written_duration() {
    let sysfs = FakeSysfs::new("0", &[(0, LITTLE)]);
    let rig = Rig::start(&sysfs, BoostSettings::default());

    rig.wake.param().set("9000").unwrap();
    rig.settle().await;
    rig.unblank();
    rig.settle().await;

    assert_eq!(rig.wake.param().get(), "2000");
}
