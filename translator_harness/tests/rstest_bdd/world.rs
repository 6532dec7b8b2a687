//! Scenario state and the process-wide harness context.

use std::sync::LazyLock;

use parking_lot::Mutex;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use translator_harness::mock::MockServerHandle;
use translator_harness::{BodyCheckExecutor, HarnessContext, MockError, StatusCheckExecutor};

static HARNESS: LazyLock<Mutex<HarnessContext>> =
    LazyLock::new(|| Mutex::new(HarnessContext::from_environment()));

/// Per-scenario executors. A fresh state is built for every scenario, so
/// captured responses never leak between scenarios.
#[derive(Debug, Default, ScenarioState)]
pub struct TranslatorWorld {
    pub status_checks: Slot<StatusCheckExecutor>,
    pub body_checks: Slot<BodyCheckExecutor>,
}

/// Runs the pre-scenario hook on the shared context, then prepares fresh
/// executors aimed at the resolved base address.
#[fixture]
#[expect(
    clippy::expect_used,
    reason = "a mock backend that cannot start aborts the run"
)]
pub fn world() -> TranslatorWorld {
    let harness = before_scenario().expect("mock backend failed to start");
    let world = TranslatorWorld::default();
    world.status_checks.set(harness.status_checks());
    world.body_checks.set(harness.body_checks());
    world
}

fn before_scenario() -> Result<parking_lot::MutexGuard<'static, HarnessContext>, MockError> {
    let mut harness = HARNESS.lock();
    harness.before_scenario()?;
    Ok(harness)
}

/// Whether the target selected for this run can be reached: the mock
/// backend must be listening when mocking is enabled.
pub fn target_is_ready() -> bool {
    let harness = HARNESS.lock();
    if !harness.configuration().mock_enabled() {
        return true;
    }
    harness
        .mock()
        .server()
        .is_some_and(MockServerHandle::is_listening)
}

