//! Step definitions for the translation and status features.

use anyhow::{Result, anyhow, ensure};
use rstest_bdd_macros::{given, then, when};

use crate::world::{TranslatorWorld, target_is_ready};

#[given("the translator API is running")]
fn translator_running(world: &TranslatorWorld) -> Result<()> {
    ensure!(
        !world.status_checks.is_empty() && !world.body_checks.is_empty(),
        "executors must be prepared before the first step"
    );
    ensure!(target_is_ready(), "the mock backend is not listening");
    Ok(())
}

#[when("I request translation of \"{query}\" to \"{locale}\"")]
fn request_translation(world: &TranslatorWorld, query: String, locale: String) -> Result<()> {
    let mut executor = world
        .status_checks
        .take()
        .ok_or_else(|| anyhow!("no status-check executor for this scenario"))?;
    let outcome = executor.request_translation(&query, &locale).map(|_| ());
    world.status_checks.set(executor);
    outcome?;
    Ok(())
}

#[then("the response status should be {status:u16}")]
fn response_status(world: &TranslatorWorld, status: u16) -> Result<()> {
    world
        .status_checks
        .with_ref(|executor| executor.assert_status(status))
        .ok_or_else(|| anyhow!("no status-check executor for this scenario"))??;
    Ok(())
}

#[when("I translate \"{query}\" to \"{locale}\"")]
fn translate(world: &TranslatorWorld, query: String, locale: String) -> Result<()> {
    let mut executor = world
        .body_checks
        .take()
        .ok_or_else(|| anyhow!("no body-check executor for this scenario"))?;
    let outcome = executor.translate(&query, &locale).map(|_| ());
    world.body_checks.set(executor);
    outcome?;
    Ok(())
}

#[then("the response should be \"{text}\"")]
fn response_body(world: &TranslatorWorld, text: String) -> Result<()> {
    world
        .body_checks
        .with_ref(|executor| executor.assert_body(&text))
        .ok_or_else(|| anyhow!("no body-check executor for this scenario"))??;
    Ok(())
}
