//! Binds the feature files to the step registry.

use rstest_bdd_macros::scenario;

use crate::world::{TranslatorWorld, world};

#[scenario(
    path = "tests/features/translation.feature",
    name = "Translate hello to Spanish"
)]
fn translate_hello_to_spanish(world: TranslatorWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/translation.feature",
    name = "Translate hello to French"
)]
fn translate_hello_to_french(world: TranslatorWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/translation.feature",
    name = "Translate goodbye to French"
)]
fn translate_goodbye_to_french(world: TranslatorWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/translation.feature",
    name = "Follow a redirected translation"
)]
fn follow_redirected_translation(world: TranslatorWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/http_status.feature",
    name = "Known phrase succeeds"
)]
fn known_phrase_succeeds(world: TranslatorWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/http_status.feature",
    name = "Alias phrase redirects"
)]
fn alias_phrase_redirects(world: TranslatorWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/translation.feature",
    name = "The hook prepares the target without a start step"
)]
fn hook_prepares_body_checks(world: TranslatorWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/http_status.feature",
    name = "The hook prepares the target for status checks"
)]
fn hook_prepares_status_checks(world: TranslatorWorld) {
    let _ = world;
}
