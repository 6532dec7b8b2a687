//! Behavioural tests for the translation endpoint using `rstest-bdd`.
//!
//! Every scenario in this binary shares one [`HarnessContext`], so at most
//! one mock backend is started per process. Set `TRANSLATOR_USE_MOCK=false`
//! and `TRANSLATOR_REAL_URL` to run the same scenarios against a deployed
//! translator.
//!
//! [`HarnessContext`]: translator_harness::HarnessContext

mod scenarios;
mod steps;
mod world;
