//! pagescribe: a page-interaction recorder paired with multi-framework E2E
//! test-script generation.
//!
//! The recorder consumes DOM and network events from a host bridge and
//! maintains an ordered log of semantic steps; the generators turn that log
//! (or a list of pre-resolved form actions) into Playwright, Cypress or
//! Selenium test source. Field detection, value resolution and persistence
//! are collaborator responsibilities and stay outside this crate.

pub mod dom;
pub mod error;
pub mod generators;
pub mod label;
pub mod models;
pub mod recording;
pub mod selector;

pub use error::RecorderError;
pub use generators::{generator_for, GenerateOptions, ScriptGenerator, TargetFramework};
pub use label::LabelResolver;
pub use recording::{ManualClock, PageNetwork, Recorder, StepEdit, SystemClock};
pub use selector::SelectorResolver;
