//! CAP core - On-device misalignment scoring and behavioral nudges
//!
//! Turns five daily/weekly behavioral measurements into a misalignment index and
//! a short, prioritized list of recommendations through a deterministic
//! pipeline: normalization → weighted scoring → logistic reshape → rule-based
//! nudge selection → report encoding.
//!
//! ## Modules
//!
//! - **Score engine**: measurements → 0-100 composite, verdict, per-dimension components
//! - **Nudge engine**: score result + raw context → up to three prioritized nudges
//! - **Policy**: every threshold, weight, and value constant, loadable from TOML/JSON

pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod nudge;
pub mod pipeline;
pub mod policy;
pub mod score;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::ComputeError;
pub use nudge::{generate_nudges, NudgeEngine};
pub use pipeline::{measurements_to_report, parse_measurements, AlignmentProcessor};
pub use policy::Policy;
pub use score::{compute_index, ScoreEngine};
pub use types::{
    AlignmentReport, Components, Dimension, Nudge, NudgeKind, RawMeasurements, ScoreResult,
    Verdict,
};

/// Library version embedded in all reports
pub const CAP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "cap-core";
