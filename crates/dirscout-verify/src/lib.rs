pub mod diagnostics;
pub mod error;
pub mod reachability;
pub mod stage;

pub use diagnostics::{
    diagnose, preflight, DiagnosticReport, NetworkDiagnostics, Preflight, PreflightStatus,
};
pub use error::VerifyError;
pub use reachability::{ReachabilityChecker, FAILURE_PHRASES};
pub use stage::{CsvVerificationSink, VerificationOutcome, VerificationSink, VerificationStage};
