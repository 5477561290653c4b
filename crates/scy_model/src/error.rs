//! The verifier's own error and bound types (component N/O error surface).

use std::fmt;

/// Which counted resource a search hit the limit of.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Bound {
    ProofDepth,
    TraceLength,
    Runs,
    Attacks,
    IntruderActions,
    TimeLimit,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bound::ProofDepth => "proof depth",
            Bound::TraceLength => "trace length",
            Bound::Runs => "run count",
            Bound::Attacks => "attack count",
            Bound::IntruderActions => "intruder action count",
            Bound::TimeLimit => "time limit",
        };
        write!(f, "{}", name)
    }
}

/// Everything that can go wrong building or running a verification.
#[derive(Clone, Debug)]
pub enum VerifierError {
    /// A malformed protocol description, as reported by the parser collaborator
    /// or caught during model construction (undeclared role, duplicate label, ...).
    BadSpec { message: String, line: Option<u32> },
    /// A configured bound was exceeded during search.
    BoundExceeded(Bound),
    /// An invariant the search relies on was violated; always a defect, never
    /// user-triggerable by a well-formed protocol description.
    Internal(String),
}

impl fmt::Display for VerifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifierError::BadSpec { message, line: Some(line) } => {
                write!(f, "{} (line {})", message, line)
            }
            VerifierError::BadSpec { message, line: None } => write!(f, "{}", message),
            VerifierError::BoundExceeded(bound) => write!(f, "exceeded {}", bound),
            VerifierError::Internal(message) => write!(f, "internal error: {}", message),
        }
    }
}

impl std::error::Error for VerifierError {}

pub type Result<T> = std::result::Result<T, VerifierError>;
