//! Error taxonomy shared by every exchange component.
//!
//! Every failure is terminal for the attempted call: nothing is retried,
//! nothing is clamped, and state is unchanged when an operation returns
//! `Err`. Callers re-issue corrected calls.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmmError {
    /// Malformed arguments: identical tokens, zero amounts, mismatched
    /// array lengths, out-of-range values.
    InvalidInput(String),
    /// Pool, gauge, bribe, or token absent for the given key.
    NotFound(String),
    /// A conservation law failed: post-swap invariant decreased, the
    /// stable-curve solver did not converge, or a reentrancy lock was
    /// already held.
    InvariantViolation(String),
    /// Caller-supplied minimum output not met.
    SlippageExceeded { minimum: u128, actual: u128 },
    /// Caller-supplied deadline elapsed before execution.
    DeadlineExpired { deadline: u64, now: u64 },
    /// Pool or gauge already exists for the key. Creation never returns
    /// the existing entity; callers must look up first.
    DuplicateCreation(String),
    /// Caller lacks authority: missing allowance, or a mutation reserved
    /// to another component.
    Unauthorized(String),
}

impl std::fmt::Display for AmmError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AmmError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AmmError::NotFound(what) => write!(f, "Not found: {}", what),
            AmmError::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
            AmmError::SlippageExceeded { minimum, actual } => {
                write!(f, "Slippage exceeded: minimum {}, actual {}", minimum, actual)
            }
            AmmError::DeadlineExpired { deadline, now } => {
                write!(f, "Deadline expired: deadline {}, now {}", deadline, now)
            }
            AmmError::DuplicateCreation(what) => write!(f, "Already exists: {}", what),
            AmmError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl std::error::Error for AmmError {}
