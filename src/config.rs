//! Engine configuration.
//!
//! [`Config`] collects the few knobs that the branch engine, the path-constraint
//! tracer and the encoders read. All fields are public so callers can start
//! from a preset and adjust what they need.

/// Configuration shared by the loop engine, the tracer and the encoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of iterations a loop built with [`crate::branch::Loop::from_config`] may unwind
    pub unwind_bound: usize,

    /// SMT-LIB logic emitted at the top of every [`crate::smt::Script`]
    pub logic: String,

    /// Record path constraints when symbolic booleans drive control flow
    pub record_path_constraints: bool,

    /// Every event clock is asserted to be strictly greater than this value
    pub clock_lower_bound: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unwind_bound: 1,
            logic: "ALL".to_string(),
            record_path_constraints: true,
            clock_lower_bound: 0,
        }
    }
}

impl Config {
    /// Creates a configuration that skips path-constraint recording.
    ///
    /// Useful when only the final joined expressions or the concurrency
    /// encoding are of interest.
    ///
    /// # Returns
    ///
    /// A [`Config`] with recording disabled and all other fields at their defaults.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            record_path_constraints: false,
            ..Self::default()
        }
    }

    /// Creates a configuration with a custom unwinding bound.
    #[must_use]
    pub fn with_unwind_bound(bound: usize) -> Self {
        Self {
            unwind_bound: bound,
            ..Self::default()
        }
    }
}
