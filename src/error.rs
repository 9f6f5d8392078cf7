use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: bad header, edge count mismatch, out-of-range vertex.
    #[error("parse error: {0}")]
    Parse(String),

    /// Instance contract violation. Always a bug in a rule or solver.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// The final solution does not dominate the original graph.
    #[error("verification failed: {0}")]
    Verification(String),

    /// The treewidth DP refused the instance (width or memory over budget).
    #[error("instance not solvable by this back-end")]
    UnsolvableByBackend,

    /// A deadline elapsed; the result (if any) is best-so-far.
    #[error("time budget exceeded")]
    TimeBudgetExceeded,
}

impl Error {
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::Invariant(msg.into())
    }
}
