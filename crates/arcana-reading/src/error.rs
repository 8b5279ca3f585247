//! Error taxonomy for the submission and poll protocol.
//!
//! Local failures never reach the network; server-reported failures,
//! transport failures and the recoverable poll timeout are kept apart so
//! callers can phrase the right suggestion to the user.

use thiserror::Error;

/// Failures of the reading submission and poll protocol.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadingError {
    /// A card name could not be mapped to a wire code. Raised before any
    /// network call; not retried.
    #[error("no code mapping for card: {0}")]
    UnknownCard(String),

    /// The session is not in a submittable shape (no cards drawn, empty
    /// question). Raised before any network call.
    #[error("validation error: {0}")]
    Validation(String),

    /// The service rejected the submission for lack of energy; the user
    /// can top up and retry.
    #[error("not enough energy: {0}")]
    InsufficientEnergy(String),

    /// The service no longer accepts this session's credentials; the
    /// user has to restart the app.
    #[error("session rejected: {0}")]
    InvalidSession(String),

    /// The service reported a failed reading; the message is passed
    /// through verbatim.
    #[error("reading failed: {0}")]
    Server(String),

    /// The request never reached the service or the response never
    /// arrived; a connectivity problem, not a content problem.
    #[error("network error: {0}")]
    Transport(String),

    /// The hard poll timeout elapsed while the reading was still being
    /// prepared. Recoverable: the reading id is preserved and a later
    /// call resumes polling.
    #[error("the reading is still being prepared, try again later")]
    StillPreparing,

    /// A wiring failure such as a poisoned session lock.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
