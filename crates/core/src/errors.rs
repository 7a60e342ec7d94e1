use thiserror::Error;

use crate::negotiation::NegotiationStatus;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("invalid negotiation transition from {from:?} to {to:?}")]
    InvalidNegotiationTransition { from: NegotiationStatus, to: NegotiationStatus },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("session store failure: {0}")]
    SessionStore(String),
    #[error("generation failure: {0}")]
    Generation(String),
    #[error("retrieval failure: {0}")]
    Retrieval(String),
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("configuration failure: {0}")]
    Configuration(String),
}
