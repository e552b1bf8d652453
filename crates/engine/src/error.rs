//! The module contains the errors the engine can throw.
//!
//! Every error is scoped to the single operation that produced it: when an
//! engine operation fails the stored group is left untouched.
//!
//! - [`InvariantViolation`] thrown when an operation would break a group
//!   invariant (e.g. removing the last member).
//! - [`InvalidReassignment`] thrown when a payer reassignment is missing or
//!   does not point to a remaining participant.
//! - [`DuplicateMember`] thrown when a member with the same name or phone
//!   already exists.
//! - [`MalformedExpense`] thrown when an expense has a non-positive amount,
//!   no participants or references unknown members.
//! - [`KeyNotFound`] thrown when a group, member or expense is not found.
//!
//!  [`InvariantViolation`]: EngineError::InvariantViolation
//!  [`InvalidReassignment`]: EngineError::InvalidReassignment
//!  [`DuplicateMember`]: EngineError::DuplicateMember
//!  [`MalformedExpense`]: EngineError::MalformedExpense
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    #[error("Invalid payer reassignment: {0}")]
    InvalidReassignment(String),
    #[error("\"{0}\" already present!")]
    DuplicateMember(String),
    #[error("Malformed expense: {0}")]
    MalformedExpense(String),
    #[error("Invalid member: {0}")]
    InvalidMember(String),
    #[error("Invalid group: {0}")]
    InvalidGroup(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invite rejected: {0}")]
    InviteRejected(String),
    #[error("Invalid invite code: {0}")]
    InvalidInvite(String),
    #[error("Invalid stored document: {0}")]
    InvalidDocument(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvariantViolation(a), Self::InvariantViolation(b)) => a == b,
            (Self::InvalidReassignment(a), Self::InvalidReassignment(b)) => a == b,
            (Self::DuplicateMember(a), Self::DuplicateMember(b)) => a == b,
            (Self::MalformedExpense(a), Self::MalformedExpense(b)) => a == b,
            (Self::InvalidMember(a), Self::InvalidMember(b)) => a == b,
            (Self::InvalidGroup(a), Self::InvalidGroup(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InviteRejected(a), Self::InviteRejected(b)) => a == b,
            (Self::InvalidInvite(a), Self::InvalidInvite(b)) => a == b,
            (Self::InvalidDocument(a), Self::InvalidDocument(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
