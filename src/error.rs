//! Typed errors raised by the catalogue itself. Storage, configuration and
//! terminal failures stay as `anyhow::Error` with context attached at the call
//! site; only the outcomes a caller is expected to branch on get a variant.

use thiserror::Error;

use crate::models::{BookId, MemberId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogueError {
    /// A required text field was empty after trimming whitespace.
    #[error("{0} is required.")]
    EmptyField(&'static str),

    /// A book points at a member that does not exist.
    #[error("book {book} is borrowed by unknown member {member}")]
    DanglingBorrower { book: BookId, member: MemberId },

    /// The two sides of a borrow link disagree.
    #[error("book {book} and member {member} disagree about the loan")]
    LinkMismatch { book: BookId, member: MemberId },

    /// A member lists the same book twice.
    #[error("member {member} lists book {book} more than once")]
    DuplicateLoan { book: BookId, member: MemberId },

    /// The id counter has no values left to hand out.
    #[error("no {0} ids left to assign")]
    IdsExhausted(&'static str),

    /// Two entities of the same kind share an id.
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u64 },
}

pub type CatalogueResult<T> = Result<T, CatalogueError>;
