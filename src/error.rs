/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::error;
use std::fmt;

/// Errors the core distinguishes (see the error handling design).
///
/// `NoAdmissibleSplit` is deliberately absent here: a routine "no split"
/// outcome is represented by `None`/the Missing sentinel, not by an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A programmer error: bad arguments, broken invariants, unknown
    /// identifiers. Carries the name of the failing operation and a
    /// message identifying the offending value.
    PreconditionViolation {
        operation: &'static str,
        detail: String,
    },
}

impl Error {
    pub fn precondition(operation: &'static str, detail: impl Into<String>) -> Error {
        Error::PreconditionViolation {
            operation,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::PreconditionViolation { operation, detail } => {
                write!(f, "precondition violated in `{}`: {}", operation, detail)
            }
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
