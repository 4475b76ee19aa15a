use thiserror::Error;

use crate::rules::RuleViolation;
use crate::value::AttrValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid value for \"{attribute}\": {reason} (rejected: {value})")]
    Validation {
        attribute: &'static str,
        value: AttrValue,
        reason: RuleViolation,
    },

    #[error("attribute \"{attribute}\" is not set")]
    Missing { attribute: &'static str },

    #[error("attribute \"{attribute}\" is derived and cannot be assigned")]
    ReadOnly { attribute: &'static str },

    #[error("no attribute named \"{attribute}\" in the schema")]
    Unknown { attribute: String },

    #[error("derivation of \"{attribute}\" read \"{dependency}\", which is not a declared dependency")]
    UndeclaredDependency {
        attribute: &'static str,
        dependency: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
