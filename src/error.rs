use crate::book::{BookId, Field};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	#[error("no book with id {0}")]
	NotFound(BookId),
	#[error("invalid value {value:?} for form field `{}`", .field.name())]
	Validation { field: Field, value: String },
	#[error("no edit session is open")]
	NotEditing,
	#[error("DOM operation failed: {0}")]
	Dom(String),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
