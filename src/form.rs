//! Translation between [`Book`]s and the flat string fields of the edit form.

use crate::{
	book::{Book, BookId, BookPatch, Field, ReadingStatus},
	error::{Error, Result},
};
use core::iter::FromIterator;
use hashbrown::HashMap;
use tracing::{instrument, trace};

/// Submitted or pre-filled form values by control name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(HashMap<String, String>);
impl FormFields {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.0.insert(name.into(), value.into())
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(name).map(String::as_str)
	}

	#[must_use]
	pub fn field(&self, field: Field) -> Option<&str> {
		self.get(field.name())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
		self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

/// A parsed form: which book to update, if any, and the values to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
	pub id: Option<BookId>,
	pub patch: BookPatch,
}

/// The id value the form carries while creating a new book.
pub const NEW_BOOK_ID: &str = "null";

/// Parses submitted form values.
///
/// An absent or empty `id`, or [`NEW_BOOK_ID`], requests a new book.
/// Absent fields stay [`None`] on the resulting patch; unknown names are ignored.
///
/// # Errors
///
/// [`Error::Validation`] if `id`, `pageCount` or `onPage` isn't a non-negative integer
/// (an empty page field counts as `0`), or if `status` isn't one of the known labels.
#[instrument(skip(fields), fields(fields.len = fields.len()))]
pub fn to_submission(fields: &FormFields) -> Result<Submission> {
	let id = match fields.field(Field::Id).map(str::trim) {
		None | Some("") | Some(NEW_BOOK_ID) => None,
		Some(id) => Some(id.parse::<BookId>().map_err(|_| invalid(Field::Id, id))?),
	};
	let text = |field| fields.field(field).map(str::to_owned);
	let patch = BookPatch {
		title: text(Field::Title),
		page_count: fields.field(Field::PageCount).map(|value| parse_page(Field::PageCount, value)).transpose()?,
		book_type: text(Field::BookType),
		description: text(Field::Description),
		status: fields
			.field(Field::Status)
			.map(|value| value.parse::<ReadingStatus>().map_err(|()| invalid(Field::Status, value)))
			.transpose()?,
		author: text(Field::Author),
		on_page: fields.field(Field::OnPage).map(|value| parse_page(Field::OnPage, value)).transpose()?,
	};
	trace!(?id, "Parsed form submission.");
	Ok(Submission { id, patch })
}

/// Form values that pre-fill the edit form for `book`.
#[must_use]
pub fn from_book(book: &Book) -> FormFields {
	Field::ALL.iter().map(|&field| (field.name(), book.display(field))).collect()
}

fn parse_page(field: Field, value: &str) -> Result<u32> {
	match value.trim() {
		"" => Ok(0),
		trimmed => trimmed.parse().map_err(|_| invalid(field, value)),
	}
}

fn invalid(field: Field, value: &str) -> Error {
	Error::Validation { field, value: value.to_owned() }
}
