//! The tracked record and its typed partial update.

use core::{fmt, str::FromStr};

/// Opaque book identifier, assigned by [`Repository::add`](`crate::repository::Repository::add`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(u64);
impl BookId {
	pub(crate) fn from_raw(raw: u64) -> Self {
		Self(raw)
	}
}
impl fmt::Display for BookId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}
impl FromStr for BookId {
	type Err = core::num::ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.trim().parse().map(Self)
	}
}

/// Reading state, spelled the way the form's option list spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadingStatus {
	ToRead,
	Reading,
	Read,
}
impl ReadingStatus {
	pub const ALL: [Self; 3] = [Self::ToRead, Self::Reading, Self::Read];

	#[must_use]
	pub fn label(self) -> &'static str {
		match self {
			Self::ToRead => "To Read",
			Self::Reading => "Reading",
			Self::Read => "Read",
		}
	}

	/// Name fragment of the CSS custom property carrying this status's colour.
	#[must_use]
	pub fn css_slug(self) -> &'static str {
		match self {
			Self::ToRead => "to-read",
			Self::Reading => "reading",
			Self::Read => "read",
		}
	}
}
impl Default for ReadingStatus {
	fn default() -> Self {
		Self::ToRead
	}
}
impl fmt::Display for ReadingStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}
impl FromStr for ReadingStatus {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL.iter().copied().find(|status| status.label() == s).ok_or(())
	}
}

/// The form fields a book is edited through, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
	Id,
	Title,
	PageCount,
	BookType,
	Description,
	Status,
	Author,
	OnPage,
}
impl Field {
	pub const ALL: [Self; 8] = [Self::Id, Self::Title, Self::PageCount, Self::BookType, Self::Description, Self::Status, Self::Author, Self::OnPage];

	/// The control name, which is also the `data-for` marker on rendered cards.
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::Id => "id",
			Self::Title => "title",
			Self::PageCount => "pageCount",
			Self::BookType => "bookType",
			Self::Description => "description",
			Self::Status => "status",
			Self::Author => "author",
			Self::OnPage => "onPage",
		}
	}

	#[must_use]
	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.iter().copied().find(|field| field.name() == name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
	id: BookId,
	pub title: String,
	pub page_count: u32,
	pub book_type: String,
	pub description: String,
	pub status: ReadingStatus,
	pub author: String,
	pub on_page: u32,
}
impl Book {
	pub(crate) fn new(id: BookId, patch: BookPatch) -> Self {
		let mut book = Self {
			id,
			title: String::new(),
			page_count: 0,
			book_type: String::new(),
			description: String::new(),
			status: ReadingStatus::default(),
			author: String::new(),
			on_page: 0,
		};
		book.apply(patch);
		book
	}

	#[must_use]
	pub fn id(&self) -> BookId {
		self.id
	}

	/// Overwrites every field present on `patch`, then restores the finished-reading invariant.
	pub(crate) fn apply(&mut self, patch: BookPatch) {
		let BookPatch {
			title,
			page_count,
			book_type,
			description,
			status,
			author,
			on_page,
		} = patch;
		if let Some(title) = title {
			self.title = title
		}
		if let Some(page_count) = page_count {
			self.page_count = page_count
		}
		if let Some(book_type) = book_type {
			self.book_type = book_type
		}
		if let Some(description) = description {
			self.description = description
		}
		if let Some(status) = status {
			self.status = status
		}
		if let Some(author) = author {
			self.author = author
		}
		if let Some(on_page) = on_page {
			self.on_page = on_page
		}
		self.normalize();
	}

	fn normalize(&mut self) {
		if self.status == ReadingStatus::Read {
			self.on_page = self.page_count;
		}
	}

	/// Display text of `field`, as written into the card's `data-for` elements.
	#[must_use]
	pub fn display(&self, field: Field) -> String {
		match field {
			Field::Id => self.id.to_string(),
			Field::Title => self.title.clone(),
			Field::PageCount => self.page_count.to_string(),
			Field::BookType => self.book_type.clone(),
			Field::Description => self.description.clone(),
			Field::Status => self.status.label().to_owned(),
			Field::Author => self.author.clone(),
			Field::OnPage => self.on_page.to_string(),
		}
	}
}

/// Every editable [`Book`] field as an [`Option`]. [`None`] leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
	pub title: Option<String>,
	pub page_count: Option<u32>,
	pub book_type: Option<String>,
	pub description: Option<String>,
	pub status: Option<ReadingStatus>,
	pub author: Option<String>,
	pub on_page: Option<u32>,
}
impl BookPatch {
	/// Applies the finished-reading rule to the patch itself, for callers that want to see the forced page.
	pub fn finish_if_read(&mut self) {
		if self.status == Some(ReadingStatus::Read) {
			if let Some(page_count) = self.page_count {
				self.on_page = Some(page_count);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn book(patch: BookPatch) -> Book {
		Book::new(BookId::from_raw(1), patch)
	}

	#[test]
	fn missing_fields_take_defaults() {
		let book = book(BookPatch {
			title: Some("Dune".to_owned()),
			..BookPatch::default()
		});
		assert_eq!(book.title, "Dune");
		assert_eq!(book.page_count, 0);
		assert_eq!(book.status, ReadingStatus::ToRead);
		assert_eq!(book.book_type, "");
	}

	#[test]
	fn read_forces_on_page() {
		let mut book = book(BookPatch {
			page_count: Some(100),
			on_page: Some(5),
			status: Some(ReadingStatus::Reading),
			..BookPatch::default()
		});
		assert_eq!(book.on_page, 5);

		book.apply(BookPatch {
			status: Some(ReadingStatus::Read),
			on_page: Some(7),
			..BookPatch::default()
		});
		assert_eq!(book.on_page, 100);

		book.apply(BookPatch {
			page_count: Some(120),
			..BookPatch::default()
		});
		assert_eq!(book.on_page, 120);
	}

	#[test]
	fn status_labels() {
		for status in ReadingStatus::ALL.iter().copied() {
			assert_eq!(status.label().parse(), Ok(status));
		}
		assert_eq!("read".parse::<ReadingStatus>(), Err(()));
		assert_eq!(ReadingStatus::ToRead.css_slug(), "to-read");
	}

	#[test]
	fn field_names() {
		assert_eq!(Field::from_name("pageCount"), Some(Field::PageCount));
		assert_eq!(Field::from_name("page_count"), None);
		assert_eq!(Field::ALL.iter().map(|f| f.name()).collect::<Vec<_>>(), ["id", "title", "pageCount", "bookType", "description", "status", "author", "onPage"]);
	}

	#[test]
	fn finish_if_read_needs_page_count() {
		let mut patch = BookPatch {
			status: Some(ReadingStatus::Read),
			on_page: Some(3),
			..BookPatch::default()
		};
		patch.finish_if_read();
		assert_eq!(patch.on_page, Some(3));

		patch.page_count = Some(50);
		patch.finish_if_read();
		assert_eq!(patch.on_page, Some(50));
	}
}
