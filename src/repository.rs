use crate::{
	book::{Book, BookId, BookPatch},
	error::{Error, Result},
	sensitive,
};
use core::{iter::FusedIterator, slice};
use hashbrown::HashSet;
use tracing::{instrument, trace, warn};

/// In-memory owner of all books and of the categories they have introduced.
///
/// Categories are never garbage-collected: once a category name has been seen,
/// it stays listed even after no book refers to it anymore.
#[derive(Debug, Default)]
pub struct Repository {
	books: Vec<Book>,
	categories: Vec<String>,
	category_set: HashSet<String>,
	next_id: u64,
}
impl Repository {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores a new book built from `patch`, with defaults for absent fields.
	#[instrument(skip(self, patch))]
	pub fn add(&mut self, patch: BookPatch) -> &Book {
		self.next_id += 1;
		let book = Book::new(BookId::from_raw(self.next_id), patch);
		trace!(id = %book.id(), title = sensitive(&book.title), "Added book.");
		self.register_category(&book.book_type);
		self.books.push(book);
		let book = self.books.len() - 1;
		&self.books[book]
	}

	/// Overwrites the fields present on `patch` onto the book with `id`.
	///
	/// # Errors
	///
	/// [`Error::NotFound`] iff no book with `id` exists. The repository is unchanged in that case.
	#[instrument(skip(self, patch))]
	pub fn update(&mut self, id: BookId, patch: BookPatch) -> Result<&Book> {
		let index = match self.index_of(id) {
			Some(index) => index,
			None => {
				warn!(%id, "Update target not found.");
				return Err(Error::NotFound(id));
			}
		};
		self.books[index].apply(patch);
		let book_type = self.books[index].book_type.clone();
		self.register_category(&book_type);
		trace!(%id, "Updated book.");
		Ok(&self.books[index])
	}

	#[instrument(skip(self))]
	pub fn remove(&mut self, id: BookId) -> Option<Book> {
		let index = self.index_of(id)?;
		trace!(%id, "Removed book.");
		Some(self.books.remove(index))
	}

	/// Returns whether `name` was previously unknown.
	pub fn register_category(&mut self, name: &str) -> bool {
		if self.category_set.contains(name) {
			return false;
		}
		trace!(category = sensitive(name), "Registered category.");
		self.category_set.insert(name.to_owned());
		self.categories.push(name.to_owned());
		true
	}

	#[must_use]
	pub fn contains_category(&self, name: &str) -> bool {
		self.category_set.contains(name)
	}

	/// Known categories, oldest first.
	pub fn categories(&self) -> impl ExactSizeIterator<Item = &str> + Clone + '_ {
		self.categories.iter().map(String::as_str)
	}

	/// Books whose category is exactly `name`, oldest first.
	///
	/// [`None`] and `Some("")` select every book.
	#[must_use]
	pub fn books_by_category<'a>(&'a self, name: Option<&'a str>) -> BooksByCategory<'a> {
		BooksByCategory {
			books: self.books.iter(),
			category: name.filter(|name| !name.is_empty()),
		}
	}

	#[must_use]
	pub fn get(&self, id: BookId) -> Option<&Book> {
		self.books.iter().find(|book| book.id() == id)
	}

	pub fn iter(&self) -> slice::Iter<'_, Book> {
		self.books.iter()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.books.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.books.is_empty()
	}

	fn index_of(&self, id: BookId) -> Option<usize> {
		self.books.iter().position(|book| book.id() == id)
	}
}

/// See [`Repository::books_by_category`]. Clone it to restart the query.
#[derive(Debug, Clone)]
pub struct BooksByCategory<'a> {
	books: slice::Iter<'a, Book>,
	category: Option<&'a str>,
}
impl<'a> Iterator for BooksByCategory<'a> {
	type Item = &'a Book;

	fn next(&mut self) -> Option<Self::Item> {
		let category = self.category;
		self.books.find(|book| category.map_or(true, |category| book.book_type == category))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		match self.category {
			Some(_) => (0, self.books.size_hint().1),
			None => self.books.size_hint(),
		}
	}
}
impl FusedIterator for BooksByCategory<'_> {}
