use crate::{
	book::{Book, BookId, Field, ReadingStatus},
	repository::Repository,
	sensitive,
	surface::Surface,
};
use tracing::{instrument, trace, trace_span, warn};

/// Keeps a [`Surface`] in step with a [`Repository`], filtered by the active category.
///
/// Category switches rebuild the card list; single additions and edits patch it in place.
#[derive(Debug)]
pub struct Renderer<S: Surface> {
	surface: S,
	active_category: String,
}
impl<S: Surface> Renderer<S> {
	/// The initial active category is `""`, i.e. all books.
	#[must_use]
	pub fn new(surface: S) -> Self {
		Self {
			surface,
			active_category: String::new(),
		}
	}

	pub fn surface(&self) -> &S {
		&self.surface
	}

	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	/// `""` while all books are shown.
	#[must_use]
	pub fn active_category(&self) -> &str {
		&self.active_category
	}

	/// Whether `book_type` is visible under the active category.
	#[must_use]
	pub fn shows_category(&self, book_type: &str) -> bool {
		self.active_category.is_empty() || self.active_category == book_type
	}

	/// Patches the card for `book`, or creates it at the front of the list.
	///
	/// Returns whether the card was newly created.
	/// That is also `false` if the surface failed to create one.
	pub fn render_one(&mut self, book: &Book) -> bool {
		let span = trace_span!("render_one", id = %book.id());
		let _enter = span.enter();

		let (card, created) = match self.surface.find_card(book.id()) {
			Some(card) => (card, false),
			None => match self.surface.create_card(book.id()) {
				Some(card) => (card, true),
				None => {
					warn!("No card for book; Skipping.");
					return false;
				}
			},
		};
		self.surface.set_card_accent(&card, &status_border(book.status));
		for &field in &Field::ALL {
			self.surface.set_card_field(&card, field, &book.display(field));
		}
		if created {
			trace!("Created card.");
			self.surface.prepend_card(card);
		} else {
			trace!("Patched card.");
		}
		created
	}

	/// Rebuilds the card list from `category`'s books, newest first.
	#[instrument(skip(self, repository, category), fields(category = sensitive(category.unwrap_or_default())))]
	pub fn render_all(&mut self, repository: &Repository, category: Option<&str>) {
		self.surface.clear_cards();
		let mut count = 0_usize;
		for book in repository.books_by_category(category) {
			self.render_one(book);
			count += 1;
		}
		trace!(count, "Rendered book list.");
	}

	/// Adds a navigation entry for `name` unless one exists. Returns whether it was added.
	///
	/// The empty category gets no entry, since selecting `""` means all books.
	/// Uncategorized books are listed under all books only.
	pub fn render_category(&mut self, name: &str) -> bool {
		if name.is_empty() || self.surface.has_category(name) {
			return false;
		}
		trace!(category = sensitive(name), "Created category entry.");
		self.surface.prepend_category(name);
		true
	}

	/// Takes a book's card out of view without touching the repository.
	pub fn remove_one(&mut self, id: BookId) -> bool {
		let removed = self.surface.remove_card(id);
		if removed {
			trace!(%id, "Removed card.");
		}
		removed
	}

	/// Switches the filter to `name` and re-renders, unless it is already active.
	///
	/// Returns whether a render pass ran.
	#[instrument(skip(self, repository, name), fields(name = sensitive(name)))]
	pub fn set_active_category(&mut self, repository: &Repository, name: &str) -> bool {
		if name == self.active_category {
			trace!("Category already active.");
			return false;
		}
		self.active_category = name.to_owned();
		self.render_all(repository, Some(name));
		self.surface.set_heading(name);
		self.surface.select_category(name);
		true
	}
}

/// CSS for a card's left border in `status`'s colour.
#[must_use]
pub fn status_border(status: ReadingStatus) -> String {
	format!("5px solid var(--{}-color)", status.css_slug())
}
