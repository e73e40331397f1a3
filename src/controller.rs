use crate::{
	book::{BookId, Field},
	error::{Error, Result},
	form::{self, FormFields, NEW_BOOK_ID},
	render::Renderer,
	repository::Repository,
	sensitive,
	surface::Surface,
};
use tracing::{instrument, trace, warn};

/// An open edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
	/// [`None`] while creating a new book.
	pub target: Option<BookId>,
	/// Modal heading.
	pub title: String,
	/// Pre-filled values. Only the new-book id placeholder for a new book.
	pub fields: FormFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState<'a> {
	Idle,
	Editing(&'a EditSession),
}

/// Turns user actions into [`Repository`] mutations and [`Renderer`] updates.
#[derive(Debug)]
pub struct Controller<S: Surface> {
	repository: Repository,
	renderer: Renderer<S>,
	session: Option<EditSession>,
}
impl<S: Surface> Controller<S> {
	#[must_use]
	pub fn new(repository: Repository, renderer: Renderer<S>) -> Self {
		Self {
			repository,
			renderer,
			session: None,
		}
	}

	pub fn repository(&self) -> &Repository {
		&self.repository
	}

	pub fn renderer(&self) -> &Renderer<S> {
		&self.renderer
	}

	#[must_use]
	pub fn state(&self) -> ControllerState<'_> {
		match &self.session {
			Some(session) => ControllerState::Editing(session),
			None => ControllerState::Idle,
		}
	}

	/// Opens a blank form for a new book.
	#[instrument(skip(self))]
	pub fn begin_create(&mut self) -> &EditSession {
		self.open(EditSession {
			target: None,
			title: "New Book".to_owned(),
			fields: Some((Field::Id.name(), NEW_BOOK_ID)).into_iter().collect(),
		})
	}

	/// Opens the form pre-filled with book `id`.
	///
	/// # Errors
	///
	/// [`Error::NotFound`] iff there is no such book. The state is left as it was.
	#[instrument(skip(self))]
	pub fn begin_update(&mut self, id: BookId) -> Result<&EditSession> {
		let book = self.repository.get(id).ok_or(Error::NotFound(id))?;
		let session = EditSession {
			target: Some(id),
			title: format!("Update: {}", book.title),
			fields: form::from_book(book),
		};
		Ok(self.open(session))
	}

	/// Closes the form and discards its contents.
	#[instrument(skip(self))]
	pub fn cancel(&mut self) {
		if self.session.take().is_some() {
			trace!("Edit discarded.");
		}
	}

	/// Applies submitted form values and updates the view.
	///
	/// The open session decides whether a book is created or updated.
	/// A submitted `id` is ignored while creating and must match the session's book while updating.
	///
	/// # Errors
	///
	/// - [`Error::NotEditing`] if no form is open,
	/// - [`Error::Validation`] if the fields don't parse or name a different book than the session,
	/// - [`Error::NotFound`] if the session's book was removed meanwhile.
	///
	/// The form stays open on error.
	#[instrument(skip(self, fields))]
	pub fn submit(&mut self, fields: &FormFields) -> Result<BookId> {
		let target = match &self.session {
			Some(session) => session.target,
			None => {
				warn!("Submit without an open form.");
				return Err(Error::NotEditing);
			}
		};

		let mut submission = form::to_submission(fields)?;
		submission.patch.finish_if_read();
		let id = match (target, submission.id) {
			(Some(target), Some(submitted)) if submitted != target => {
				warn!(%target, %submitted, "Submitted id doesn't match the edited book.");
				return Err(Error::Validation {
					field: Field::Id,
					value: submitted.to_string(),
				});
			}
			(Some(target), _) => self.repository.update(target, submission.patch)?.id(),
			(None, submitted) => {
				if let Some(submitted) = submitted {
					trace!(%submitted, "Ignoring submitted id for a new book.");
				}
				self.repository.add(submission.patch).id()
			}
		};

		let book = self.repository.get(id).ok_or(Error::NotFound(id))?;
		if self.renderer.shows_category(&book.book_type) {
			self.renderer.render_one(book);
		} else {
			self.renderer.remove_one(id);
		}
		self.renderer.render_category(&book.book_type);

		trace!(%id, category = sensitive(&book.book_type), "Submitted.");
		self.session = None;
		Ok(id)
	}

	/// Shows only `name`'s books. Returns whether the view was rebuilt.
	pub fn select_category(&mut self, name: &str) -> bool {
		self.renderer.set_active_category(&self.repository, name)
	}

	/// Shows all books again.
	pub fn select_all(&mut self) -> bool {
		self.renderer.set_active_category(&self.repository, "")
	}

	fn open(&mut self, session: EditSession) -> &EditSession {
		self.session.insert(session)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		book::ReadingStatus,
		surface::MemorySurface,
	};

	fn controller() -> Controller<MemorySurface> {
		Controller::new(Repository::new(), Renderer::new(MemorySurface::new()))
	}

	fn fields(pairs: &[(&str, &str)]) -> FormFields {
		pairs.iter().copied().collect()
	}

	fn add(controller: &mut Controller<MemorySurface>, pairs: &[(&str, &str)]) -> BookId {
		controller.begin_create();
		controller.submit(&fields(pairs)).unwrap()
	}

	fn visible_titles(controller: &Controller<MemorySurface>) -> Vec<&str> {
		controller.renderer().surface().cards().iter().map(|card| card.field(Field::Title).unwrap()).collect()
	}

	#[test]
	fn dune_end_to_end() {
		let mut controller = controller();
		let session = controller.begin_create();
		assert_eq!(session.title, "New Book");
		assert_eq!(session.target, None);

		let id = controller
			.submit(&fields(&[
				("id", "null"),
				("title", "Dune"),
				("pageCount", "412"),
				("bookType", "Sci-Fi"),
				("description", ""),
				("status", "To Read"),
				("author", "Herbert"),
				("onPage", "0"),
			]))
			.unwrap();
		assert_eq!(controller.state(), ControllerState::Idle);
		assert_eq!(controller.repository().categories().collect::<Vec<_>>(), ["Sci-Fi"]);
		assert_eq!(controller.renderer().surface().categories()[0].name, "Sci-Fi");

		assert!(controller.select_category("Sci-Fi"));
		assert_eq!(visible_titles(&controller), ["Dune"]);

		let session = controller.begin_update(id).unwrap();
		assert_eq!(session.title, "Update: Dune");
		let mut form = session.fields.clone();
		form.insert("status", "Read");
		assert_eq!(controller.submit(&form), Ok(id));

		let card = controller.renderer().surface().card(id).unwrap();
		assert_eq!(card.field(Field::OnPage), Some("412"));
		assert_eq!(card.field(Field::Status), Some("Read"));
		assert_eq!(controller.renderer().surface().cards().len(), 1);
	}

	#[test]
	fn other_category_is_pulled_from_view_only() {
		let mut controller = controller();
		let dune = add(&mut controller, &[("title", "Dune"), ("bookType", "Sci-Fi")]);
		controller.select_category("Sci-Fi");

		let dune_id = dune.to_string();
		controller.begin_update(dune).unwrap();
		controller.submit(&fields(&[("id", dune_id.as_str()), ("bookType", "Classics")])).unwrap();
		assert!(visible_titles(&controller).is_empty());
		assert_eq!(controller.repository().get(dune).unwrap().book_type, "Classics");

		controller.select_category("Classics");
		assert_eq!(visible_titles(&controller), ["Dune"]);
	}

	#[test]
	fn new_book_outside_filter_stays_hidden() {
		let mut controller = controller();
		add(&mut controller, &[("title", "Dune"), ("bookType", "Sci-Fi")]);
		controller.select_category("Sci-Fi");
		add(&mut controller, &[("title", "Emma"), ("bookType", "Fiction")]);
		assert_eq!(visible_titles(&controller), ["Dune"]);
		assert_eq!(controller.repository().len(), 2);

		let names = controller.renderer().surface().categories().iter().map(|category| category.name.as_str()).collect::<Vec<_>>();
		assert_eq!(names, ["Fiction", "Sci-Fi"]);

		assert!(controller.select_all());
		assert_eq!(visible_titles(&controller), ["Emma", "Dune"]);
	}

	#[test]
	fn all_books_shown_without_filter() {
		let mut controller = controller();
		add(&mut controller, &[("title", "Dune"), ("bookType", "Sci-Fi")]);
		add(&mut controller, &[("title", "Emma"), ("bookType", "Fiction")]);
		assert_eq!(visible_titles(&controller), ["Emma", "Dune"]);
	}

	#[test]
	fn submit_requires_open_form() {
		let mut controller = controller();
		assert_eq!(controller.submit(&fields(&[("title", "Dune")])), Err(Error::NotEditing));
		assert!(controller.repository().is_empty());

		controller.begin_create();
		controller.cancel();
		assert_eq!(controller.state(), ControllerState::Idle);
		assert_eq!(controller.submit(&fields(&[("title", "Dune")])), Err(Error::NotEditing));
	}

	#[test]
	fn invalid_submission_keeps_form_open() {
		let mut controller = controller();
		controller.begin_create();
		let error = controller.submit(&fields(&[("title", "Dune"), ("pageCount", "lots")])).unwrap_err();
		assert!(matches!(error, Error::Validation { field: Field::PageCount, .. }));
		assert!(matches!(controller.state(), ControllerState::Editing(_)));
		assert!(controller.repository().is_empty());
	}

	#[test]
	fn unknown_ids() {
		let mut controller = controller();
		let id = add(&mut controller, &[("title", "Dune")]);
		let stale: BookId = "999".parse().unwrap();
		assert_eq!(controller.begin_update(stale).unwrap_err(), Error::NotFound(stale));
		assert_eq!(controller.state(), ControllerState::Idle);

		controller.begin_update(id).unwrap();
		assert_eq!(
			controller.submit(&fields(&[("id", "999")])),
			Err(Error::Validation {
				field: Field::Id,
				value: "999".to_owned()
			})
		);
		assert!(matches!(controller.state(), ControllerState::Editing(_)));
		assert_eq!(controller.repository().len(), 1);
	}

	#[test]
	fn create_after_edit_adds_new_book() {
		let mut controller = controller();
		let dune = add(&mut controller, &[("title", "Dune"), ("bookType", "Sci-Fi")]);
		let dune_id = dune.to_string();
		controller.begin_update(dune).unwrap();
		controller.submit(&fields(&[("id", dune_id.as_str()), ("status", "Reading")])).unwrap();

		// A form that still carries the last edited id.
		controller.begin_create();
		let emma = controller.submit(&fields(&[("id", dune_id.as_str()), ("title", "Emma"), ("bookType", "Fiction")])).unwrap();

		assert_ne!(emma, dune);
		assert_eq!(controller.repository().len(), 2);
		assert_eq!(controller.repository().get(dune).unwrap().title, "Dune");
		assert_eq!(controller.repository().get(emma).unwrap().title, "Emma");
		assert_eq!(visible_titles(&controller), ["Emma", "Dune"]);
	}

	#[test]
	fn update_session_ignores_missing_id() {
		let mut controller = controller();
		let dune = add(&mut controller, &[("title", "Dune"), ("pageCount", "412")]);
		controller.begin_update(dune).unwrap();
		assert_eq!(controller.submit(&fields(&[("id", "null"), ("status", "Read")])), Ok(dune));
		assert_eq!(controller.repository().len(), 1);
		assert_eq!(controller.repository().get(dune).unwrap().on_page, 412);
	}

	#[test]
	fn new_book_session_prefills_placeholder_id() {
		let mut controller = controller();
		let session = controller.begin_create();
		assert_eq!(session.fields.get("id"), Some("null"));
		assert_eq!(session.fields.len(), 1);
	}

	#[test]
	fn uncategorized_book_gets_no_nav_entry() {
		let mut controller = controller();
		add(&mut controller, &[("title", "Dune"), ("bookType", "Sci-Fi")]);
		add(&mut controller, &[("title", "Loose Notes"), ("bookType", "")]);

		let names = controller.renderer().surface().categories().iter().map(|category| category.name.as_str()).collect::<Vec<_>>();
		assert_eq!(names, ["Sci-Fi"]);
		assert_eq!(visible_titles(&controller), ["Loose Notes", "Dune"]);
	}

	#[test]
	fn read_status_on_create() {
		let mut controller = controller();
		let id = add(&mut controller, &[("title", "Dune"), ("pageCount", "412"), ("onPage", "3"), ("status", "Read")]);
		let book = controller.repository().get(id).unwrap();
		assert_eq!(book.status, ReadingStatus::Read);
		assert_eq!(book.on_page, 412);
	}
}
