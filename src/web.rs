//! Mounts the widget into a page and wires its event surface to a [`Controller`].
//!
//! The page provides the markup: an add button, the book card container, the category list,
//! and `<template>`s for the modal dialog, the edit form, book cards and category entries.
//! [`MountConfig::default`] names them the way the stock page does.

use crate::{
	book::{BookId, Field},
	controller::Controller,
	dom::{self, DomSurface, BOOK_ID_ATTRIBUTE, BOOK_TYPE_ATTRIBUTE},
	error::{Error, Result},
	form::FormFields,
	render::Renderer,
	repository::Repository,
	sensitive,
};
use core::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, FormData, HtmlFormElement};

/// Installs [`tracing_wasm`] as the global subscriber, logging to the browser console.
pub fn init_logging() {
	tracing_wasm::set_as_global_default();
}

/// Where [`mount`] finds its elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountConfig {
	/// Element id of the button that opens a blank form.
	pub add_button_id: String,
	/// Selector of the card list.
	pub book_container_selector: String,
	/// Element id of the category list.
	pub category_container_id: String,
	/// Selector of the element showing the active category. Optional on the page.
	pub heading_selector: String,
	pub modal_template_id: String,
	pub form_template_id: String,
	pub book_card_template_id: String,
	pub category_item_template_id: String,
}
impl Default for MountConfig {
	fn default() -> Self {
		Self {
			add_button_id: "add-button".to_owned(),
			book_container_selector: ".book-container".to_owned(),
			category_container_id: "categories".to_owned(),
			heading_selector: ".container>h1".to_owned(),
			modal_template_id: "modal-template".to_owned(),
			form_template_id: "new-book-form-template".to_owned(),
			book_card_template_id: "book-card-template".to_owned(),
			category_item_template_id: "category-item-template".to_owned(),
		}
	}
}

/// Dialog chrome: a backdrop and a card with a header and a body slot.
#[derive(Debug)]
struct Modal {
	document: Document,
	backdrop: Element,
	card: Element,
}
impl Modal {
	fn show(&self, title: &str, body: &Element) -> Result<()> {
		if let Some(header) = self.card.query_selector(".modal-card__header>h2").map_err(|e| dom::js_error("modal header lookup", &e))? {
			header.set_text_content(Some(title));
		}
		let slot = self
			.card
			.query_selector(".modal-card__body")
			.map_err(|e| dom::js_error("modal body lookup", &e))?
			.ok_or_else(|| Error::Dom("modal template has no `.modal-card__body`".to_owned()))?;
		slot.set_inner_html("");
		slot.append_child(body).map_err(|e| dom::js_error("modal body", &e))?;

		let page = self.document.body().ok_or_else(|| Error::Dom("document has no body".to_owned()))?;
		page.append_child(&self.backdrop).map_err(|e| dom::js_error("modal backdrop", &e))?;
		page.append_child(&self.card).map_err(|e| dom::js_error("modal card", &e))?;
		Ok(())
	}

	fn hide(&self) {
		self.backdrop.remove();
		self.card.remove();
	}
}

/// The edit form, cloned once from its template.
#[derive(Debug)]
struct Form {
	node: HtmlFormElement,
	/// Set while [`Form::clear`] resets the form, so the reset listener can tell it from a user's cancel.
	controlled_reset: Cell<bool>,
}
impl Form {
	fn clear(&self) {
		self.controlled_reset.set(true);
		self.node.reset();
		self.controlled_reset.set(false);
	}

	/// Resets the form, then writes `fields` into the controls with matching ids.
	///
	/// Hidden inputs don't restore their initial value on reset, so the id placeholder has to be written explicitly.
	fn fill(&self, fields: &FormFields) {
		self.clear();
		for (name, value) in fields.iter() {
			let input = match self.node.query_selector(&format!("#{}", name)) {
				Ok(Some(input)) => input,
				Ok(None) => {
					trace!(name, "Form has no control for field.");
					continue;
				}
				Err(error) => {
					error!("Failed to find form control {:?}: {:?}", name, error);
					continue;
				}
			};
			if let Err(error) = js_sys::Reflect::set(&input, &JsValue::from_str("value"), &JsValue::from_str(value)) {
				error!("Failed to fill form control {:?}: {:?}", name, error);
			}
		}
	}

	fn read(&self) -> Result<FormFields> {
		let data = FormData::new_with_form(&self.node).map_err(|e| dom::js_error("form data", &e))?;
		Ok(Field::ALL
			.iter()
			.filter_map(|field| data.get(field.name()).as_string().map(|value| (field.name(), value)))
			.collect())
	}
}

struct App {
	controller: RefCell<Controller<DomSurface>>,
	modal: Modal,
	form: Form,
}
impl App {
	#[instrument(skip(self))]
	fn create_book(&self) {
		let session = self.controller.borrow_mut().begin_create().clone();
		self.form.fill(&session.fields);
		self.show(&session.title);
	}

	#[instrument(skip(self))]
	fn update_book(&self, id: BookId) {
		let session = match self.controller.borrow_mut().begin_update(id) {
			Ok(session) => session.clone(),
			Err(error) => return warn!("Can't edit book: {}", error),
		};
		self.form.fill(&session.fields);
		self.show(&session.title);
	}

	fn select_category(&self, name: &str) {
		trace!(category = sensitive(name), "Category clicked.");
		self.controller.borrow_mut().select_category(name);
	}

	#[instrument(skip(self))]
	fn submit(&self) {
		let fields = match self.form.read() {
			Ok(fields) => fields,
			Err(error) => return error!("Can't read form: {}", error),
		};
		let result = self.controller.borrow_mut().submit(&fields);
		match result {
			Ok(id) => {
				trace!(%id, "Saved book.");
				self.modal.hide();
			}
			Err(error) => warn!("Submission rejected: {}", error),
		}
	}

	fn cancel(&self) {
		self.controller.borrow_mut().cancel();
		self.modal.hide();
	}

	fn show(&self, title: &str) {
		if let Err(error) = self.modal.show(title, &self.form.node) {
			error!("Can't show form: {}", error);
			self.controller.borrow_mut().cancel();
		}
	}
}

type Listener = Closure<dyn FnMut(Event)>;

/// A mounted widget. Dropping it removes its event listeners.
pub struct Mounted {
	app: Rc<App>,
	listeners: Vec<(EventTarget, &'static str, Listener)>,
}
impl Mounted {
	/// Runs `f` with the widget's controller, for example to inspect or seed state.
	pub fn with_controller<R>(&self, f: impl FnOnce(&mut Controller<DomSurface>) -> R) -> R {
		f(&mut self.app.controller.borrow_mut())
	}

	/// Keeps the widget alive for the rest of the page's lifetime.
	pub fn forget(self) {
		core::mem::forget(self)
	}

	fn listen(&mut self, target: &EventTarget, event: &'static str, handler: impl FnMut(Event) + 'static) -> Result<()> {
		let listener = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
		target
			.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
			.map_err(|e| dom::js_error(event, &e))?;
		self.listeners.push((target.clone(), event, listener));
		Ok(())
	}
}
impl Drop for Mounted {
	fn drop(&mut self) {
		for (target, event, listener) in self.listeners.drain(..) {
			if let Err(error) = target.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref()) {
				error!("Failed to remove {} listener: {:?}", event, error);
			}
		}
	}
}

/// Builds the widget over `document` and renders `repository`'s current contents.
///
/// # Errors
///
/// [`Error::Dom`] if a configured element or template is missing or malformed.
#[instrument(skip(document, repository))]
pub fn mount(document: &Document, config: &MountConfig, repository: Repository) -> Result<Mounted> {
	let by_id = |id: &str| document.get_element_by_id(id).ok_or_else(|| Error::Dom(format!("no element with id {:?}", id)));
	let by_selector = |selector: &str| document.query_selector(selector).map_err(|e| dom::js_error(selector, &e));

	let add_button = by_id(config.add_button_id.as_str())?;
	let book_container = by_selector(config.book_container_selector.as_str())?.ok_or_else(|| Error::Dom(format!("nothing matches {:?}", config.book_container_selector)))?;
	let category_container = by_id(config.category_container_id.as_str())?;
	let heading = by_selector(config.heading_selector.as_str())?;

	let modal_template = dom::into_template(by_id(config.modal_template_id.as_str())?)?;
	let modal = Modal {
		document: document.clone(),
		backdrop: dom::clone_template_root(&modal_template, ".modal-backdrop").ok_or_else(|| Error::Dom("modal template has no `.modal-backdrop`".to_owned()))?,
		card: dom::clone_template_root(&modal_template, ".modal-card").ok_or_else(|| Error::Dom("modal template has no `.modal-card`".to_owned()))?,
	};
	let form_template = dom::into_template(by_id(config.form_template_id.as_str())?)?;
	let form = Form {
		node: dom::clone_template_root(&form_template, "form")
			.ok_or_else(|| Error::Dom("form template has no <form>".to_owned()))?
			.dyn_into()
			.map_err(|_| Error::Dom("form template's <form> is not an HTML form".to_owned()))?,
		controlled_reset: Cell::new(false),
	};

	let surface = DomSurface::new(
		document.clone(),
		book_container.clone(),
		category_container.clone(),
		heading,
		by_id(config.book_card_template_id.as_str())?,
		by_id(config.category_item_template_id.as_str())?,
	)?;
	let mut renderer = Renderer::new(surface);
	for category in repository.categories() {
		renderer.render_category(category);
	}
	renderer.render_all(&repository, None);

	let app = Rc::new(App {
		controller: RefCell::new(Controller::new(repository, renderer)),
		modal,
		form,
	});
	let mut mounted = Mounted { app, listeners: Vec::new() };

	let app = Rc::clone(&mounted.app);
	mounted.listen(&add_button, "click", move |_| app.create_book())?;

	let app = Rc::clone(&mounted.app);
	mounted.listen(&book_container, "click", move |event| {
		let card = match closest(&event, &format!("[{}]", BOOK_ID_ATTRIBUTE)) {
			Some(card) => card,
			None => return,
		};
		match card.get_attribute(BOOK_ID_ATTRIBUTE).map(|id| id.parse::<BookId>()) {
			Some(Ok(id)) => app.update_book(id),
			Some(Err(error)) => warn!("Card has a malformed id: {}", error),
			None => (),
		}
	})?;

	let app = Rc::clone(&mounted.app);
	mounted.listen(&category_container, "click", move |event| {
		if let Some(name) = closest(&event, &format!("[{}]", BOOK_TYPE_ATTRIBUTE)).and_then(|entry| entry.get_attribute(BOOK_TYPE_ATTRIBUTE)) {
			event.prevent_default();
			app.select_category(&name);
		}
	})?;

	let app = Rc::clone(&mounted.app);
	let form_target: EventTarget = mounted.app.form.node.clone().into();
	mounted.listen(&form_target, "submit", move |event| {
		event.prevent_default();
		app.submit();
	})?;

	let app = Rc::clone(&mounted.app);
	mounted.listen(&form_target, "reset", move |_| {
		if !app.form.controlled_reset.get() {
			app.cancel();
		}
	})?;

	let app = Rc::clone(&mounted.app);
	let backdrop_target: EventTarget = mounted.app.modal.backdrop.clone().into();
	mounted.listen(&backdrop_target, "click", move |_| app.cancel())?;

	trace!("Mounted.");
	Ok(mounted)
}

/// The closest ancestor-or-self of the event's target that matches `selector`.
fn closest(event: &Event, selector: &str) -> Option<Element> {
	let target: Element = event.target()?.dyn_into().ok()?;
	match target.closest(selector) {
		Ok(found) => found,
		Err(error) => {
			error!("Invalid selector {:?}: {:?}", selector, error);
			None
		}
	}
}
