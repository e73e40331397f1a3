//! [`Surface`] implementation over live DOM elements.
//!
//! Cards and category entries are cloned from `<template>` elements, so the page keeps full control over markup.
//! The templates must contain a `.book-card` element and an `li` element respectively;
//! the card's displayed fields are found through `data-for` and the entry's label through its `a` element.

use crate::{
	book::{BookId, Field},
	error::{Error, Result},
	sensitive,
	surface::Surface,
};
use tracing::{error, trace, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, DocumentFragment, Element, HtmlElement, HtmlTemplateElement, NodeList};

pub const BOOK_ID_ATTRIBUTE: &str = "data-book-id";
pub const FIELD_ATTRIBUTE: &str = "data-for";
pub const BOOK_TYPE_ATTRIBUTE: &str = "data-book-type";
pub const SELECTED_CLASS: &str = "active";

#[derive(Debug, Clone)]
pub struct DomSurface {
	document: Document,
	book_container: Element,
	category_container: Element,
	heading: Option<Element>,
	book_template: HtmlTemplateElement,
	category_template: HtmlTemplateElement,
}
impl DomSurface {
	/// # Errors
	///
	/// [`Error::Dom`] iff either template element isn't a `<template>`.
	pub fn new(document: Document, book_container: Element, category_container: Element, heading: Option<Element>, book_template: Element, category_template: Element) -> Result<Self> {
		Ok(Self {
			document,
			book_container,
			category_container,
			heading,
			book_template: into_template(book_template)?,
			category_template: into_template(category_template)?,
		})
	}

	#[must_use]
	pub fn book_container(&self) -> &Element {
		&self.book_container
	}

	#[must_use]
	pub fn category_container(&self) -> &Element {
		&self.category_container
	}

	fn category_entries(&self) -> Vec<Element> {
		match self.category_container.query_selector_all(&format!("[{}]", BOOK_TYPE_ATTRIBUTE)) {
			Ok(entries) => elements(&entries),
			Err(error) => {
				error!("Failed to list category entries: {:?}", error);
				Vec::new()
			}
		}
	}

	fn fallback_element(&self, tag: &str) -> Option<Element> {
		match self.document.create_element(tag) {
			Ok(element) => Some(element),
			Err(error) => {
				error!("Failed to create fallback <{}>: {:?}", tag, error);
				None
			}
		}
	}
}

impl Surface for DomSurface {
	type Card = HtmlElement;

	fn find_card(&self, id: BookId) -> Option<Self::Card> {
		match self.book_container.query_selector(&format!("[{}='{}']", BOOK_ID_ATTRIBUTE, id)) {
			Ok(card) => card.and_then(|card| card.dyn_into().ok()),
			Err(error) => {
				error!("Failed to look up card {}: {:?}", id, error);
				None
			}
		}
	}

	fn create_card(&mut self, id: BookId) -> Option<Self::Card> {
		let card = match clone_template_root(&self.book_template, ".book-card").map(JsCast::dyn_into::<HtmlElement>) {
			Some(Ok(card)) => card,
			Some(Err(card)) => {
				error!("Book card template root <{}> is not an HTML element; Using a bare <div>.", card.tag_name());
				self.fallback_element("div")?.dyn_into().ok()?
			}
			None => {
				warn!("Book card template has no `.book-card` element; Using a bare <div>.");
				self.fallback_element("div")?.dyn_into().ok()?
			}
		};
		if let Err(error) = card.set_attribute(BOOK_ID_ATTRIBUTE, &id.to_string()) {
			error!("Failed to key card {}: {:?}", id, error);
		}
		Some(card)
	}

	fn set_card_field(&mut self, card: &Self::Card, field: Field, text: &str) {
		match card.query_selector_all(&format!("[{}='{}']", FIELD_ATTRIBUTE, field.name())) {
			Ok(targets) => {
				for target in elements(&targets) {
					target.set_text_content(Some(text));
				}
			}
			Err(error) => error!("Failed to find `{}` elements: {:?}", field.name(), error),
		}
	}

	fn set_card_accent(&mut self, card: &Self::Card, border: &str) {
		if let Err(error) = card.style().set_property("border-left", border) {
			error!("Failed to set card border: {:?}", error);
		}
	}

	fn prepend_card(&mut self, card: Self::Card) {
		if let Err(error) = self.book_container.insert_adjacent_element("afterbegin", &card) {
			error!("Failed to insert card: {:?}", error);
		}
	}

	fn remove_card(&mut self, id: BookId) -> bool {
		match self.find_card(id) {
			Some(card) => {
				card.remove();
				true
			}
			None => false,
		}
	}

	fn clear_cards(&mut self) {
		self.book_container.set_inner_html("");
	}

	fn has_category(&self, name: &str) -> bool {
		self.category_entries().iter().any(|entry| entry.get_attribute(BOOK_TYPE_ATTRIBUTE).as_deref() == Some(name))
	}

	fn prepend_category(&mut self, name: &str) {
		let entry = match clone_template_root(&self.category_template, "li") {
			Some(entry) => entry,
			None => {
				warn!("Category template has no <li>; Using a bare one.");
				match self.fallback_element("li") {
					Some(entry) => entry,
					None => return,
				}
			}
		};
		if let Err(error) = entry.set_attribute(BOOK_TYPE_ATTRIBUTE, name) {
			error!("Failed to label category entry: {:?}", error);
		}
		match entry.query_selector("a") {
			Ok(Some(anchor)) => anchor.set_text_content(Some(name)),
			Ok(None) => entry.set_text_content(Some(name)),
			Err(error) => error!("Failed to find category link: {:?}", error),
		}
		trace!(category = sensitive(name), "Inserting category entry.");
		if let Err(error) = self.category_container.insert_adjacent_element("afterbegin", &entry) {
			error!("Failed to insert category entry: {:?}", error);
		}
	}

	fn select_category(&mut self, name: &str) {
		for entry in self.category_entries() {
			let selected = entry.get_attribute(BOOK_TYPE_ATTRIBUTE).as_deref() == Some(name);
			if let Err(error) = entry.class_list().toggle_with_force(SELECTED_CLASS, selected) {
				error!("Failed to toggle category selection: {:?}", error);
			}
		}
	}

	fn set_heading(&mut self, text: &str) {
		if let Some(heading) = &self.heading {
			heading.set_text_content(Some(text));
		}
	}
}

/// Deep-clones `template`'s content and returns its first element matching `selector`.
pub(crate) fn clone_template_root(template: &HtmlTemplateElement, selector: &str) -> Option<Element> {
	let content = match template.content().clone_node_with_deep(true) {
		Ok(content) => content,
		Err(error) => {
			error!("Failed to clone template: {:?}", error);
			return None;
		}
	};
	let content: DocumentFragment = content.dyn_into().ok()?;
	content.query_selector(selector).ok().flatten()
}

pub(crate) fn into_template(element: Element) -> Result<HtmlTemplateElement> {
	element.dyn_into().map_err(|element: Element| Error::Dom(format!("expected <template> but found <{}>", element.tag_name())))
}

pub(crate) fn elements(nodes: &NodeList) -> Vec<Element> {
	(0..nodes.length()).filter_map(|i| nodes.get(i)).filter_map(|node| node.dyn_into().ok()).collect()
}

pub(crate) fn js_error(context: &str, error: &JsValue) -> Error {
	Error::Dom(format!("{}: {:?}", context, error))
}
