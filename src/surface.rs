//! The visual contract the [`Renderer`](`crate::render::Renderer`) writes through.
//!
//! Book cards are keyed by [`BookId`] (`data-book-id` in the DOM), their displayed
//! fields are marked by [`Field`] name (`data-for`), and category entries are keyed
//! by their label (`data-book-type`).

use crate::book::{BookId, Field};
use hashbrown::HashMap;

pub trait Surface {
	/// Handle to one rendered book card.
	type Card;

	fn find_card(&self, id: BookId) -> Option<Self::Card>;

	/// Creates a detached card for `id`. It becomes visible through [`Surface::prepend_card`].
	///
	/// [`None`] if no card could be created. The failure is logged by the implementation.
	fn create_card(&mut self, id: BookId) -> Option<Self::Card>;

	/// Writes `text` into every element of `card` marked for `field`.
	fn set_card_field(&mut self, card: &Self::Card, field: Field, text: &str);

	/// Sets the left border of `card`, which carries the reading status.
	fn set_card_accent(&mut self, card: &Self::Card, border: &str);

	fn prepend_card(&mut self, card: Self::Card);

	/// Returns whether a card was removed.
	fn remove_card(&mut self, id: BookId) -> bool;

	fn clear_cards(&mut self);

	fn has_category(&self, name: &str) -> bool;

	fn prepend_category(&mut self, name: &str);

	/// Marks exactly the category entries labelled `name` as selected.
	fn select_category(&mut self, name: &str);

	fn set_heading(&mut self, text: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryCard {
	pub id: BookId,
	pub fields: HashMap<Field, String>,
	pub border: String,
}
impl MemoryCard {
	#[must_use]
	pub fn field(&self, field: Field) -> Option<&str> {
		self.fields.get(&field).map(String::as_str)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryCategory {
	pub name: String,
	pub selected: bool,
}

/// A headless [`Surface`], front of the list first.
#[derive(Debug, Default)]
pub struct MemorySurface {
	cards: Vec<MemoryCard>,
	detached: Vec<MemoryCard>,
	categories: Vec<MemoryCategory>,
	heading: String,
	clear_count: usize,
}
impl MemorySurface {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn cards(&self) -> &[MemoryCard] {
		&self.cards
	}

	#[must_use]
	pub fn card(&self, id: BookId) -> Option<&MemoryCard> {
		self.cards.iter().find(|card| card.id == id)
	}

	#[must_use]
	pub fn categories(&self) -> &[MemoryCategory] {
		&self.categories
	}

	#[must_use]
	pub fn heading(&self) -> &str {
		&self.heading
	}

	/// How often the card list was cleared, i.e. the number of full render passes.
	#[must_use]
	pub fn clear_count(&self) -> usize {
		self.clear_count
	}

	fn card_mut(&mut self, id: BookId) -> Option<&mut MemoryCard> {
		match self.cards.iter_mut().find(|card| card.id == id) {
			Some(card) => Some(card),
			None => self.detached.iter_mut().find(|card| card.id == id),
		}
	}
}
impl Surface for MemorySurface {
	type Card = BookId;

	fn find_card(&self, id: BookId) -> Option<Self::Card> {
		self.card(id).map(|card| card.id)
	}

	fn create_card(&mut self, id: BookId) -> Option<Self::Card> {
		self.detached.push(MemoryCard {
			id,
			fields: HashMap::new(),
			border: String::new(),
		});
		Some(id)
	}

	fn set_card_field(&mut self, card: &Self::Card, field: Field, text: &str) {
		if let Some(card) = self.card_mut(*card) {
			card.fields.insert(field, text.to_owned());
		}
	}

	fn set_card_accent(&mut self, card: &Self::Card, border: &str) {
		if let Some(card) = self.card_mut(*card) {
			card.border = border.to_owned();
		}
	}

	fn prepend_card(&mut self, card: Self::Card) {
		if let Some(index) = self.detached.iter().position(|detached| detached.id == card) {
			let card = self.detached.remove(index);
			self.cards.insert(0, card);
		}
	}

	fn remove_card(&mut self, id: BookId) -> bool {
		match self.cards.iter().position(|card| card.id == id) {
			Some(index) => {
				self.cards.remove(index);
				true
			}
			None => false,
		}
	}

	fn clear_cards(&mut self) {
		self.clear_count += 1;
		self.cards.clear();
	}

	fn has_category(&self, name: &str) -> bool {
		self.categories.iter().any(|category| category.name == name)
	}

	fn prepend_category(&mut self, name: &str) {
		self.categories.insert(
			0,
			MemoryCategory {
				name: name.to_owned(),
				selected: false,
			},
		);
	}

	fn select_category(&mut self, name: &str) {
		for category in &mut self.categories {
			category.selected = category.name == name;
		}
	}

	fn set_heading(&mut self, text: &str) {
		self.heading = text.to_owned();
	}
}
