#![doc(html_root_url = "https://docs.rs/bookshelf-dom/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod book;
pub mod controller;
pub mod dom;
pub mod error;
pub mod form;
pub mod render;
pub mod repository;
pub mod surface;
pub mod web;

pub use crate::{
	book::{Book, BookId, BookPatch, Field, ReadingStatus},
	controller::{Controller, ControllerState, EditSession},
	error::{Error, Result},
	form::{FormFields, Submission},
	render::Renderer,
	repository::Repository,
	surface::{MemorySurface, Surface},
};

/// User-entered text as it may appear in log output.
pub(crate) fn sensitive(text: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		text
	} else {
		"<redacted>"
	}
}
