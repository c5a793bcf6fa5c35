//! Domain types shared by the photobooth backend crates.
//!
//! Holds the gallery item model as stored in the external spreadsheet store,
//! generation parameter defaults and validation, and Drive URL helpers.

pub mod cell;
pub mod drive;
pub mod error;
pub mod gallery;
pub mod generation;
