//! `booth-gallery` library crate.
//!
//! Client side of the photobooth gallery: keeps a local view of the store's
//! items fresh, nudges the queue dispatcher, and issues optimistic user
//! mutations. The headless binary in `main.rs` wires these together.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod poller;
pub mod view;

pub use backend::{GalleryBackend, HttpBackend, StartVideoRequest};
pub use config::ClientConfig;
pub use controller::{GalleryController, RegenerationRequest, SessionRef};
pub use error::GalleryError;
pub use poller::{GalleryPoller, PollerHandle};
pub use view::{DisplayItem, GalleryView};
