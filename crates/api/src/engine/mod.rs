//! Queue processing engine.
//!
//! - [`dispatcher`] -- one maintenance + admission cycle over the store.

pub mod dispatcher;
