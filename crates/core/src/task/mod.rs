//! Task module
//!
//! Date-keyed task buckets and their file-backed store.

mod model;
mod store;

pub use model::TaskBook;
pub use store::TaskStore;
