//! Core library for TaskTalk
//!
//! This crate contains the bot's business logic, including:
//! - Date-keyed task storage
//! - Free-form date resolution
//! - Intent dispatch and the delete-confirmation dialogue
//!
//! The transport layer (message delivery, menus, voice download) is a
//! collaborator: it feeds inbound text to [`dispatcher::Dispatcher`] and
//! delivers the returned reply strings.

pub mod classifier;
pub mod date;
pub mod dialogue;
pub mod dispatcher;
pub mod error;
pub mod notify;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
