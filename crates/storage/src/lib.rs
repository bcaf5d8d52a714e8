#![warn(clippy::pedantic)]

pub mod dto;
mod settings;
mod store;

pub use settings::Settings;
pub use store::{Store, builtin_catalog};
