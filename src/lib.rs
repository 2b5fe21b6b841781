mod api;
pub mod args;
mod cache;
pub mod commands;
mod config;
pub mod entry;
mod error;
pub mod form;
pub mod model;
mod utils;


pub use api::{Mode, TEST_MODE_ENV};
pub use config::{Config, Spreadsheet};
pub use error::{Error, ErrorType, Result};
