pub mod command;
mod error;
pub mod handlers;
pub mod render;

pub use error::Alert;
