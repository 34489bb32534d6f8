// Form model: descriptor store, visibility projector and the screen controller.
// The terminal host (main.rs) only renders and forwards input to `form`.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod form;
pub mod projector;

pub use error::{FormError, Result};
