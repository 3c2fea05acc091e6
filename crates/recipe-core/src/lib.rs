pub mod action_time;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod flowgraph;
pub mod ingredients;
pub mod io;
pub mod paths;
pub mod recipe_store;
pub mod recipe_time;
pub mod tagger;
pub mod token;

pub use error::{RecipeError, Result};
