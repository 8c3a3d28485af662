// Utility functions

pub mod links;
pub mod logger;

pub use links::*;
pub use logger::*;
