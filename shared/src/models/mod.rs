//! Domain models for the SwiftPass member platform

mod activity;
mod exercise;
mod food;
mod member;
mod nutrition;

pub use activity::*;
pub use exercise::*;
pub use food::*;
pub use member::*;
pub use nutrition::*;
