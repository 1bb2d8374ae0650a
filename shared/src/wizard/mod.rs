//! Questionnaire state machines
//!
//! Each flow owns its current step and answers. Option lists (food groups,
//! allergens, splits) are handed in once and never modified; the flows only
//! filter them.

mod exercise;
mod nutrition;

pub use exercise::*;
pub use nutrition::*;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum WizardError {
    #[error("answer required before continuing: {0}")]
    MissingAnswer(&'static str),

    #[error("{action} is not possible on step {step}")]
    WrongStep { action: &'static str, step: String },

    #[error("option not available: {0}")]
    UnknownOption(String),

    #[error("invalid answer: {0}")]
    InvalidAnswer(String),

    #[error("still waiting for {0}")]
    NotReady(&'static str),

    #[error("the questionnaire is already finished")]
    Finished,
}

/// Navigation shared by every questionnaire
pub trait AssessmentWizard {
    type Step: Copy + PartialEq + std::fmt::Debug;

    fn step(&self) -> Self::Step;

    /// Advance one step if the current step's requirements are met
    fn next(&mut self) -> Result<Self::Step, WizardError>;

    /// Go back one step; staying put on the first step
    fn back(&mut self) -> Self::Step;

    /// One-based position of the current step and the number of steps
    fn progress(&self) -> (usize, usize);

    fn is_done(&self) -> bool;
}

/// Step at `offset` from `current` within `order`
fn neighbour<T: Copy + PartialEq>(order: &[T], current: T, offset: isize) -> Option<T> {
    let index = order.iter().position(|s| *s == current)?;
    let target = index.checked_add_signed(offset)?;
    order.get(target).copied()
}

fn position<T: PartialEq>(order: &[T], current: &T) -> usize {
    order.iter().position(|s| s == current).map_or(0, |i| i + 1)
}
