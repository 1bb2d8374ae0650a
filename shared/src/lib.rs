//! Shared types and models for the SwiftPass member platform
//!
//! This crate contains the nutrition planner, the questionnaire state
//! machines and the types shared between the backend and the client (via WASM).

pub mod models;
pub mod planner;
pub mod types;
pub mod validation;
pub mod wizard;

pub use models::*;
pub use planner::{compute_nutrition_plan, resolve_macro_targets, NutritionPlan, PlanError};
pub use types::*;
pub use validation::*;
pub use wizard::{AssessmentWizard, WizardError};
