//! Business logic services for the SwiftPass member backend

pub mod activity;
pub mod auth;
pub mod exercise;
pub mod member;
pub mod nutrition;
pub mod otp_delivery;
pub mod plan_store;
pub mod reference;

pub use activity::ActivityService;
pub use auth::AuthService;
pub use exercise::ExerciseService;
pub use member::MemberService;
pub use nutrition::NutritionService;
pub use otp_delivery::{otp_delivery_from_config, OtpDelivery};
pub use plan_store::{PgPlanResultStore, PlanResultStore};
pub use reference::ReferenceService;
