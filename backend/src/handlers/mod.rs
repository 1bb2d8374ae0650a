//! HTTP handlers for the SwiftPass member API

pub mod activity;
pub mod auth;
pub mod exercise;
pub mod health;
pub mod member;
pub mod nutrition;
pub mod reference;

pub use activity::{get_activity_log, get_balance, get_gym_visits, get_subscription};
pub use auth::{
    change_password, forgot_password, login, reset_password, verify_forgot_otp, verify_otp,
};
pub use exercise::{
    complete_day, get_split_preview, get_workout_plan, get_exercise_status, list_completions,
    list_splits, submit_exercise_assessment,
};
pub use health::health_check;
pub use member::{get_initial_assessment, get_me, save_initial_assessment};
pub use nutrition::{
    get_food_choices, get_latest_nutrition_assessment, get_nutrition_results,
    get_nutrition_status, regenerate_nutrition_plan, submit_nutrition_assessment,
};
pub use reference::{
    get_best_foods, get_macro_breakdown, list_allergens, list_food_groups, list_foods_in_group,
};
