//! Route definitions for the SwiftPass member API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public except change-password)
        .nest("/auth", auth_routes(state.clone()))
        // Reference data (public)
        .nest("/reference", reference_routes())
        // Protected routes
        .nest("/members", member_routes(state.clone()))
        .nest("/assessments", assessment_routes(state.clone()))
        .nest("/exercise", exercise_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/change-password", post(handlers::change_password))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/login", post(handlers::login))
        .route("/verify-otp", post(handlers::verify_otp))
        .route("/forgot-password", post(handlers::forgot_password))
        .route("/verify-forgot-otp", post(handlers::verify_forgot_otp))
        .route("/reset-password", post(handlers::reset_password))
        .merge(protected)
}

/// Macro breakdowns, food library and allergens
fn reference_routes() -> Router<AppState> {
    Router::new()
        .route("/macro-breakdowns/:goal_type", get(handlers::get_macro_breakdown))
        .route("/food-groups", get(handlers::list_food_groups))
        .route("/food-groups/:group_id/foods", get(handlers::list_foods_in_group))
        .route("/food-groups/:group_id/best", get(handlers::get_best_foods))
        .route("/allergens", get(handlers::list_allergens))
}

/// Member profile, gym activity and billing routes (protected)
fn member_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::get_me))
        .route("/me/activity", get(handlers::get_gym_visits))
        .route("/me/transactions", get(handlers::get_activity_log))
        .route("/me/balance", get(handlers::get_balance))
        .route("/me/subscription", get(handlers::get_subscription))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Assessment routes (protected)
fn assessment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/initial",
            get(handlers::get_initial_assessment).post(handlers::save_initial_assessment),
        )
        .route("/nutrition", post(handlers::submit_nutrition_assessment))
        .route("/nutrition/latest", get(handlers::get_latest_nutrition_assessment))
        .route("/nutrition/results", get(handlers::get_nutrition_results))
        .route("/nutrition/choices", get(handlers::get_food_choices))
        .route("/nutrition/status", get(handlers::get_nutrition_status))
        .route(
            "/nutrition/:assessment_id/generate",
            post(handlers::regenerate_nutrition_plan),
        )
        .route("/exercise", post(handlers::submit_exercise_assessment))
        .route("/exercise/plan", get(handlers::get_workout_plan))
        .route("/exercise/status", get(handlers::get_exercise_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Split library and workout completion routes (protected)
fn exercise_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/splits", get(handlers::list_splits))
        .route("/splits/:split_id/preview", get(handlers::get_split_preview))
        .route(
            "/completions",
            get(handlers::list_completions).post(handlers::complete_day),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
