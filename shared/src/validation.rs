//! Validation utilities shared by the API and the client

use rust_decimal::Decimal;

use crate::models::{MacroBreakdown, MAX_WORKOUT_DAYS, MIN_WORKOUT_DAYS};

// ============================================================================
// Nutrition Validations
// ============================================================================

/// Validate that macro percentages are non-negative and sum to 100 (±1)
pub fn validate_macro_breakdown(breakdown: &MacroBreakdown) -> Result<(), &'static str> {
    let parts = [breakdown.protein_pct, breakdown.carbs_pct, breakdown.fats_pct];
    if parts.iter().any(|p| *p < Decimal::ZERO) {
        return Err("Macro percentages cannot be negative");
    }
    let total: Decimal = parts.iter().sum();
    if (total - Decimal::ONE_HUNDRED).abs() > Decimal::ONE {
        return Err("Macro percentages must sum to 100");
    }
    Ok(())
}

/// Validate a daily calorie target
pub fn validate_calorie_target(calories: Decimal) -> Result<(), &'static str> {
    if calories <= Decimal::ZERO {
        return Err("Calorie target must be positive");
    }
    if calories > Decimal::from(10_000) {
        return Err("Calorie target is unrealistically high");
    }
    Ok(())
}

/// Validate per-100g nutrient values of a library food
pub fn validate_nutrients_per_100g(
    calories: Decimal,
    protein: Decimal,
    carbs: Decimal,
    fats: Decimal,
) -> Result<(), &'static str> {
    if [calories, protein, carbs, fats].iter().any(|v| *v < Decimal::ZERO) {
        return Err("Nutrient values cannot be negative");
    }
    if protein + carbs + fats > Decimal::ONE_HUNDRED {
        return Err("Macro grams per 100 g cannot exceed 100");
    }
    Ok(())
}

// ============================================================================
// Exercise Validations
// ============================================================================

pub fn validate_workout_days(days: i32) -> Result<(), &'static str> {
    if (MIN_WORKOUT_DAYS..=MAX_WORKOUT_DAYS).contains(&days) {
        Ok(())
    } else {
        Err("Workout days must be between 1 and 7")
    }
}

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate a one-time password as typed by the member
pub fn validate_otp_format(code: &str) -> Result<(), &'static str> {
    if code.len() == 6 && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("Verification code must be 6 digits")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn breakdown(p: i64, c: i64, f: i64) -> MacroBreakdown {
        MacroBreakdown {
            id: Uuid::new_v4(),
            goal_type: "bulk".to_string(),
            protein_pct: Decimal::from(p),
            carbs_pct: Decimal::from(c),
            fats_pct: Decimal::from(f),
        }
    }

    #[test]
    fn test_macro_breakdown() {
        assert!(validate_macro_breakdown(&breakdown(30, 40, 30)).is_ok());
        assert!(validate_macro_breakdown(&breakdown(33, 33, 33)).is_ok());
        assert!(validate_macro_breakdown(&breakdown(30, 40, 35)).is_err());
        assert!(validate_macro_breakdown(&breakdown(-10, 80, 30)).is_err());
    }

    #[test]
    fn test_calorie_target() {
        assert!(validate_calorie_target(Decimal::from(1800)).is_ok());
        assert!(validate_calorie_target(Decimal::ZERO).is_err());
        assert!(validate_calorie_target(Decimal::from(-5)).is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("member@swiftpass.gym").is_ok());
        assert!(validate_email("member@localhost").is_err());
        assert!(validate_email("@swiftpass.gym").is_err());
        assert!(validate_email("member.swiftpass.gym").is_err());
    }

    #[test]
    fn test_otp_format() {
        assert!(validate_otp_format("012345").is_ok());
        assert!(validate_otp_format("12345").is_err());
        assert!(validate_otp_format("12a456").is_err());
    }

    #[test]
    fn test_nutrients() {
        let d = |v: i64| Decimal::from(v);
        assert!(validate_nutrients_per_100g(d(165), d(31), d(0), d(4)).is_ok());
        assert!(validate_nutrients_per_100g(d(165), d(-1), d(0), d(4)).is_err());
        assert!(validate_nutrients_per_100g(d(900), d(60), d(30), d(20)).is_err());
    }
}
