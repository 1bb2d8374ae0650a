//! Member profile and onboarding assessment models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::types::Sex;

/// Image shown for members who never uploaded one
pub const DEFAULT_PROFILE_IMAGE: &str = "uploads/members/default.png";

/// Gym member profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub rfid_tag: Option<String>,
    pub profile_image_url: String,
    pub created_at: DateTime<Utc>,
    pub has_initial_assessment: bool,
}

/// Onboarding assessment captured when a member first signs in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialAssessment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub username: String,
    pub sex: Sex,
    pub age: i32,
    pub height_cm: Decimal,
    pub weight_kg: Decimal,
    pub activity_level: Option<String>,
    pub body_goal: Option<String>,
    pub goal_type: String,
    pub calorie_maintenance: Decimal,
    pub calories_target: Decimal,
    pub calorie_strategy: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording the onboarding assessment
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InitialAssessmentInput {
    pub sex: Sex,
    #[validate(range(min = 12, max = 100))]
    pub age: i32,
    #[validate(custom = "positive_decimal")]
    pub height_cm: Decimal,
    #[validate(custom = "positive_decimal")]
    pub weight_kg: Decimal,
    pub activity_level: Option<String>,
    pub body_goal: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub goal_type: String,
    #[validate(custom = "positive_decimal")]
    pub calorie_maintenance: Decimal,
    #[validate(custom = "positive_decimal")]
    pub calories_target: Decimal,
    pub calorie_strategy: Option<String>,
}

fn positive_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_positive"))
    }
}
