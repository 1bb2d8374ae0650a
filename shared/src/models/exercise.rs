//! Workout split library and exercise assessment models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::types::{CardioPreference, FitnessLevel};

/// A training split (e.g. "Upper/Lower") for a fixed number of days per week
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Split {
    pub id: Uuid,
    pub split_name: String,
    pub workout_days: i32,
    pub target_gender: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub muscle_group: Option<String>,
    pub equipment: Option<String>,
    pub instructions: Option<String>,
    pub level: Option<String>,
    pub exercise_type: Option<String>,
    pub order_index: i32,
}

/// One training day of a split, exercises in performing order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitDay {
    pub day_number: i32,
    pub day_title: String,
    pub exercises: Vec<Exercise>,
}

/// A split with its full day-by-day program
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitPreview {
    pub split: Split,
    pub days: Vec<SplitDay>,
}

impl SplitPreview {
    pub fn total_exercises(&self) -> usize {
        self.days.iter().map(|d| d.exercises.len()).sum()
    }
}

/// Days per week a split can be scheduled for
pub const MIN_WORKOUT_DAYS: i32 = 1;
pub const MAX_WORKOUT_DAYS: i32 = 7;

/// Answers submitted at the end of the exercise questionnaire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ExerciseAssessmentInput {
    pub fitness_level: FitnessLevel,
    pub cardio_preference: Option<CardioPreference>,
    #[validate(range(min = 1, max = 7))]
    pub workout_days: i32,
    pub split_id: Uuid,
    #[validate(length(max = 1000))]
    pub coach_notes: Option<String>,
}

/// Stored exercise questionnaire answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseAssessment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub fitness_level: FitnessLevel,
    pub cardio_preference: Option<CardioPreference>,
    pub workout_days: i32,
    pub split_id: Uuid,
    pub assigned_split_name: String,
    pub coach_notes: Option<String>,
    pub status: String,
    pub completed_at: DateTime<Utc>,
}

/// A day of the member's split marked as done
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseCompletion {
    pub split_name: String,
    pub completion_date: NaiveDate,
}
