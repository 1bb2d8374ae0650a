//! Workout split library, exercise assessment and day completions

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    CardioPreference, Exercise, ExerciseAssessment, ExerciseAssessmentInput, ExerciseCompletion,
    FitnessLevel, Split, SplitDay, SplitPreview,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::nutrition::CompletionStatus;

/// Exercise service
#[derive(Clone)]
pub struct ExerciseService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct SplitRow {
    id: Uuid,
    split_name: String,
    workout_days: i32,
    target_gender: Option<String>,
}

impl From<SplitRow> for Split {
    fn from(row: SplitRow) -> Self {
        Split {
            id: row.id,
            split_name: row.split_name,
            workout_days: row.workout_days,
            target_gender: row.target_gender,
        }
    }
}

/// One exercise slot of a split day; days without exercises carry no exercise
#[derive(Debug, sqlx::FromRow)]
struct ProgramRow {
    day_number: i32,
    day_title: String,
    exercise_id: Option<Uuid>,
    name: Option<String>,
    muscle_group: Option<String>,
    equipment: Option<String>,
    instructions: Option<String>,
    level: Option<String>,
    exercise_type: Option<String>,
    order_index: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
struct AssessmentRow {
    id: Uuid,
    member_id: Uuid,
    fitness_level: String,
    cardio_preference: Option<String>,
    workout_days: i32,
    split_id: Uuid,
    assigned_split_name: String,
    coach_notes: Option<String>,
    status: String,
    completed_at: DateTime<Utc>,
}

impl TryFrom<AssessmentRow> for ExerciseAssessment {
    type Error = AppError;

    fn try_from(row: AssessmentRow) -> Result<Self, Self::Error> {
        let fitness_level: FitnessLevel = row
            .fitness_level
            .parse()
            .map_err(|e: shared::UnknownVariant| AppError::Internal(e.to_string()))?;
        let cardio_preference = row
            .cardio_preference
            .as_deref()
            .map(str::parse::<CardioPreference>)
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(ExerciseAssessment {
            id: row.id,
            member_id: row.member_id,
            fitness_level,
            cardio_preference,
            workout_days: row.workout_days,
            split_id: row.split_id,
            assigned_split_name: row.assigned_split_name,
            coach_notes: row.coach_notes,
            status: row.status,
            completed_at: row.completed_at,
        })
    }
}

/// The member's assessment together with the program it assigned
#[derive(Debug, Serialize)]
pub struct WorkoutPlan {
    pub assessment: ExerciseAssessment,
    pub program: SplitPreview,
}

#[derive(Debug, Deserialize)]
pub struct CompleteDayInput {
    pub split_name: String,
    /// Defaults to today (UTC)
    pub completion_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CompletionRecorded {
    #[serde(flatten)]
    pub completion: ExerciseCompletion,
    pub already_completed: bool,
}

/// Fold flat program rows into days, exercises ordered by `order_index`
fn group_program(rows: Vec<ProgramRow>) -> Vec<SplitDay> {
    let mut days: BTreeMap<i32, SplitDay> = BTreeMap::new();

    for row in rows {
        let day = days.entry(row.day_number).or_insert_with(|| SplitDay {
            day_number: row.day_number,
            day_title: row.day_title.clone(),
            exercises: Vec::new(),
        });

        if let (Some(id), Some(name)) = (row.exercise_id, row.name) {
            day.exercises.push(Exercise {
                id,
                name,
                muscle_group: row.muscle_group,
                equipment: row.equipment,
                instructions: row.instructions,
                level: row.level,
                exercise_type: row.exercise_type,
                order_index: row.order_index.unwrap_or_default(),
            });
        }
    }

    days.into_values()
        .map(|mut day| {
            day.exercises.sort_by_key(|e| e.order_index);
            day
        })
        .collect()
}

/// Completion log keyed by ISO date
fn completions_by_date(completions: Vec<ExerciseCompletion>) -> BTreeMap<String, String> {
    completions
        .into_iter()
        .map(|c| (c.completion_date.format("%Y-%m-%d").to_string(), c.split_name))
        .collect()
}

fn check_split_matches_days(split: &Split, workout_days: i32) -> AppResult<()> {
    if split.workout_days != workout_days {
        return Err(AppError::Validation {
            field: "split_id".to_string(),
            message: format!(
                "Split '{}' is a {}-day program, not {} days",
                split.split_name, split.workout_days, workout_days
            ),
        });
    }
    Ok(())
}

impl ExerciseService {
    /// Create a new ExerciseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Splits scheduled for the given number of days per week
    pub async fn splits_for_days(&self, workout_days: i32) -> AppResult<Vec<Split>> {
        shared::validate_workout_days(workout_days).map_err(|msg| AppError::Validation {
            field: "workout_days".to_string(),
            message: msg.to_string(),
        })?;

        let rows = sqlx::query_as::<_, SplitRow>(
            r#"
            SELECT id, split_name, workout_days, target_gender
            FROM split_library
            WHERE workout_days = $1
            ORDER BY split_name
            "#,
        )
        .bind(workout_days)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Split::from).collect())
    }

    pub async fn split(&self, split_id: Uuid) -> AppResult<Split> {
        sqlx::query_as::<_, SplitRow>(
            "SELECT id, split_name, workout_days, target_gender FROM split_library WHERE id = $1",
        )
        .bind(split_id)
        .fetch_optional(&self.db)
        .await?
        .map(Split::from)
        .ok_or_else(|| AppError::NotFound("Split".to_string()))
    }

    /// A split with every day and its exercises
    pub async fn preview(&self, split_id: Uuid) -> AppResult<SplitPreview> {
        let split = self.split(split_id).await?;

        let rows = sqlx::query_as::<_, ProgramRow>(
            r#"
            SELECT d.day_number, d.day_title,
                   e.id AS exercise_id, e.name, e.muscle_group, e.equipment,
                   e.instructions, e.level, e.exercise_type, sde.order_index
            FROM split_days d
            LEFT JOIN split_day_exercises sde ON sde.split_day_id = d.id
            LEFT JOIN exercise_library e ON e.id = sde.exercise_id
            WHERE d.split_id = $1
            ORDER BY d.day_number, sde.order_index
            "#,
        )
        .bind(split_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SplitPreview {
            split,
            days: group_program(rows),
        })
    }

    /// Record the questionnaire, replacing the member's previous assessment
    pub async fn submit_assessment(
        &self,
        member_id: Uuid,
        input: ExerciseAssessmentInput,
    ) -> AppResult<ExerciseAssessment> {
        let split = self.split(input.split_id).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::Validation {
                field: "split_id".to_string(),
                message: "Unknown split".to_string(),
            },
            other => other,
        })?;
        check_split_matches_days(&split, input.workout_days)?;

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM exercise_assessments WHERE member_id = $1")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, AssessmentRow>(
            r#"
            INSERT INTO exercise_assessments (
                member_id, fitness_level, cardio_preference, workout_days,
                split_id, assigned_split_name, coach_notes, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'confirmed')
            RETURNING id, member_id, fitness_level, cardio_preference, workout_days,
                      split_id, assigned_split_name, coach_notes, status, completed_at
            "#,
        )
        .bind(member_id)
        .bind(input.fitness_level.as_str())
        .bind(input.cardio_preference.map(|c| c.as_str()))
        .bind(input.workout_days)
        .bind(split.id)
        .bind(&split.split_name)
        .bind(input.coach_notes.as_deref().map(str::trim).filter(|n| !n.is_empty()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            member_id = %member_id,
            split = %split.split_name,
            workout_days = input.workout_days,
            "exercise assessment saved"
        );

        row.try_into()
    }

    pub async fn latest_assessment(&self, member_id: Uuid) -> AppResult<ExerciseAssessment> {
        sqlx::query_as::<_, AssessmentRow>(
            r#"
            SELECT id, member_id, fitness_level, cardio_preference, workout_days,
                   split_id, assigned_split_name, coach_notes, status, completed_at
            FROM exercise_assessments
            WHERE member_id = $1
            ORDER BY completed_at DESC
            LIMIT 1
            "#,
        )
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Exercise assessment".to_string()))?
        .try_into()
    }

    /// Latest assessment with its day-by-day program
    pub async fn workout_plan(&self, member_id: Uuid) -> AppResult<WorkoutPlan> {
        let assessment = self.latest_assessment(member_id).await?;
        let program = self.preview(assessment.split_id).await?;
        Ok(WorkoutPlan { assessment, program })
    }

    pub async fn status(&self, member_id: Uuid) -> AppResult<CompletionStatus> {
        let completed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM exercise_assessments WHERE member_id = $1)",
        )
        .bind(member_id)
        .fetch_one(&self.db)
        .await?;

        Ok(CompletionStatus { completed })
    }

    /// Mark a split day done; repeating the same day is a no-op
    pub async fn complete_day(
        &self,
        member_id: Uuid,
        input: CompleteDayInput,
    ) -> AppResult<CompletionRecorded> {
        let split_name = input.split_name.trim().to_string();
        if split_name.is_empty() {
            return Err(AppError::Validation {
                field: "split_name".to_string(),
                message: "Split name is required".to_string(),
            });
        }
        let completion_date = input
            .completion_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let inserted = sqlx::query(
            r#"
            INSERT INTO exercise_day_completions (member_id, split_name, completion_date)
            VALUES ($1, $2, $3)
            ON CONFLICT (member_id, split_name, completion_date) DO NOTHING
            "#,
        )
        .bind(member_id)
        .bind(&split_name)
        .bind(completion_date)
        .execute(&self.db)
        .await?
        .rows_affected();

        Ok(CompletionRecorded {
            completion: ExerciseCompletion {
                split_name,
                completion_date,
            },
            already_completed: inserted == 0,
        })
    }

    pub async fn completions(&self, member_id: Uuid) -> AppResult<BTreeMap<String, String>> {
        let rows = sqlx::query_as::<_, (String, NaiveDate)>(
            r#"
            SELECT split_name, completion_date
            FROM exercise_day_completions
            WHERE member_id = $1
            ORDER BY completion_date, completed_at
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.db)
        .await?;

        Ok(completions_by_date(
            rows.into_iter()
                .map(|(split_name, completion_date)| ExerciseCompletion {
                    split_name,
                    completion_date,
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: i32, title: &str, name: Option<&str>, order: i32) -> ProgramRow {
        ProgramRow {
            day_number: day,
            day_title: title.to_string(),
            exercise_id: name.map(|_| Uuid::new_v4()),
            name: name.map(str::to_string),
            muscle_group: None,
            equipment: None,
            instructions: None,
            level: None,
            exercise_type: None,
            order_index: name.map(|_| order),
        }
    }

    #[test]
    fn program_rows_group_by_day_in_order() {
        let rows = vec![
            slot(2, "Lower", Some("Squat"), 1),
            slot(1, "Upper", Some("Row"), 2),
            slot(1, "Upper", Some("Bench Press"), 1),
            slot(3, "Rest", None, 0),
        ];

        let days = group_program(rows);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].day_title, "Upper");
        assert_eq!(days[0].exercises[0].name, "Bench Press");
        assert_eq!(days[0].exercises[1].name, "Row");
        assert_eq!(days[1].exercises.len(), 1);
        assert!(days[2].exercises.is_empty());
    }

    #[test]
    fn completions_keyed_by_iso_date() {
        let log = completions_by_date(vec![ExerciseCompletion {
            split_name: "Push/Pull/Legs".to_string(),
            completion_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        }]);
        assert_eq!(log.get("2024-03-09").map(String::as_str), Some("Push/Pull/Legs"));
    }

    #[test]
    fn split_days_must_match() {
        let split = Split {
            id: Uuid::new_v4(),
            split_name: "Upper/Lower".to_string(),
            workout_days: 4,
            target_gender: None,
        };
        assert!(check_split_matches_days(&split, 4).is_ok());
        assert!(matches!(
            check_split_matches_days(&split, 3),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn stored_assessment_row_parses() {
        let row = AssessmentRow {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            fitness_level: "intermediate".to_string(),
            cardio_preference: Some("sometimes".to_string()),
            workout_days: 4,
            split_id: Uuid::new_v4(),
            assigned_split_name: "Upper/Lower".to_string(),
            coach_notes: None,
            status: "confirmed".to_string(),
            completed_at: Utc::now(),
        };
        let assessment = ExerciseAssessment::try_from(row).unwrap();
        assert_eq!(assessment.fitness_level, FitnessLevel::Intermediate);
        assert_eq!(assessment.cardio_preference, Some(CardioPreference::Sometimes));
    }
}
