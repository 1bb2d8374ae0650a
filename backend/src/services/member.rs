//! Member profile and onboarding assessment service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{InitialAssessment, InitialAssessmentInput, MemberProfile, Sex, DEFAULT_PROFILE_IMAGE};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct MemberService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    full_name: String,
    email: String,
    rfid_tag: Option<String>,
    profile_image_url: Option<String>,
    created_at: DateTime<Utc>,
    has_initial_assessment: bool,
}

impl From<ProfileRow> for MemberProfile {
    fn from(row: ProfileRow) -> Self {
        MemberProfile {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            rfid_tag: row.rfid_tag,
            profile_image_url: row
                .profile_image_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string()),
            created_at: row.created_at,
            has_initial_assessment: row.has_initial_assessment,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InitialAssessmentRow {
    id: Uuid,
    member_id: Uuid,
    username: String,
    sex: String,
    age: i32,
    height_cm: Decimal,
    weight_kg: Decimal,
    activity_level: Option<String>,
    body_goal: Option<String>,
    goal_type: String,
    calorie_maintenance: Decimal,
    calories_target: Decimal,
    calorie_strategy: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<InitialAssessmentRow> for InitialAssessment {
    type Error = AppError;

    fn try_from(row: InitialAssessmentRow) -> Result<Self, Self::Error> {
        let sex: Sex = row
            .sex
            .parse()
            .map_err(|e: shared::UnknownVariant| AppError::Internal(e.to_string()))?;

        Ok(InitialAssessment {
            id: row.id,
            member_id: row.member_id,
            username: row.username,
            sex,
            age: row.age,
            height_cm: row.height_cm,
            weight_kg: row.weight_kg,
            activity_level: row.activity_level,
            body_goal: row.body_goal,
            goal_type: row.goal_type,
            calorie_maintenance: row.calorie_maintenance,
            calories_target: row.calories_target,
            calorie_strategy: row.calorie_strategy,
            created_at: row.created_at,
        })
    }
}

const INITIAL_ASSESSMENT_COLUMNS: &str = "id, member_id, username, sex, age, height_cm, weight_kg, \
     activity_level, body_goal, goal_type, calorie_maintenance, calories_target, \
     calorie_strategy, created_at";

impl MemberService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_profile(&self, member_id: Uuid) -> AppResult<MemberProfile> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT m.id, m.full_name, m.email, m.rfid_tag, m.profile_image_url, m.created_at,
                   EXISTS (SELECT 1 FROM initial_assessments ia WHERE ia.member_id = m.id)
                       AS has_initial_assessment
            FROM members m
            WHERE m.id = $1 AND m.is_active
            "#,
        )
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Member".to_string()))?;

        Ok(row.into())
    }

    /// Record the onboarding assessment, replacing any earlier one
    pub async fn save_initial_assessment(
        &self,
        member_id: Uuid,
        input: InitialAssessmentInput,
    ) -> AppResult<InitialAssessment> {
        shared::validate_calorie_target(input.calories_target).map_err(|msg| AppError::Validation {
            field: "calories_target".to_string(),
            message: msg.to_string(),
        })?;

        let username = sqlx::query_scalar::<_, String>("SELECT full_name FROM members WHERE id = $1")
            .bind(member_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Member".to_string()))?;

        let row = sqlx::query_as::<_, InitialAssessmentRow>(&format!(
            r#"
            INSERT INTO initial_assessments (
                member_id, username, sex, age, height_cm, weight_kg, activity_level,
                body_goal, goal_type, calorie_maintenance, calories_target, calorie_strategy
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (member_id) DO UPDATE SET
                username = EXCLUDED.username,
                sex = EXCLUDED.sex,
                age = EXCLUDED.age,
                height_cm = EXCLUDED.height_cm,
                weight_kg = EXCLUDED.weight_kg,
                activity_level = EXCLUDED.activity_level,
                body_goal = EXCLUDED.body_goal,
                goal_type = EXCLUDED.goal_type,
                calorie_maintenance = EXCLUDED.calorie_maintenance,
                calories_target = EXCLUDED.calories_target,
                calorie_strategy = EXCLUDED.calorie_strategy,
                created_at = NOW()
            RETURNING {INITIAL_ASSESSMENT_COLUMNS}
            "#
        ))
        .bind(member_id)
        .bind(&username)
        .bind(input.sex.as_str())
        .bind(input.age)
        .bind(input.height_cm)
        .bind(input.weight_kg)
        .bind(&input.activity_level)
        .bind(&input.body_goal)
        .bind(input.goal_type.trim())
        .bind(input.calorie_maintenance)
        .bind(input.calories_target)
        .bind(&input.calorie_strategy)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(member_id = %member_id, goal_type = %row.goal_type, "initial assessment saved");

        row.try_into()
    }

    pub async fn get_initial_assessment(&self, member_id: Uuid) -> AppResult<Option<InitialAssessment>> {
        sqlx::query_as::<_, InitialAssessmentRow>(&format!(
            "SELECT {INITIAL_ASSESSMENT_COLUMNS} FROM initial_assessments WHERE member_id = $1"
        ))
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?
        .map(InitialAssessment::try_from)
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_row(image: Option<&str>) -> ProfileRow {
        ProfileRow {
            id: Uuid::new_v4(),
            full_name: "Nok Srisuk".to_string(),
            email: "nok@swiftpass.gym".to_string(),
            rfid_tag: Some("04A1B2C3".to_string()),
            profile_image_url: image.map(str::to_string),
            created_at: Utc::now(),
            has_initial_assessment: false,
        }
    }

    #[test]
    fn missing_image_falls_back_to_default() {
        let profile: MemberProfile = profile_row(None).into();
        assert_eq!(profile.profile_image_url, DEFAULT_PROFILE_IMAGE);

        let blank: MemberProfile = profile_row(Some("  ")).into();
        assert_eq!(blank.profile_image_url, DEFAULT_PROFILE_IMAGE);
    }

    #[test]
    fn uploaded_image_is_kept() {
        let profile: MemberProfile = profile_row(Some("uploads/members/nok.jpg")).into();
        assert_eq!(profile.profile_image_url, "uploads/members/nok.jpg");
    }
}
