//! Gym visits, payments, balance and subscription of the signed-in member

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    build_activity_log, ActivityLogEntry, GymEntry, GymVisit, MemberBalance, MemberTransaction,
    SubscriptionStatus, SystemType,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ActivityService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct GymEntryRow {
    id: Uuid,
    gym_name: Option<String>,
    entry_time: DateTime<Utc>,
    deducted_amount: Decimal,
}

impl From<GymEntryRow> for GymEntry {
    fn from(row: GymEntryRow) -> Self {
        GymEntry {
            id: row.id,
            gym_name: row.gym_name,
            entry_time: row.entry_time,
            deducted_amount: row.deducted_amount,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    transaction_type: String,
    amount: Decimal,
    subscription_type: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for MemberTransaction {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let transaction_type = row
            .transaction_type
            .parse()
            .map_err(|e: shared::UnknownVariant| AppError::Internal(e.to_string()))?;

        Ok(MemberTransaction {
            transaction_type,
            amount: row.amount,
            subscription_type: row.subscription_type,
            timestamp: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    full_name: String,
    system_type: String,
    current_balance: Decimal,
    subscription_type: Option<String>,
    subscription_expiry: Option<DateTime<Utc>>,
}

/// Parse the `system_type` query value; absent means the member's own system
pub fn parse_system_type(value: Option<&str>) -> AppResult<Option<SystemType>> {
    value
        .map(|v| {
            v.parse().map_err(|_| AppError::Validation {
                field: "system_type".to_string(),
                message: format!("Invalid system_type '{}'", v),
            })
        })
        .transpose()
}

impl ActivityService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Gym visits, newest first
    pub async fn gym_visits(&self, member_id: Uuid) -> AppResult<Vec<GymVisit>> {
        let entries = self.gym_entries(member_id).await?;
        tracing::debug!(member_id = %member_id, count = entries.len(), "loaded gym visits");
        Ok(entries.iter().map(GymVisit::from).collect())
    }

    /// Payments and entry charges, newest first
    ///
    /// `system` defaults to the member's own payment system.
    pub async fn activity_log(
        &self,
        member_id: Uuid,
        system: Option<SystemType>,
    ) -> AppResult<Vec<ActivityLogEntry>> {
        let system = match system {
            Some(system) => system,
            None => self.account_system(&self.account(member_id).await?)?,
        };

        let transactions = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT transaction_type, amount, subscription_type, created_at
            FROM member_transactions
            WHERE member_id = $1
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(MemberTransaction::try_from)
        .collect::<AppResult<Vec<_>>>()?;

        let entries = match system {
            SystemType::PrepaidEntry => self.gym_entries(member_id).await?,
            SystemType::Subscription => Vec::new(),
        };

        Ok(build_activity_log(system, &transactions, &entries))
    }

    pub async fn balance(&self, member_id: Uuid) -> AppResult<MemberBalance> {
        let account = self.account(member_id).await?;
        Ok(MemberBalance {
            balance: account.current_balance,
        })
    }

    pub async fn subscription(&self, member_id: Uuid) -> AppResult<SubscriptionStatus> {
        let account = self.account(member_id).await?;
        let system_type = self.account_system(&account)?;
        Ok(SubscriptionStatus::new(
            account.full_name,
            system_type,
            account.subscription_type,
            account.subscription_expiry,
            Utc::now(),
        ))
    }

    async fn gym_entries(&self, member_id: Uuid) -> AppResult<Vec<GymEntry>> {
        let rows = sqlx::query_as::<_, GymEntryRow>(
            r#"
            SELECT e.id, g.gym_name, e.entry_time, e.deducted_amount
            FROM gym_entry_logs e
            LEFT JOIN gyms g ON g.id = e.gym_id
            WHERE e.member_id = $1
            ORDER BY e.entry_time DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(GymEntry::from).collect())
    }

    async fn account(&self, member_id: Uuid) -> AppResult<AccountRow> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT full_name, system_type, current_balance, subscription_type, subscription_expiry
            FROM members
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Member".to_string()))
    }

    fn account_system(&self, account: &AccountRow) -> AppResult<SystemType> {
        account
            .system_type
            .parse()
            .map_err(|e: shared::UnknownVariant| AppError::Internal(e.to_string()))
    }
}
