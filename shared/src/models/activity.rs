//! Gym visits, payments and the member's activity log

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{SystemType, TransactionType};

/// A payment recorded against the member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberTransaction {
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub subscription_type: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// One pass through a gym's turnstile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GymEntry {
    pub id: Uuid,
    pub gym_name: Option<String>,
    pub entry_time: DateTime<Utc>,
    /// Charged to a prepaid balance; zero for subscribers
    pub deducted_amount: Decimal,
}

/// A gym visit as shown in the member's history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GymVisit {
    pub id: Uuid,
    pub label: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&GymEntry> for GymVisit {
    fn from(entry: &GymEntry) -> Self {
        let gym_name = entry
            .gym_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown");

        GymVisit {
            id: entry.id,
            label: format!("Visited {} Gym", gym_name),
            timestamp: entry.entry_time,
        }
    }
}

/// A line of the activity log; negative amounts are deductions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityLogEntry {
    pub label: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<String>,
}

/// Prepaid balance of the member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberBalance {
    pub balance: Decimal,
}

/// The member's subscription, if they have one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionStatus {
    pub full_name: String,
    pub system_type: SystemType,
    pub subscription_type: Option<String>,
    pub subscription_expiry: Option<DateTime<Utc>>,
    pub active: bool,
}

impl SubscriptionStatus {
    pub fn new(
        full_name: String,
        system_type: SystemType,
        subscription_type: Option<String>,
        subscription_expiry: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let active = system_type == SystemType::Subscription
            && subscription_expiry.is_some_and(|expiry| expiry > now);
        Self {
            full_name,
            system_type,
            subscription_type,
            subscription_expiry,
            active,
        }
    }
}

fn transaction_label(transaction: &MemberTransaction) -> String {
    let base = match transaction.transaction_type {
        TransactionType::NewMember | TransactionType::NewSubscription => "Activation",
        TransactionType::TopUp => "Tap Up",
        TransactionType::RenewSubscription => "Subscription",
    };
    if transaction.transaction_type.system() != SystemType::Subscription {
        return base.to_string();
    }
    match transaction.subscription_type.as_deref().map(str::trim) {
        Some(plan) if !plan.is_empty() => format!("{}: {}", base, plan),
        _ => base.to_string(),
    }
}

/// Merge payments and gym entries into one log, newest first
///
/// Only payments of the member's payment system are listed. Gym entries
/// appear as deductions for prepaid members and are left out for
/// subscribers, whose entries cost nothing.
pub fn build_activity_log(
    system: SystemType,
    transactions: &[MemberTransaction],
    entries: &[GymEntry],
) -> Vec<ActivityLogEntry> {
    let mut log: Vec<ActivityLogEntry> = transactions
        .iter()
        .filter(|t| t.transaction_type.system() == system)
        .map(|t| ActivityLogEntry {
            label: transaction_label(t),
            amount: t.amount,
            timestamp: t.timestamp,
            subscription_type: t.subscription_type.clone(),
        })
        .collect();

    if system == SystemType::PrepaidEntry {
        log.extend(entries.iter().map(|e| ActivityLogEntry {
            label: "Gym Entry".to_string(),
            amount: -e.deducted_amount.abs(),
            timestamp: e.entry_time,
            subscription_type: None,
        }));
    }

    // Stable, so same-instant rows keep payments ahead of entries
    log.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, hour, 0, 0).unwrap()
    }

    fn payment(kind: TransactionType, amount: i64, plan: Option<&str>, hour: u32) -> MemberTransaction {
        MemberTransaction {
            transaction_type: kind,
            amount: Decimal::from(amount),
            subscription_type: plan.map(str::to_string),
            timestamp: at(hour),
        }
    }

    fn entry(gym: Option<&str>, deducted: i64, hour: u32) -> GymEntry {
        GymEntry {
            id: Uuid::new_v4(),
            gym_name: gym.map(str::to_string),
            entry_time: at(hour),
            deducted_amount: Decimal::from(deducted),
        }
    }

    #[test]
    fn visits_name_the_gym() {
        assert_eq!(GymVisit::from(&entry(Some("Downtown"), 0, 9)).label, "Visited Downtown Gym");
        assert_eq!(GymVisit::from(&entry(None, 0, 9)).label, "Visited Unknown Gym");
        assert_eq!(GymVisit::from(&entry(Some("  "), 0, 9)).label, "Visited Unknown Gym");
    }

    #[test]
    fn prepaid_log_mixes_top_ups_and_entries() {
        let transactions = vec![
            payment(TransactionType::NewMember, 500, None, 8),
            payment(TransactionType::TopUp, 200, None, 12),
            payment(TransactionType::RenewSubscription, 999, Some("Monthly"), 13),
        ];
        let entries = vec![entry(Some("Downtown"), 50, 10)];

        let log = build_activity_log(SystemType::PrepaidEntry, &transactions, &entries);
        let labels: Vec<&str> = log.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Tap Up", "Gym Entry", "Activation"]);
        assert_eq!(log[1].amount, Decimal::from(-50));
        assert_eq!(log[0].amount, Decimal::from(200));
    }

    #[test]
    fn subscription_log_names_the_plan() {
        let transactions = vec![
            payment(TransactionType::NewSubscription, 1500, Some("Quarterly"), 8),
            payment(TransactionType::RenewSubscription, 1500, None, 11),
            payment(TransactionType::TopUp, 100, None, 12),
        ];
        let entries = vec![entry(Some("Downtown"), 0, 10)];

        let log = build_activity_log(SystemType::Subscription, &transactions, &entries);
        let labels: Vec<&str> = log.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Subscription", "Activation: Quarterly"]);
        assert_eq!(log[1].subscription_type.as_deref(), Some("Quarterly"));
    }

    #[test]
    fn empty_history_gives_empty_log() {
        assert!(build_activity_log(SystemType::PrepaidEntry, &[], &[]).is_empty());
    }

    #[test]
    fn subscription_is_active_until_expiry() {
        let status = |system, expiry| {
            SubscriptionStatus::new("Jordan".to_string(), system, None, expiry, at(12))
        };
        assert!(status(SystemType::Subscription, Some(at(13))).active);
        assert!(!status(SystemType::Subscription, Some(at(12))).active);
        assert!(!status(SystemType::Subscription, None).active);
        assert!(!status(SystemType::PrepaidEntry, Some(at(13))).active);
    }
}
