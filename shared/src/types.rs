//! Common types used across the platform

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category a food group belongs to for nutrition planning
///
/// Variant order is the order results are presented in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MacroCategory {
    Protein,
    Carb,
    Fruit,
    Vegetable,
}

impl MacroCategory {
    pub const ALL: [MacroCategory; 4] = [
        MacroCategory::Protein,
        MacroCategory::Carb,
        MacroCategory::Fruit,
        MacroCategory::Vegetable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MacroCategory::Protein => "protein",
            MacroCategory::Carb => "carb",
            MacroCategory::Fruit => "fruit",
            MacroCategory::Vegetable => "vegetable",
        }
    }

    /// Whether foods of this category are scored on carbohydrate content
    pub fn is_carbohydrate_source(&self) -> bool {
        !matches!(self, MacroCategory::Protein)
    }
}

impl fmt::Display for MacroCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored or submitted label is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for MacroCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protein" => Ok(MacroCategory::Protein),
            "carb" | "carbs" | "carbohydrate" => Ok(MacroCategory::Carb),
            "fruit" | "fruits" => Ok(MacroCategory::Fruit),
            "vegetable" | "vegetables" => Ok(MacroCategory::Vegetable),
            other => Err(UnknownVariant {
                kind: "macro category",
                value: other.to_string(),
            }),
        }
    }
}

/// Diet chosen in the nutrition questionnaire
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DietType {
    #[default]
    Balanced,
    Vegetarian,
    NoRedMeat,
}

impl DietType {
    pub const ALL: [DietType; 3] = [DietType::Balanced, DietType::Vegetarian, DietType::NoRedMeat];

    pub fn label(&self) -> &'static str {
        match self {
            DietType::Balanced => "Balanced",
            DietType::Vegetarian => "Vegetarian",
            DietType::NoRedMeat => "No Red Meat",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DietType::Balanced => "balanced",
            DietType::Vegetarian => "vegetarian",
            DietType::NoRedMeat => "no_red_meat",
        }
    }
}

impl FromStr for DietType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "balanced" => Ok(DietType::Balanced),
            "vegetarian" => Ok(DietType::Vegetarian),
            "no_red_meat" => Ok(DietType::NoRedMeat),
            _ => Err(UnknownVariant {
                kind: "diet type",
                value: s.to_string(),
            }),
        }
    }
}

/// Self-reported training experience
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    pub const ALL: [FitnessLevel; 3] = [
        FitnessLevel::Beginner,
        FitnessLevel::Intermediate,
        FitnessLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "beginner",
            FitnessLevel::Intermediate => "intermediate",
            FitnessLevel::Advanced => "advanced",
        }
    }
}

impl FromStr for FitnessLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(FitnessLevel::Beginner),
            "intermediate" => Ok(FitnessLevel::Intermediate),
            "advanced" => Ok(FitnessLevel::Advanced),
            _ => Err(UnknownVariant {
                kind: "fitness level",
                value: s.to_string(),
            }),
        }
    }
}

/// Answer to "do you do cardio?"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardioPreference {
    Yes,
    No,
    Sometimes,
}

impl CardioPreference {
    pub const ALL: [CardioPreference; 3] = [
        CardioPreference::Yes,
        CardioPreference::No,
        CardioPreference::Sometimes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardioPreference::Yes => "yes",
            CardioPreference::No => "no",
            CardioPreference::Sometimes => "sometimes",
        }
    }
}

impl FromStr for CardioPreference {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(CardioPreference::Yes),
            "no" => Ok(CardioPreference::No),
            "sometimes" => Ok(CardioPreference::Sometimes),
            _ => Err(UnknownVariant {
                kind: "cardio preference",
                value: s.to_string(),
            }),
        }
    }
}

/// Biological sex used for calorie maintenance estimates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(UnknownVariant {
                kind: "sex",
                value: s.to_string(),
            }),
        }
    }
}

/// Purpose a one-time password was issued for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Login,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Login => "login",
            OtpPurpose::PasswordReset => "password_reset",
        }
    }
}

/// How a member pays for gym access
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SystemType {
    /// Balance topped up in advance, charged per entry
    #[default]
    PrepaidEntry,
    Subscription,
}

impl SystemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemType::PrepaidEntry => "prepaid_entry",
            SystemType::Subscription => "subscription",
        }
    }
}

impl FromStr for SystemType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prepaid_entry" => Ok(SystemType::PrepaidEntry),
            "subscription" => Ok(SystemType::Subscription),
            _ => Err(UnknownVariant {
                kind: "system type",
                value: s.to_string(),
            }),
        }
    }
}

/// Kind of payment recorded against a member
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    NewMember,
    TopUp,
    NewSubscription,
    RenewSubscription,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::NewMember => "new_member",
            TransactionType::TopUp => "top_up",
            TransactionType::NewSubscription => "new_subscription",
            TransactionType::RenewSubscription => "renew_subscription",
        }
    }

    /// The payment system this kind of transaction belongs to
    pub fn system(&self) -> SystemType {
        match self {
            TransactionType::NewMember | TransactionType::TopUp => SystemType::PrepaidEntry,
            TransactionType::NewSubscription | TransactionType::RenewSubscription => {
                SystemType::Subscription
            }
        }
    }
}

impl FromStr for TransactionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new_member" => Ok(TransactionType::NewMember),
            "top_up" => Ok(TransactionType::TopUp),
            "new_subscription" => Ok(TransactionType::NewSubscription),
            "renew_subscription" => Ok(TransactionType::RenewSubscription),
            _ => Err(UnknownVariant {
                kind: "transaction type",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_type_labels_round_trip_through_storage() {
        for system in [SystemType::PrepaidEntry, SystemType::Subscription] {
            assert_eq!(system.as_str().parse::<SystemType>(), Ok(system));
        }
        assert!("pay_as_you_go".parse::<SystemType>().is_err());
    }

    #[test]
    fn transactions_belong_to_one_system() {
        assert_eq!(TransactionType::TopUp.system(), SystemType::PrepaidEntry);
        assert_eq!(TransactionType::RenewSubscription.system(), SystemType::Subscription);
        assert_eq!("new_member".parse::<TransactionType>(), Ok(TransactionType::NewMember));
    }

    #[test]
    fn macro_category_parses_stored_labels() {
        assert_eq!("protein".parse::<MacroCategory>(), Ok(MacroCategory::Protein));
        assert_eq!(" Carbs ".parse::<MacroCategory>(), Ok(MacroCategory::Carb));
        assert_eq!("VEGETABLE".parse::<MacroCategory>(), Ok(MacroCategory::Vegetable));
        assert!("fat".parse::<MacroCategory>().is_err());
    }

    #[test]
    fn macro_category_orders_for_presentation() {
        let mut categories = vec![
            MacroCategory::Vegetable,
            MacroCategory::Protein,
            MacroCategory::Fruit,
            MacroCategory::Carb,
        ];
        categories.sort();
        assert_eq!(categories, MacroCategory::ALL.to_vec());
    }

    #[test]
    fn diet_type_accepts_display_labels() {
        assert_eq!("No Red Meat".parse::<DietType>(), Ok(DietType::NoRedMeat));
        assert_eq!("vegetarian".parse::<DietType>(), Ok(DietType::Vegetarian));
        assert!("keto".parse::<DietType>().is_err());
    }
}
