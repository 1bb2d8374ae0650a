//! Global calorie rescaling

use rust_decimal::Decimal;

use super::portion::Portion;

/// Ratio that brings the provisional calories onto the calorie target
///
/// `None` when the portions carry no calories at all.
pub fn scale_factor(calorie_target: Decimal, portions: &[Portion<'_>]) -> Option<Decimal> {
    let total: Decimal = portions.iter().map(|p| p.nutrients.calories).sum();
    if total <= Decimal::ZERO {
        return None;
    }
    Some(calorie_target / total)
}

pub fn rescale<'a>(portions: Vec<Portion<'a>>, scale: Decimal) -> Vec<Portion<'a>> {
    portions
        .into_iter()
        .map(|p| Portion {
            food: p.food,
            grams: p.grams * scale,
            nutrients: p.nutrients * scale,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectedFood;
    use crate::types::MacroCategory;
    use uuid::Uuid;

    fn rice() -> SelectedFood {
        SelectedFood {
            food_id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            name: "Rice".to_string(),
            category: MacroCategory::Carb,
            calories_per_100g: Decimal::from(130),
            protein_per_100g: Decimal::new(27, 1),
            carbs_per_100g: Decimal::from(28),
            fats_per_100g: Decimal::new(3, 1),
            reference_grams: Decimal::ONE_HUNDRED,
        }
    }

    #[test]
    fn scale_hits_target() {
        let food = rice();
        let portions = vec![Portion {
            food: &food,
            grams: Decimal::from(500),
            nutrients: food.nutrients_for(Decimal::from(500)),
        }];
        let scale = scale_factor(Decimal::from(1300), &portions).unwrap();
        assert_eq!(scale, Decimal::from(2));

        let scaled = rescale(portions, scale);
        assert_eq!(scaled[0].grams, Decimal::from(1000));
        assert_eq!(scaled[0].nutrients.calories, Decimal::from(1300));
    }

    #[test]
    fn no_calories_means_no_scale() {
        assert_eq!(scale_factor(Decimal::from(2000), &[]), None);
    }
}
