//! Personalization boost
//!
//! Additive score adjustments derived from [`UserPreferences`]. The color
//! rule and the budget rule fire independently; at most one budget rule can
//! fire because the budget is a single tier.

use crate::preferences::{Budget, UserPreferences};
use shopkeeper_core::Item;

pub const COLOR_BOOST: f64 = 0.05;
pub const LOW_BUDGET_BOOST: f64 = 0.05;
pub const MEDIUM_BUDGET_BOOST: f64 = 0.03;
pub const HIGH_BUDGET_BOOST: f64 = 0.02;

/// Strictly below this price counts as low budget
pub const LOW_BUDGET_MAX_PRICE: f64 = 80.0;
/// Inclusive medium budget price range
pub const MEDIUM_BUDGET_RANGE: (f64, f64) = (50.0, 200.0);
/// Strictly above this price counts as high budget
pub const HIGH_BUDGET_MIN_PRICE: f64 = 150.0;

/// Score adjustment for `item` under `preferences`. Zero when nothing applies.
pub fn boost(item: &Item, preferences: &UserPreferences) -> f64 {
    let mut adjustment = 0.0;
    if color_matches(item, &preferences.favorite_colors) {
        adjustment += COLOR_BOOST;
    }
    if let Some(budget) = preferences.budget {
        adjustment += budget_boost(budget, item.price);
    }
    adjustment
}

/// A preferred color matches when it is a substring of one of the item's
/// colors, so "red" matches "dark red" but "dark red" does not match "red".
/// `favorite_colors` is expected lower-cased.
fn color_matches(item: &Item, favorite_colors: &[String]) -> bool {
    if favorite_colors.is_empty() {
        return false;
    }
    item.colors.iter().any(|color| {
        let color = color.to_lowercase();
        favorite_colors.iter().any(|fav| color.contains(fav.as_str()))
    })
}

fn budget_boost(budget: Budget, price: f64) -> f64 {
    let (lo, hi) = MEDIUM_BUDGET_RANGE;
    match budget {
        Budget::Low if price < LOW_BUDGET_MAX_PRICE => LOW_BUDGET_BOOST,
        Budget::Medium if (lo..=hi).contains(&price) => MEDIUM_BUDGET_BOOST,
        Budget::High if price > HIGH_BUDGET_MIN_PRICE => HIGH_BUDGET_BOOST,
        _ => 0.0,
    }
}
