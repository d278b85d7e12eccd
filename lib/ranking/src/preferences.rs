//! Per-request user preferences
//!
//! The wire format is an open JSON object. Only `favorite_colors` and
//! `budget` are recognized; anything else, including recognized keys with
//! the wrong shape, is ignored rather than rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared spending tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Low,
    Medium,
    High,
}

impl Budget {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Budget::Low),
            "medium" => Some(Budget::Medium),
            "high" => Some(Budget::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct UserPreferences {
    /// Lower-cased, non-empty preferred colors, otherwise verbatim
    pub favorite_colors: Vec<String>,
    pub budget: Option<Budget>,
}

impl UserPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_favorite_colors(mut self, colors: &[&str]) -> Self {
        self.favorite_colors = colors
            .iter()
            .map(|c| c.to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.favorite_colors.is_empty() && self.budget.is_none()
    }

    /// Lenient parse from an arbitrary JSON value. Never fails.
    pub fn from_value(value: &Value) -> Self {
        let favorite_colors = value
            .get("favorite_colors")
            .and_then(Value::as_array)
            .map(|colors| {
                colors
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_lowercase)
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let budget = value
            .get("budget")
            .and_then(Value::as_str)
            .and_then(Budget::parse);

        Self {
            favorite_colors,
            budget,
        }
    }
}

impl From<Value> for UserPreferences {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recognized_keys() {
        let prefs = UserPreferences::from_value(&json!({
            "favorite_colors": ["Black", "navy"],
            "budget": "low"
        }));
        assert_eq!(prefs.favorite_colors, vec!["black", "navy"]);
        assert_eq!(prefs.budget, Some(Budget::Low));
        assert!(!prefs.is_empty());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let prefs = UserPreferences::from_value(&json!({
            "shoe_size": 42,
            "budget": "medium"
        }));
        assert!(prefs.favorite_colors.is_empty());
        assert_eq!(prefs.budget, Some(Budget::Medium));
    }

    #[test]
    fn test_wrong_shapes_mean_no_preference() {
        let prefs = UserPreferences::from_value(&json!({
            "favorite_colors": "red",
            "budget": 3
        }));
        assert!(prefs.is_empty());

        let prefs = UserPreferences::from_value(&json!({
            "favorite_colors": ["red", 7, null, ""],
            "budget": "luxury"
        }));
        assert_eq!(prefs.favorite_colors, vec!["red"]);
        assert_eq!(prefs.budget, None);
    }

    #[test]
    fn test_colors_are_not_trimmed() {
        let prefs = UserPreferences::from_value(&json!({
            "favorite_colors": [" Red", "navy "]
        }));
        assert_eq!(prefs.favorite_colors, vec![" red", "navy "]);
    }

    #[test]
    fn test_non_object_values() {
        assert!(UserPreferences::from_value(&Value::Null).is_empty());
        assert!(UserPreferences::from_value(&json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn test_deserialize_through_serde() {
        let prefs: UserPreferences =
            serde_json::from_str(r#"{"budget": "high", "extra": {"nested": true}}"#).unwrap();
        assert_eq!(prefs.budget, Some(Budget::High));
    }
}
