use serde::{Deserialize, Serialize};

/// Stable catalog identifier
pub type ItemId = u64;

/// A catalog product. Never mutated once the catalog is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub occasions: Vec<String>,
    #[serde(default)]
    pub seasons: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub stock: u32,
}

impl Item {
    /// Minimal item, mostly useful for building fixtures.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            price,
            category: category.into(),
            subcategory: None,
            gender: None,
            colors: Vec::new(),
            sizes: Vec::new(),
            tags: Vec::new(),
            occasions: Vec::new(),
            seasons: Vec::new(),
            materials: Vec::new(),
            rating: 0.0,
            reviews: 0,
            stock: 0,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: &[&str]) -> Self {
        self.colors = to_strings(colors);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = to_strings(tags);
        self
    }

    #[must_use]
    pub fn with_occasions(mut self, occasions: &[&str]) -> Self {
        self.occasions = to_strings(occasions);
        self
    }

    #[must_use]
    pub fn with_seasons(mut self, seasons: &[&str]) -> Self {
        self.seasons = to_strings(seasons);
        self
    }

    #[must_use]
    pub fn with_materials(mut self, materials: &[&str]) -> Self {
        self.materials = to_strings(materials);
        self
    }

    /// The text fed to the encoder for this item.
    ///
    /// Fields are joined with single spaces in a fixed order; absent
    /// optional fields contribute an empty segment.
    pub fn searchable_text(&self) -> String {
        let tags = self.tags.join(" ");
        let occasions = self.occasions.join(" ");
        let seasons = self.seasons.join(" ");
        let materials = self.materials.join(" ");
        let colors = self.colors.join(" ");
        let parts = [
            self.name.as_str(),
            self.description.as_str(),
            self.category.as_str(),
            self.subcategory.as_deref().unwrap_or(""),
            self.gender.as_deref().unwrap_or(""),
            tags.as_str(),
            occasions.as_str(),
            seasons.as_str(),
            materials.as_str(),
            colors.as_str(),
        ];
        parts.join(" ")
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searchable_text_field_order() {
        let item = Item::new(1, "Red Summer Dress", "dresses", 59.0)
            .with_description("Light and flowy")
            .with_subcategory("midi")
            .with_tags(&["dress", "summer"])
            .with_occasions(&["beach"])
            .with_seasons(&["summer"])
            .with_materials(&["linen"])
            .with_colors(&["red", "dark red"]);

        assert_eq!(
            item.searchable_text(),
            "Red Summer Dress Light and flowy dresses midi  dress summer beach summer linen red dark red"
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{
            "id": 7,
            "name": "Canvas Tote",
            "description": "Everyday bag",
            "price": 25.5,
            "category": "accessories"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 7);
        assert!(item.subcategory.is_none());
        assert!(item.tags.is_empty());
        assert_eq!(item.reviews, 0);
        assert_eq!(item.rating, 0.0);
    }
}
