use crate::{Error, Item, ItemId, Result};
use ahash::AHashSet;
use std::path::Path;

/// Immutable, ordered product catalog plus the per-item searchable text.
///
/// Position `i` in [`Catalog::items`] and [`Catalog::texts`] always refers to
/// the same product; the similarity index relies on that alignment.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    texts: Vec<String>,
}

impl Catalog {
    /// Build a catalog from items in their canonical order.
    ///
    /// Rejects duplicate ids and negative or non-finite prices. An empty
    /// item list is accepted here; the index build is what refuses it.
    pub fn new(items: Vec<Item>) -> Result<Self> {
        let mut seen: AHashSet<ItemId> = AHashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(Error::Catalog(format!("duplicate item id {}", item.id)));
            }
            if !item.price.is_finite() || item.price < 0.0 {
                return Err(Error::Catalog(format!(
                    "item {} has invalid price {}",
                    item.id, item.price
                )));
            }
        }

        let texts = items.iter().map(Item::searchable_text).collect();
        Ok(Self { items, texts })
    }

    /// Parse a JSON array of items.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let items: Vec<Item> = serde_json::from_str(json)?;
        Self::new(items)
    }

    /// Load a JSON catalog file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Item> {
        self.items.get(position)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn searchable_text(&self, position: usize) -> Option<&str> {
        self.texts.get(position).map(String::as_str)
    }

    /// Position of the item with the given id, if present.
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_items() -> Vec<Item> {
        vec![
            Item::new(1, "Red Summer Dress", "dresses", 59.0).with_tags(&["dress", "summer"]),
            Item::new(2, "Black Leather Boots", "footwear", 180.0).with_tags(&["boots", "leather"]),
        ]
    }

    #[test]
    fn test_texts_aligned_with_items() {
        let catalog = Catalog::new(sample_items()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.texts().len(), 2);
        for (i, item) in catalog.items().iter().enumerate() {
            assert_eq!(catalog.searchable_text(i).unwrap(), item.searchable_text());
        }
        assert_eq!(catalog.position_of(2), Some(1));
        assert_eq!(catalog.position_of(99), None);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut items = sample_items();
        items.push(Item::new(1, "Another", "misc", 1.0));
        assert!(matches!(Catalog::new(items), Err(Error::Catalog(_))));
    }

    #[test]
    fn test_negative_price_rejected() {
        let items = vec![Item::new(1, "Broken", "misc", -3.0)];
        assert!(matches!(Catalog::new(items), Err(Error::Catalog(_))));
    }

    #[test]
    fn test_empty_catalog_loads() {
        let catalog = Catalog::from_json_str("[]").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let result = Catalog::from_json_str("{not json");
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&sample_items()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().name, "Red Summer Dress");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Catalog::load("/definitely/not/here/products.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
