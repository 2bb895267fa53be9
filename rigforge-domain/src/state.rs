use rigforge_types::{CatalogItem, Category, SlotKey};
use std::collections::BTreeMap;

/// The build under construction.
///
/// Threaded by value/`&mut` through every stage of a synthesis; there is no other
/// mutable state. `total` is always the exact sum of the selected prices, and a category
/// is either selected or skipped, never both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    slots: BTreeMap<SlotKey, CatalogItem>,
    skipped: Vec<Category>,
    total: f64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary item of a category.
    pub fn get(&self, category: Category) -> Option<&CatalogItem> {
        self.slots.get(&SlotKey::primary(category))
    }

    pub fn slot(&self, key: SlotKey) -> Option<&CatalogItem> {
        self.slots.get(&key)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.slots.contains_key(&SlotKey::primary(category))
    }

    /// Number of items selected for a category (2 for a dual memory kit).
    pub fn count(&self, category: Category) -> usize {
        self.slots.keys().filter(|k| k.category == category).count()
    }

    /// Combined price of every slot of a category.
    pub fn line_price(&self, category: Category) -> f64 {
        self.slots
            .iter()
            .filter(|(k, _)| k.category == category)
            .map(|(_, item)| item.price)
            .sum()
    }

    pub fn has_dual_kit(&self, category: Category) -> bool {
        self.slots.contains_key(&SlotKey::second(category))
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn skipped(&self) -> &[Category] {
        &self.skipped
    }

    pub fn is_skipped(&self, category: Category) -> bool {
        self.skipped.contains(&category)
    }

    /// Selected slots in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &CatalogItem)> {
        self.slots.iter()
    }

    /// Categories with a primary selection, in canonical order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.slots
            .keys()
            .filter(|k| k.is_primary())
            .map(|k| k.category)
    }

    /// Select a single item, replacing whatever the category held (including a second
    /// module).
    pub fn select(&mut self, item: CatalogItem) {
        let category = item.category();
        self.clear_category(category);
        self.slots.insert(SlotKey::primary(category), item);
        self.unskip(category);
        self.recompute_total();
    }

    /// Select two identical modules of one item.
    pub fn select_pair(&mut self, item: CatalogItem) {
        let category = item.category();
        self.clear_category(category);
        self.slots.insert(SlotKey::second(category), item.clone());
        self.slots.insert(SlotKey::primary(category), item);
        self.unskip(category);
        self.recompute_total();
    }

    /// Drop every slot of a category and return the primary item.
    pub fn remove(&mut self, category: Category) -> Option<CatalogItem> {
        let removed = self.clear_category(category);
        self.recompute_total();
        removed
    }

    pub fn skip(&mut self, category: Category) {
        self.clear_category(category);
        if !self.skipped.contains(&category) {
            self.skipped.push(category);
        }
        self.recompute_total();
    }

    /// Copy of this state with a category removed, used to test alternatives against
    /// "everything else".
    pub fn without(&self, category: Category) -> Self {
        let mut copy = self.clone();
        copy.remove(category);
        copy
    }

    fn clear_category(&mut self, category: Category) -> Option<CatalogItem> {
        let primary = self.slots.remove(&SlotKey::primary(category));
        self.slots.retain(|k, _| k.category != category);
        primary
    }

    fn unskip(&mut self, category: Category) {
        self.skipped.retain(|c| *c != category);
    }

    fn recompute_total(&mut self) {
        self.total = self.slots.values().map(|item| item.price).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigforge_types::item::{Features, MemoryFeatures, StorageFeatures};

    fn memory(id: &str, price: f64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: id.to_string(),
            brand: None,
            price,
            predicted_rating: 4.0,
            ratings: Default::default(),
            features: Features::Memory(MemoryFeatures {
                ram_type: Some("DDR5".to_string()),
                capacity_gb: Some(16),
                frequency_mhz: None,
            }),
        }
    }

    fn storage(id: &str, price: f64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: id.to_string(),
            brand: None,
            price,
            predicted_rating: 4.0,
            ratings: Default::default(),
            features: Features::Storage(StorageFeatures::default()),
        }
    }

    #[test]
    fn pair_counts_both_modules() {
        let mut state = SelectionState::new();
        state.select_pair(memory("ram", 60.0));
        state.select(storage("ssd", 100.0));

        assert_eq!(state.count(Category::Memory), 2);
        assert!(state.has_dual_kit(Category::Memory));
        assert_eq!(state.line_price(Category::Memory), 120.0);
        assert_eq!(state.total(), 220.0);
    }

    #[test]
    fn select_replaces_a_pair_with_one_module() {
        let mut state = SelectionState::new();
        state.select_pair(memory("ram", 60.0));
        state.select(memory("ram-big", 90.0));

        assert_eq!(state.count(Category::Memory), 1);
        assert!(!state.has_dual_kit(Category::Memory));
        assert_eq!(state.total(), 90.0);
    }

    #[test]
    fn skip_and_select_are_exclusive() {
        let mut state = SelectionState::new();
        state.skip(Category::Storage);
        state.skip(Category::Storage);
        assert_eq!(state.skipped(), &[Category::Storage]);

        state.select(storage("ssd", 50.0));
        assert!(state.skipped().is_empty());
        assert!(state.contains(Category::Storage));

        state.skip(Category::Storage);
        assert!(!state.contains(Category::Storage));
        assert_eq!(state.total(), 0.0);
    }

    #[test]
    fn without_leaves_original_untouched() {
        let mut state = SelectionState::new();
        state.select_pair(memory("ram", 60.0));
        let other = state.without(Category::Memory);

        assert_eq!(other.count(Category::Memory), 0);
        assert_eq!(other.total(), 0.0);
        assert_eq!(state.total(), 120.0);
    }
}
