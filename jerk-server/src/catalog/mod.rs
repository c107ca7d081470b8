//! 菜品目录 - 内置预设菜单 + 持久化覆盖
//!
//! 覆盖项与预设同 id 时替换预设，新 id 则追加。
//! 删除覆盖项后预设恢复。

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{FoodItem, FoodItemUpsert};
use std::collections::BTreeMap;
use validator::Validate;

use crate::store::{Collection, DataStore};

/// (id, name, description, price in cents, category)
const PRESETS: &[(&str, &str, &str, i64, &str)] = &[
    ("jerk-chicken", "Jerk Chicken", "Quarter chicken, pimento-smoked", 1299, "Mains"),
    ("jerk-pork", "Jerk Pork", "Slow-smoked pork shoulder", 1399, "Mains"),
    ("oxtail", "Oxtail", "Braised oxtail with butter beans", 1899, "Mains"),
    ("curry-goat", "Curry Goat", "Bone-in goat, Jamaican curry", 1699, "Mains"),
    ("escovitch-fish", "Escovitch Fish", "Fried snapper, pickled peppers", 1799, "Mains"),
    ("rice-and-peas", "Rice and Peas", "Coconut rice with kidney beans", 399, "Sides"),
    ("festival", "Festival", "Sweet fried dumplings", 349, "Sides"),
    ("fried-plantains", "Fried Plantains", "Sweet ripe plantains", 399, "Sides"),
    ("steamed-cabbage", "Steamed Cabbage", "Cabbage with carrots and thyme", 349, "Sides"),
    ("beef-patty", "Beef Patty", "Flaky spiced beef pastry", 449, "Patties"),
    ("coco-bread", "Coco Bread", "Soft coconut milk bread", 249, "Patties"),
    ("sorrel", "Sorrel", "Hibiscus ginger drink", 349, "Drinks"),
    ("ginger-beer", "Ginger Beer", "House-brewed", 299, "Drinks"),
];

/// Compiled-in menu
pub fn preset_items() -> Vec<FoodItem> {
    PRESETS
        .iter()
        .map(|(id, name, description, cents, category)| FoodItem {
            id: (*id).to_string(),
            name: (*name).to_string(),
            description: Some((*description).to_string()),
            price: Decimal::new(*cents, 2),
            category: (*category).to_string(),
            available: true,
        })
        .collect()
}

fn sort_items(items: &mut [FoodItem]) {
    items.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Presets merged with overrides (override wins by id)
pub fn merge_items(presets: Vec<FoodItem>, overrides: Vec<FoodItem>) -> Vec<FoodItem> {
    let mut by_id: BTreeMap<String, FoodItem> =
        presets.into_iter().map(|i| (i.id.clone(), i)).collect();
    for item in overrides {
        by_id.insert(item.id.clone(), item);
    }
    let mut items: Vec<FoodItem> = by_id.into_values().collect();
    sort_items(&mut items);
    items
}

#[derive(Debug, Clone)]
pub struct CatalogService {
    store: DataStore,
}

impl CatalogService {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Full menu, sorted by category then name
    pub async fn list(&self) -> AppResult<Vec<FoodItem>> {
        let overrides: Vec<FoodItem> = self.store.list(Collection::FoodItems).await?;
        Ok(merge_items(preset_items(), overrides))
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<FoodItem>> {
        if let Some(item) = self.store.get::<FoodItem>(Collection::FoodItems, id).await? {
            return Ok(Some(item));
        }
        Ok(preset_items().into_iter().find(|i| i.id == id))
    }

    /// Insert or replace an override
    pub async fn upsert(&self, id: &str, data: FoodItemUpsert) -> AppResult<FoodItem> {
        data.validate()?;
        if id.trim().is_empty() {
            return Err(AppError::validation("Food item id must not be empty"));
        }
        if data.price.is_sign_negative() {
            return Err(AppError::with_message(
                ErrorCode::FoodItemInvalidPrice,
                "Price must not be negative",
            )
            .with_detail("price", data.price.to_string()));
        }

        let item = data.into_item(id);
        self.store.put(Collection::FoodItems, id, &item).await?;
        tracing::info!(food_item_id = %id, name = %item.name, "Food item override saved");
        Ok(item)
    }

    /// Remove an override (a preset with the same id becomes visible again)
    pub async fn remove_override(&self, id: &str) -> AppResult<()> {
        if !self.store.delete(Collection::FoodItems, id).await? {
            return Err(AppError::with_message(
                ErrorCode::FoodItemNotFound,
                format!("No override for food item {id}"),
            )
            .with_detail("id", id));
        }
        tracing::info!(food_item_id = %id, "Food item override removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    fn service() -> CatalogService {
        CatalogService::new(DataStore::local_only(LocalStore::open_in_memory().unwrap()))
    }

    fn upsert(name: &str, cents: i64, category: &str) -> FoodItemUpsert {
        FoodItemUpsert {
            name: name.into(),
            description: None,
            price: Decimal::new(cents, 2),
            category: category.into(),
            available: None,
        }
    }

    #[test]
    fn test_presets_are_unique_and_sorted() {
        let items = merge_items(preset_items(), vec![]);
        assert_eq!(items.len(), PRESETS.len());
        let mut ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PRESETS.len());

        assert_eq!(items[0].category, "Drinks");
        assert_eq!(items[0].name, "Ginger Beer");
    }

    #[tokio::test]
    async fn test_override_replaces_preset() {
        let svc = service();
        svc.upsert("jerk-chicken", upsert("Jerk Chicken (Half)", 1899, "Mains"))
            .await
            .unwrap();

        let items = svc.list().await.unwrap();
        assert_eq!(items.len(), PRESETS.len());
        let chicken = items.iter().find(|i| i.id == "jerk-chicken").unwrap();
        assert_eq!(chicken.name, "Jerk Chicken (Half)");
        assert_eq!(chicken.price, Decimal::new(1899, 2));

        svc.remove_override("jerk-chicken").await.unwrap();
        let chicken = svc.get("jerk-chicken").await.unwrap().unwrap();
        assert_eq!(chicken.name, "Jerk Chicken");
    }

    #[tokio::test]
    async fn test_new_item_is_added() {
        let svc = service();
        svc.upsert("bammy", upsert("Bammy", 299, "Sides")).await.unwrap();
        let items = svc.list().await.unwrap();
        assert_eq!(items.len(), PRESETS.len() + 1);
        assert!(svc.get("bammy").await.unwrap().is_some());
        assert!(svc.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_negative_price_and_unknown_override() {
        let svc = service();
        let err = svc.upsert("x", upsert("X", -100, "Sides")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FoodItemInvalidPrice);

        let err = svc.remove_override("festival").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FoodItemNotFound);
    }
}
