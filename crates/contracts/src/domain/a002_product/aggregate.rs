use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::a001_category::aggregate::CategoryId;
use crate::domain::common::{AggregateId, AggregateRoot};

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор товара (выдаётся сервисом данных)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl AggregateId for ProductId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        <i64 as AggregateId>::from_string(s).map(ProductId)
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Товар каталога
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Имя объекта в хранилище изображений
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn description(&self) -> &str {
        &self.title
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "products"
    }

    fn order_column() -> &'static str {
        "title"
    }

    fn element_name() -> &'static str {
        "Товар"
    }

    fn list_name() -> &'static str {
        "Товары"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления товара (тело insert/update)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub category_id: CategoryId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_row_with_nulls() {
        let row = serde_json::json!({
            "id": 42,
            "title": "Lego",
            "description": "Bricks",
            "price": 19.9,
            "image_url": null,
            "category_id": null
        });
        let product: Product = serde_json::from_value(row).unwrap();
        assert_eq!(product.id, ProductId(42));
        assert_eq!(product.image_url, None);
        assert_eq!(product.category_id, None);
    }

    #[test]
    fn test_dto_serializes_category_as_plain_id() {
        let dto = ProductDto {
            title: "Lego".into(),
            description: "Bricks".into(),
            price: 10.0,
            image_url: Some("a.png".into()),
            category_id: CategoryId(3),
        };
        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["category_id"], serde_json::json!(3));
    }
}
