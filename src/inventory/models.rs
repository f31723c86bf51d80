use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned identifier of an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryItemId(pub u64);

impl fmt::Display for InventoryItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for InventoryItemId {
    fn from(value: u64) -> Self {
        InventoryItemId(value)
    }
}

/// A vehicle as returned by the inventory API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub brand: String,
    pub model: String,
    pub year: i32,
    /// Decimal string as emitted by the backend, e.g. "24999.00".
    /// Report endpoints send a bare number instead, it is kept as its text.
    #[serde(deserialize_with = "price_text")]
    pub price: String,
    pub stock: u32,
}

/// Write payload for creating or replacing an inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: String,
    pub stock: u32,
}

impl From<&InventoryItem> for NewInventoryItem {
    fn from(item: &InventoryItem) -> Self {
        NewInventoryItem {
            brand: item.brand.clone(),
            model: item.model.clone(),
            year: item.year,
            price: item.price.clone(),
            stock: item.stock,
        }
    }
}

/// A page of the paginated listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryPage {
    #[serde(default)]
    pub count: Option<u64>,
    pub next: Option<String>,
    pub results: Vec<InventoryItem>,
}

/// Aggregate figures over the whole inventory, from `cars/statistics/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InventoryStatistics {
    pub total_cars: u64,
    /// `None` when the inventory is empty.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub average_price: Option<f64>,
    #[serde(default)]
    pub total_stock: Option<u64>,
    pub unique_models: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AveragePriceReport {
    #[serde(default, deserialize_with = "optional_decimal")]
    pub average_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PremiumListingReport {
    pub expensive_cars: Vec<InventoryItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LowStockReport {
    pub low_stock_cars: Vec<InventoryItem>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Decimal {
    Number(serde_json::Number),
    Text(String),
}

fn price_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Decimal::deserialize(deserializer)? {
        Decimal::Number(number) => Ok(number.to_string()),
        Decimal::Text(text) => Ok(text),
    }
}

fn optional_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<Decimal>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Decimal::Number(number)) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("{} is not a decimal", number))),
        Some(Decimal::Text(text)) => text.trim().parse().map(Some).map_err(D::Error::custom),
    }
}

/// Inventory mutations the image associations have to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    Created {
        id: InventoryItemId,
        images: Vec<String>,
    },
    /// `images: None` means the edit did not touch the images.
    Updated {
        id: InventoryItemId,
        images: Option<Vec<String>>,
    },
    Deleted {
        id: InventoryItemId,
    },
}

impl InventoryEvent {
    pub fn item_id(&self) -> InventoryItemId {
        match self {
            InventoryEvent::Created { id, .. }
            | InventoryEvent::Updated { id, .. }
            | InventoryEvent::Deleted { id } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_deserializes_from_backend_json() {
        let json = r#"{
            "id": 12,
            "brand": "Toyota",
            "model": "Corolla",
            "year": 2021,
            "price": "18999.00",
            "stock": 4,
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let item: InventoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, InventoryItemId(12));
        assert_eq!(item.brand, "Toyota");
        assert_eq!(item.price, "18999.00");
        assert_eq!(item.stock, 4);
    }

    #[test]
    fn page_deserializes_with_null_next() {
        let json = r#"{"count": 1, "next": null, "previous": null, "results": [
            {"id": 1, "brand": "Fiat", "model": "Panda", "year": 2019, "price": "7000.00", "stock": 1}
        ]}"#;
        let page: InventoryPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, Some(1));
        assert_eq!(page.next, None);
        assert_eq!(page.results.len(), 1);
    }

    #[test]
    fn report_rows_accept_numeric_prices() {
        let json = r#"{"low_stock_cars": [
            {"id": 4, "brand": "Tesla", "model": "Model 3", "year": 2023, "price": 42000.5, "stock": 1}
        ]}"#;
        let report: LowStockReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.low_stock_cars[0].price, "42000.5");
        assert_eq!(report.low_stock_cars[0].stock, 1);
    }

    #[test]
    fn statistics_accept_text_or_null_averages() {
        let json = r#"{"total_cars": 3, "average_price": "15000.25", "total_stock": 9, "unique_models": 2}"#;
        let stats: InventoryStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.average_price, Some(15000.25));
        assert_eq!(stats.total_stock, Some(9));

        let json = r#"{"total_cars": 0, "average_price": null, "total_stock": null, "unique_models": 0}"#;
        let stats: InventoryStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.average_price, None);
        assert_eq!(stats.total_stock, None);
    }

    #[test]
    fn event_item_id() {
        let id = InventoryItemId(3);
        assert_eq!(
            InventoryEvent::Created {
                id,
                images: vec![]
            }
            .item_id(),
            id
        );
        assert_eq!(InventoryEvent::Deleted { id }.item_id(), id);
    }
}
