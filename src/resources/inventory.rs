use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::{RecordId, Resource};

use super::lenient;

/// An inventory product. Members beyond name and price are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
            extra: Map::new(),
        }
    }
}

impl Resource for Product {
    fn id(&self) -> Option<RecordId> {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_members_survive() {
        let product: Product =
            serde_json::from_value(json!({"id": 3, "name": "Cable", "price": 2.5, "stock": 40})).unwrap();
        assert_eq!(product.id(), Some(RecordId::Number(3)));
        assert_eq!(product.extra["stock"], 40);

        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back["stock"], 40);
    }

    #[test]
    fn loose_records_still_decode() {
        let product: Product = serde_json::from_value(json!({"id": "p-9", "price": "12.50"})).unwrap();
        assert_eq!(product.name, "");
        assert_eq!(product.price, 12.5);

        let product: Product = serde_json::from_value(json!({"id": 4, "name": 404, "price": null})).unwrap();
        assert_eq!(product.name, "404");
        assert_eq!(product.price, 0.0);
    }

    #[test]
    fn new_product_has_no_id_on_the_wire() {
        let value = serde_json::to_value(Product::new("Cable", 2.5)).unwrap();
        assert!(value.get("id").is_none());
    }
}
