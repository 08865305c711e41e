//! Services offered by shops

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(deserialize_with = "crate::entities::id::deserialize")]
    pub id: String,

    pub name: String,

    #[serde(default, deserialize_with = "crate::entities::id::deserialize")]
    pub shop_id: String,

    #[serde(default)]
    pub price: f64,

    #[serde(default)]
    pub discount_percent: f64,

    #[serde(default)]
    pub duration_type: Option<String>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Service {
    /// Price after the shop's discount, never negative
    pub fn discounted_price(&self) -> f64 {
        let percent = self.discount_percent.clamp(0.0, 100.0);
        self.price * (100.0 - percent) / 100.0
    }
}

crate::impl_entity!(Service, Service);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    #[serde(deserialize_with = "crate::entities::id::deserialize")]
    pub id: String,
    pub name: String,
}

crate::impl_entity!(Shop, Shop);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Entity;
    use serde_json::json;

    #[test]
    fn test_numeric_ids() {
        let shop = Shop::from_record(&json!({"id": 42, "name": "Paws"})).unwrap();
        assert_eq!(shop.id, "42");
        assert_eq!(shop.id(), "42");

        let service = Service::from_record(&json!({
            "id": 7,
            "name": "Bath",
            "shop_id": 42,
            "price": 90000
        }))
        .unwrap();
        assert_eq!(service.id, "7");
        assert_eq!(service.shop_id, "42");
    }

    #[test]
    fn test_discounted_price() {
        let service = Service {
            id: "S1".to_string(),
            name: "Grooming".to_string(),
            shop_id: "SH1".to_string(),
            price: 200000.0,
            discount_percent: 10.0,
            duration_type: None,
            is_active: true,
        };
        assert_eq!(service.discounted_price(), 180000.0);

        let free = Service {
            discount_percent: 150.0,
            ..service
        };
        assert_eq!(free.discounted_price(), 0.0);
    }
}
