use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockres_core::{AttrValue, Attributes, LocationId, ProductId, Record};

/// A quantity of one product at one location, optionally tied to a lot or
/// package.
///
/// `quantity` is signed: inventory systems may carry negative quants after
/// unplanned outgoing moves. Sums are clamped at zero by the quantity source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quant {
    pub product: ProductId,
    pub location: LocationId,
    pub quantity: Decimal,
    #[serde(default)]
    pub lot: Option<String>,
    #[serde(default)]
    pub package: Option<String>,
    pub in_date: DateTime<Utc>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Quant {
    pub fn new(product: ProductId, location: LocationId, quantity: Decimal) -> Self {
        Self {
            product,
            location,
            quantity,
            lot: None,
            package: None,
            in_date: Utc::now(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_lot(mut self, lot: impl Into<String>) -> Self {
        self.lot = Some(lot.into());
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_in_date(mut self, in_date: DateTime<Utc>) -> Self {
        self.in_date = in_date;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl Record for Quant {
    fn field(&self, name: &str) -> Option<AttrValue> {
        match name {
            "quantity" => Some(AttrValue::Number(self.quantity)),
            "product_id" => Some(AttrValue::Text(self.product.to_string())),
            "location_id" => Some(AttrValue::Text(self.location.to_string())),
            "in_date" => Some(AttrValue::Timestamp(self.in_date)),
            "lot" => self.lot.clone().map(AttrValue::Text),
            "package" => self.package.clone().map(AttrValue::Text),
            other => self.attributes.get(other).cloned(),
        }
    }
}
