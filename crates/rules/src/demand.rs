use serde::{Deserialize, Serialize};

use stockres_core::{
    AttrValue, Attributes, DomainError, DomainResult, LocationId, ProductId, Quantity, Record,
};

/// A request to reserve `quantity` units of `product` from under `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    product: ProductId,
    quantity: Quantity,
    source: LocationId,
    #[serde(default)]
    attributes: Attributes,
}

impl Demand {
    pub fn new(product: ProductId, quantity: Quantity, source: LocationId) -> DomainResult<Self> {
        if quantity.is_zero() {
            return Err(DomainError::validation("demand quantity must be positive"));
        }
        Ok(Self {
            product,
            quantity,
            source,
            attributes: Attributes::new(),
        })
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn product(&self) -> ProductId {
        self.product
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn source(&self) -> LocationId {
        self.source
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl Record for Demand {
    fn field(&self, name: &str) -> Option<AttrValue> {
        match name {
            "product_id" => Some(AttrValue::Text(self.product.to_string())),
            "quantity" => Some(AttrValue::Number(self.quantity.value())),
            "location_id" => Some(AttrValue::Text(self.source.to_string())),
            other => self.attributes.get(other).cloned(),
        }
    }
}
