use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockres_core::{DomainError, DomainResult, PackagingTypeId, ProductId};

/// Kind of packaging (pallet, transport box, retail box, unit...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingType {
    pub id: PackagingTypeId,
    pub name: String,
    pub code: String,
    /// Lower sequences win when two packagings hold the same quantity.
    pub sequence: i32,
}

/// A packaging configured on a product: `quantity` units per package.
///
/// The quantity is not validated: a zero or negative packaging can exist in
/// the catalog and is ignored by the packaging removal strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packaging {
    pub name: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub packaging_type: Option<PackagingTypeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub packagings: Vec<Packaging>,
}

/// Products and packaging types known to the reservation engine.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<ProductId, Product>,
    packaging_types: HashMap<PackagingTypeId, PackagingType>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&mut self, name: impl Into<String>) -> ProductId {
        let id = ProductId::new();
        self.products.insert(
            id,
            Product {
                id,
                name: name.into(),
                packagings: Vec::new(),
            },
        );
        id
    }

    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn add_packaging_type(
        &mut self,
        name: impl Into<String>,
        code: impl Into<String>,
        sequence: i32,
    ) -> PackagingTypeId {
        let id = PackagingTypeId::new();
        self.insert_packaging_type(PackagingType {
            id,
            name: name.into(),
            code: code.into(),
            sequence,
        });
        id
    }

    pub fn insert_packaging_type(&mut self, packaging_type: PackagingType) {
        self.packaging_types.insert(packaging_type.id, packaging_type);
    }

    pub fn add_packaging(&mut self, product: ProductId, packaging: Packaging) -> DomainResult<()> {
        if let Some(type_id) = packaging.packaging_type {
            self.packaging_type(type_id)?;
        }
        let product = self
            .products
            .get_mut(&product)
            .ok_or_else(|| DomainError::not_found("product", product))?;
        product.packagings.push(packaging);
        Ok(())
    }

    pub fn product(&self, id: ProductId) -> DomainResult<&Product> {
        self.products
            .get(&id)
            .ok_or_else(|| DomainError::not_found("product", id))
    }

    pub fn packagings(&self, id: ProductId) -> DomainResult<&[Packaging]> {
        self.product(id).map(|p| p.packagings.as_slice())
    }

    pub fn packaging_type(&self, id: PackagingTypeId) -> DomainResult<&PackagingType> {
        self.packaging_types
            .get(&id)
            .ok_or_else(|| DomainError::not_found("packaging type", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_packaging_is_accepted() {
        let mut catalog = ProductCatalog::new();
        let product = catalog.add_product("Product 1");
        catalog
            .add_packaging(
                product,
                Packaging {
                    name: "DivisionByZero".to_string(),
                    quantity: Decimal::ZERO,
                    packaging_type: None,
                },
            )
            .unwrap();
        assert_eq!(catalog.packagings(product).unwrap().len(), 1);
    }

    #[test]
    fn packaging_for_unknown_product_is_not_found() {
        let mut catalog = ProductCatalog::new();
        let err = catalog
            .add_packaging(
                ProductId::new(),
                Packaging {
                    name: "Pallet".to_string(),
                    quantity: Decimal::from(500),
                    packaging_type: None,
                },
            )
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn packaging_with_unknown_type_is_not_found() {
        let mut catalog = ProductCatalog::new();
        let product = catalog.add_product("Product 1");
        let err = catalog
            .add_packaging(
                product,
                Packaging {
                    name: "Pallet".to_string(),
                    quantity: Decimal::from(500),
                    packaging_type: Some(PackagingTypeId::new()),
                },
            )
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
