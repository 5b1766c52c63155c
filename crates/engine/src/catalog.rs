//! Product catalog collaborator.
//!
//! The engine never mutates the catalog; it only resolves ids to prices at
//! cart-add and checkout time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use common::ProductId;

/// An immutable catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// The product identifier.
    pub id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Price per unit in cents.
    pub price: Money,
}

impl Product {
    /// Creates a new product.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// Read-only product lookup used by the engine.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: BTreeMap<ProductId, Product>,
}

impl ProductCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product, replacing any previous product with the same id.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    /// The demo storefront inventory.
    pub fn demo() -> Self {
        let mut catalog = Self::new();
        catalog.insert(Product::new("item_001", "Quantum T-Shirt", Money::from_cents(1999)));
        catalog.insert(Product::new("item_002", "Flux Capacitor Mug", Money::from_cents(1549)));
        catalog.insert(Product::new("item_003", "Singularity Snapback", Money::from_cents(2499)));
        catalog.insert(Product::new("item_004", "Code Weaver Hoodie", Money::from_cents(4999)));
        catalog
    }

    /// Looks up a product by id.
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    /// Returns true if the catalog knows the given id.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.products.contains_key(id)
    }

    /// Iterates products in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Number of products in the catalog.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true if the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
