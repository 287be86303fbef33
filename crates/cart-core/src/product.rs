//! # Product Types
//!
//! Product catalog types for solcart.
//! Products are loaded from `config/products.toml`; a small demo catalog is
//! used when no file is present.

use crate::amount::Lamports;
use serde::{Deserialize, Serialize};

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unit price in lamports
    pub price: Lamports,

    /// Whether this product is active and available for purchase
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create a new product
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: Lamports) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            price,
            active: true,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Builder: mark as unavailable
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Price in decimal SOL
    pub fn price_sol(&self) -> f64 {
        self.price.as_sol()
    }
}

/// Product catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// The built-in demo catalog
    pub fn demo() -> Self {
        let mut catalog = Self::new();
        catalog.add(
            Product::new("1", "Premium Product A", Lamports(500_000_000))
                .with_description("High-quality product"),
        );
        catalog.add(
            Product::new("2", "Product B", Lamports(300_000_000)).with_description("Great value"),
        );
        catalog.add(
            Product::new("3", "Product C", Lamports(1_000_000_000)).with_description("Best seller"),
        );
        catalog
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Get all active products
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }

    /// Number of products, active or not
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
