//! # cart-wasm
//!
//! WebAssembly bindings for the solcart cart.
//!
//! The browser keeps the cart; these bindings give it the same totals and
//! lamport conversion the server uses.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCart, format_lamports, validate_address } from 'cart-wasm';
//!
//! await init();
//!
//! const cart = new WasmCart();
//! cart.add_item('1', 'Premium Product A', 0.5, 2);
//! cart.update_quantity('1', 3);
//!
//! console.log(format_lamports(cart.total_lamports())); // "1.50 SOL"
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/cart-wasm --target web
//! ```

use cart_core::{Address, Cart, Lamports, PaymentError, Product};
use wasm_bindgen::prelude::*;

fn to_js(err: PaymentError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Browser-side cart
#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct WasmCart {
    inner: Cart,
}

#[wasm_bindgen]
impl WasmCart {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a cart saved with `to_json`
    pub fn from_json(json: &str) -> Result<WasmCart, JsValue> {
        let inner: Cart = serde_json::from_str(json)
            .map_err(|e| JsValue::from_str(&format!("Invalid cart: {}", e)))?;
        Ok(Self { inner })
    }

    /// Add a product priced in SOL; adding an existing id increases its quantity
    pub fn add_item(
        &mut self,
        id: String,
        title: String,
        price_sol: f64,
        quantity: u32,
    ) -> Result<(), JsValue> {
        let price = Lamports::from_sol(price_sol).map_err(to_js)?;
        self.inner.add_product(&Product::new(id, title, price), quantity);
        Ok(())
    }

    /// Add a product object as returned by `GET /api/products`
    pub fn add_product(&mut self, product: JsValue, quantity: u32) -> Result<(), JsValue> {
        let product: Product = serde_wasm_bindgen::from_value(product)
            .map_err(|e| JsValue::from_str(&format!("Invalid product: {}", e)))?;
        self.inner.add_product(&product, quantity);
        Ok(())
    }

    /// Set a line's quantity; zero or less removes it
    pub fn update_quantity(&mut self, id: &str, quantity: i32) -> bool {
        self.inner.update_quantity(id, i64::from(quantity))
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.inner.remove(id)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    #[wasm_bindgen(getter)]
    pub fn item_count(&self) -> u32 {
        self.inner.item_count()
    }

    #[wasm_bindgen(getter)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn total_lamports(&self) -> u64 {
        self.inner.total().get()
    }

    pub fn total_sol(&self) -> f64 {
        self.inner.total().as_sol()
    }

    /// Format total for display
    pub fn format_total(&self) -> String {
        self.inner.total().display()
    }

    /// Cart lines as JS objects
    pub fn items(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.items())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Serialize for local storage
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Convert a SOL amount to lamports the way the server does
#[wasm_bindgen]
pub fn sol_to_lamports(amount_sol: f64) -> Result<u64, JsValue> {
    Lamports::from_sol(amount_sol).map(Lamports::get).map_err(to_js)
}

/// Format lamports for display
#[wasm_bindgen]
pub fn format_lamports(lamports: u64) -> String {
    Lamports(lamports).display()
}

/// Check a base58 wallet address before asking the wallet to sign
#[wasm_bindgen]
pub fn validate_address(address: &str) -> bool {
    Address::parse_recipient(address.trim()).is_ok()
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn rejects_invalid_amounts() {
        assert!(sol_to_lamports(-1.0).is_err());
        assert!(sol_to_lamports(f64::NAN).is_err());
    }

    #[wasm_bindgen_test]
    fn rejects_invalid_cart_json() {
        assert!(WasmCart::from_json("{").is_err());
    }
}
