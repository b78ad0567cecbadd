//! Cart page.
//!
//! Works signed in or out. Products are named by slug or id; the catalogue
//! lookup supplies the stock and price snapshot the cart rules need.

use shopfront_client::{ClientError, Storefront};
use shopfront_core::Cart;

use crate::render;

fn print(cart: &Cart, json: bool) -> Result<(), ClientError> {
    if json {
        return render::json(cart);
    }
    println!("{}", render::cart(cart));
    Ok(())
}

pub async fn show(shop: &Storefront, json: bool) -> Result<(), ClientError> {
    let cart = shop.cart().get_cart().await?;
    print(&cart, json)
}

pub async fn add(shop: &Storefront, product: &str, qty: u32, json: bool) -> Result<(), ClientError> {
    let product = shop.product(product).await?;
    let cart = shop.cart().add_item(&product, qty).await?;
    print(&cart, json)
}

pub async fn update(shop: &Storefront, product: &str, qty: u32, json: bool) -> Result<(), ClientError> {
    let product = shop.product(product).await?;
    let cart = shop.cart().update_quantity(product.id, qty).await?;
    print(&cart, json)
}

pub async fn remove(shop: &Storefront, product: &str, json: bool) -> Result<(), ClientError> {
    let product = shop.product(product).await?;
    let cart = shop.cart().remove_item(product.id).await?;
    print(&cart, json)
}

pub async fn clear(shop: &Storefront, json: bool) -> Result<(), ClientError> {
    let cart = shop.cart().clear().await?;
    print(&cart, json)
}
