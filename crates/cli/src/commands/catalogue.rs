//! Product list and detail pages.

use shopfront_client::{ClientError, Storefront};

use crate::render;

pub async fn list(shop: &Storefront, page: u32, page_size: u32, json: bool) -> Result<(), ClientError> {
    let products = shop.products(page, page_size).await?;
    if json {
        return render::json(&products);
    }
    println!("{}", render::product_list(&products));
    Ok(())
}

pub async fn show(shop: &Storefront, id_or_slug: &str, json: bool) -> Result<(), ClientError> {
    let product = shop.product(id_or_slug).await?;
    if json {
        return render::json(&product);
    }
    println!("{}", render::product(&product));
    Ok(())
}
