//! Order history pages.

use shopfront_client::{ClientError, Storefront};

use crate::render;

pub async fn list(shop: &Storefront, page: u32, page_size: u32, json: bool) -> Result<(), ClientError> {
    let orders = shop.orders(page, page_size).await?;
    if json {
        return render::json(&orders);
    }
    if orders.items.is_empty() {
        println!("No orders yet.");
        return Ok(());
    }
    for order in &orders.items {
        println!("{}", render::order_line(order));
    }
    println!("Page {} · {} orders", orders.page, orders.total);
    Ok(())
}

pub async fn show(shop: &Storefront, order_ref: &str, json: bool) -> Result<(), ClientError> {
    let order = shop.order(order_ref).await?;
    if json {
        return render::json(&order);
    }
    println!("{}", render::order(&order));
    Ok(())
}

pub async fn track(shop: &Storefront, order_ref: &str, json: bool) -> Result<(), ClientError> {
    let tracking = shop.track_order(order_ref).await?;
    if json {
        return render::json(&tracking);
    }
    println!("{}", render::tracking(&tracking));
    Ok(())
}

pub async fn cancel(shop: &Storefront, order_ref: &str) -> Result<(), ClientError> {
    let message = shop.cancel_order(order_ref).await?;
    println!("{message}");
    Ok(())
}
