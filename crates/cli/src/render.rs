//! Terminal rendering of storefront data.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Serialize;
use shopfront_client::ClientError;
use shopfront_core::{
    Address, Cart, Order, OrderEstimate, OrderTracking, Price, Product, ProductList, User,
};

fn rupees(amount: Decimal) -> String {
    Price::inr(amount).display()
}

/// Print `value` as pretty JSON.
pub fn json<T: Serialize>(value: &T) -> Result<(), ClientError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| ClientError::Internal(format!("JSON encoding failed: {e}")))?;
    println!("{out}");
    Ok(())
}

pub fn product_list(list: &ProductList) -> String {
    let mut out = String::new();
    for product in &list.items {
        let stock = if product.is_purchasable() {
            String::new()
        } else {
            "  (out of stock)".to_string()
        };
        let _ = writeln!(
            out,
            "{:<32} {:>10}  {}{stock}",
            product.name,
            rupees(product.price),
            product.slug
        );
    }
    if list.items.is_empty() {
        out.push_str("No products found.\n");
    }
    let _ = write!(out, "Page {} · {} products", list.page, list.total);
    if list.has_next_page() {
        let _ = write!(out, " · next: --page {}", list.page + 1);
    }
    out
}

pub fn product(product: &Product) -> String {
    let mut out = format!("{}\n", product.name);
    let _ = write!(out, "{}", rupees(product.price));
    let discount = product.discount_percentage();
    if discount > 0 {
        let _ = write!(out, "  (MRP {}, {discount}% off)", rupees(product.mrp));
    }
    out.push('\n');

    let availability = match product.available_stock() {
        _ if !product.is_active => "Unavailable".to_string(),
        0 => "Out of stock".to_string(),
        n if n <= 5 => format!("Only {n} left"),
        _ => "In stock".to_string(),
    };
    let _ = writeln!(out, "{availability}");

    if let Some(short) = product.short_description.as_deref() {
        let _ = writeln!(out, "\n{short}");
    }
    if !product.description.is_empty() {
        let _ = writeln!(out, "\n{}", product.description);
    }
    if let Some(image) = product.primary_image() {
        let _ = writeln!(out, "\nimage: {image}");
    }
    let _ = write!(out, "\nid: {}  slug: {}", product.id, product.slug);
    out
}

pub fn cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.".to_string();
    }

    let mut out = String::new();
    for item in &cart.items {
        let note = if item.is_countable() {
            ""
        } else {
            "  (unavailable)"
        };
        let _ = writeln!(
            out,
            "{:>2} × {:<32} {:>10}{note}",
            item.quantity,
            item.product.name,
            rupees(item.line_total())
        );
    }
    let _ = write!(
        out,
        "{} item(s) · subtotal {}",
        cart.item_count,
        cart.subtotal_price()
    );
    out
}

pub fn estimate(estimate: &OrderEstimate) -> String {
    let shipping = if estimate.shipping_fee.is_zero() {
        "Free".to_string()
    } else {
        rupees(estimate.shipping_fee)
    };
    format!(
        "Subtotal   {:>12}\nShipping   {:>12}\nTax (GST)  {:>12}\nTotal      {:>12}",
        rupees(estimate.subtotal),
        shipping,
        rupees(estimate.tax),
        rupees(estimate.total)
    )
}

pub fn order_line(order: &Order) -> String {
    let placed = order
        .created_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!(
        "{:<20} {:<11} {:>12}  {placed}",
        order.order_number,
        order.status,
        order.total_price()
    )
}

pub fn order(order: &Order) -> String {
    let mut out = format!("Order {} · {}\n\n", order.order_number, order.status);
    for item in &order.items {
        let _ = writeln!(
            out,
            "{:>2} × {:<32} {:>10}",
            item.quantity,
            item.product_name,
            rupees(item.total)
        );
    }
    let _ = writeln!(out, "\nSubtotal   {:>12}", rupees(order.subtotal));
    let _ = writeln!(out, "Shipping   {:>12}", rupees(order.shipping_fee));
    let _ = writeln!(out, "Tax        {:>12}", rupees(order.tax));
    if !order.discount.is_zero() {
        let _ = writeln!(out, "Discount  -{:>12}", rupees(order.discount));
    }
    let _ = writeln!(out, "Total      {:>12}", order.total_price());

    let ship = &order.shipping;
    let _ = write!(
        out,
        "\nShip to {} ({})\n{}, {}, {} - {}",
        ship.name, ship.mobile, ship.line1, ship.city, ship.state, ship.pincode
    );
    if order.status.is_awaiting_payment() {
        let _ = write!(out, "\n\nAwaiting payment: shopfront pay {}", order.order_number);
    }
    out
}

pub fn tracking(tracking: &OrderTracking) -> String {
    let mut out = format!(
        "Order {} · {}\n",
        tracking.order_number, tracking.order_status
    );
    match (&tracking.courier_name, &tracking.awb_number) {
        (Some(courier), Some(awb)) => {
            let _ = writeln!(out, "Shipped with {courier}, AWB {awb}");
        }
        _ if tracking.order_status.is_terminal() => {}
        _ => out.push_str("Not shipped yet\n"),
    }
    if let Some(status) = &tracking.shipment_status {
        let _ = writeln!(out, "Shipment: {status}");
    }
    if let Some(eta) = tracking.estimated_delivery {
        let _ = writeln!(out, "Expected by {}", eta.format("%Y-%m-%d"));
    }
    if let Some(url) = &tracking.tracking_url {
        let _ = writeln!(out, "{url}");
    }
    out.trim_end().to_string()
}

pub fn address(address: &Address) -> String {
    let default = if address.is_default { "  [default]" } else { "" };
    format!(
        "{}  {} ({}) · {}{default}\n    {}",
        address.id,
        address.name,
        address.address_type,
        address.mobile,
        address.one_line()
    )
}

pub fn user(user: &User) -> String {
    let mut out = format!("{}\nMobile: {}", user.display_name(), user.mobile_number);
    if let Some(email) = &user.email {
        let _ = write!(out, "\nEmail: {email}");
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::OrderStatus;

    #[test]
    fn test_estimate_shows_free_shipping() {
        let text = estimate(&OrderEstimate::from_subtotal(Decimal::new(600, 0)));
        assert!(text.contains("Free"));
        assert!(text.contains("₹708.00"));
    }

    #[test]
    fn test_tracking_of_cancelled_order_has_no_shipping_line() {
        let mut info = OrderTracking {
            order_number: "ORD0001".to_string(),
            order_status: OrderStatus::Cancelled,
            shipment_status: None,
            courier_name: None,
            awb_number: None,
            tracking_url: None,
            tracking_history: Vec::new(),
            estimated_delivery: None,
        };
        assert_eq!(tracking(&info), "Order ORD0001 · cancelled");

        info.order_status = OrderStatus::Confirmed;
        assert!(tracking(&info).ends_with("Not shipped yet"));
    }

    #[test]
    fn test_product_shows_thumbnail() {
        let json = r#"{
            "id": "6f1c2a7e-3b8d-4c55-9a0e-2d7f4b1e9c30",
            "name": "Jaggery Powder",
            "slug": "jaggery-powder",
            "description": "",
            "price": "120.00",
            "mrp": "150.00",
            "stock": 3,
            "images": ["https://cdn.example.com/jaggery.jpg", "https://cdn.example.com/back.jpg"],
            "is_active": true
        }"#;
        let text = product(&serde_json::from_str(json).unwrap());
        assert!(text.contains("image: https://cdn.example.com/jaggery.jpg"));
        assert!(!text.contains("back.jpg"));
        assert!(text.contains("Only 3 left"));
    }

    #[test]
    fn test_empty_cart() {
        assert_eq!(cart(&Cart::empty()), "Your cart is empty.");
    }
}
