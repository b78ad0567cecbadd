//! Checkout and payment pages.

use shopfront_client::{CheckoutOutcome, ClientError, Storefront};
use shopfront_core::AddressId;

use crate::payment::ConsolePaymentProvider;
use crate::render;

async fn default_address(shop: &Storefront) -> Result<AddressId, ClientError> {
    let addresses = shop.addresses().await?;
    addresses
        .iter()
        .find(|a| a.is_default)
        .or_else(|| addresses.first())
        .map(|a| a.id)
        .ok_or_else(|| {
            ClientError::Validation(
                "Add a delivery address first: shopfront addresses add --help".to_string(),
            )
        })
}

fn report(outcome: &CheckoutOutcome, json: bool) -> Result<(), ClientError> {
    if json {
        if let Some(order) = outcome.order() {
            return render::json(order);
        }
        return Ok(());
    }

    match outcome {
        CheckoutOutcome::Paid { order, .. } => println!("\n{}", render::order(order)),
        CheckoutOutcome::PaymentIncomplete { order, .. } => {
            println!("\nTo pay later: shopfront pay {}", order.order_number);
        }
        CheckoutOutcome::VerificationFailed { order } => {
            println!("\nOrder {} is awaiting confirmation.", order.order_number);
        }
        CheckoutOutcome::AlreadyInFlight => println!("A checkout is already in progress."),
    }
    Ok(())
}

pub async fn checkout(shop: &Storefront, address: Option<AddressId>, json: bool) -> Result<(), ClientError> {
    let address_id = match address {
        Some(id) => id,
        None => default_address(shop).await?,
    };

    let cart = shop.cart().get_cart().await?;
    if !json {
        println!("{}\n", render::cart(&cart));
        println!("{}", render::estimate(&shop.checkout().summary().await?));
    }

    let provider = ConsolePaymentProvider::default();
    let outcome = shop.checkout().place_order(address_id, &provider).await?;
    report(&outcome, json)
}

pub async fn pay(shop: &Storefront, order_ref: &str, json: bool) -> Result<(), ClientError> {
    let provider = ConsolePaymentProvider::default();
    let outcome = shop.checkout().retry_payment(order_ref, &provider).await?;
    report(&outcome, json)
}
