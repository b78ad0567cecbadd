//! Login and logout.

use shopfront_client::{ClientError, MergeOutcome, Storefront};

pub async fn send_otp(shop: &Storefront, mobile: &str) -> Result<(), ClientError> {
    let sent = shop.auth().send_otp(mobile).await?;
    println!("{}", sent.message);
    println!("Then run: shopfront login verify {mobile} <code>");
    Ok(())
}

pub async fn verify(shop: &Storefront, mobile: &str, otp: &str) -> Result<(), ClientError> {
    let merged = shop.login(mobile, otp).await?;
    println!("Signed in.");
    // A failed merge is reported through a notice.
    if let MergeOutcome::Merged(cart) = merged {
        println!(
            "Your guest cart was added to your account ({} item(s)).",
            cart.item_count
        );
    }
    Ok(())
}

pub async fn logout(shop: &Storefront) -> Result<(), ClientError> {
    shop.logout().await?;
    Ok(())
}
