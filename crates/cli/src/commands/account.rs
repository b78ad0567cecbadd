//! Profile and address book pages.

use clap::Args;
use shopfront_client::{ClientError, Storefront};
use shopfront_core::{
    AddressId, AddressInput, AddressType, AddressUpdate, MobileNumber, Pincode, UserUpdate,
    address::DEFAULT_COUNTRY,
};

use crate::render;

/// Fields for a new address.
#[derive(Args)]
pub struct AddressArgs {
    /// Recipient name
    #[arg(long)]
    name: String,

    /// Recipient mobile number
    #[arg(long)]
    mobile: String,

    #[arg(long)]
    line1: String,

    #[arg(long)]
    line2: Option<String>,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: String,

    /// Six-digit PIN code
    #[arg(long)]
    pincode: String,

    #[arg(long, default_value = DEFAULT_COUNTRY)]
    country: String,

    /// `home`, `office` or `other`
    #[arg(long = "type", default_value = "home")]
    address_type: AddressType,

    #[arg(long)]
    landmark: Option<String>,

    /// Make this the default delivery address
    #[arg(long)]
    default: bool,
}

impl TryFrom<AddressArgs> for AddressInput {
    type Error = ClientError;

    fn try_from(args: AddressArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            name: args.name,
            mobile: MobileNumber::parse(&args.mobile)?,
            line1: args.line1,
            line2: args.line2,
            city: args.city,
            state: args.state,
            pincode: Pincode::parse(&args.pincode)?,
            country: args.country,
            address_type: args.address_type,
            landmark: args.landmark,
            is_default: args.default,
        })
    }
}

/// Fields to change on a saved address.
#[derive(Args)]
pub struct AddressUpdateArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    mobile: Option<String>,

    #[arg(long)]
    line1: Option<String>,

    #[arg(long)]
    line2: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    state: Option<String>,

    #[arg(long)]
    pincode: Option<String>,

    #[arg(long)]
    country: Option<String>,

    #[arg(long = "type")]
    address_type: Option<AddressType>,

    #[arg(long)]
    landmark: Option<String>,

    /// Make this the default delivery address
    #[arg(long)]
    default: bool,
}

impl TryFrom<AddressUpdateArgs> for AddressUpdate {
    type Error = ClientError;

    fn try_from(args: AddressUpdateArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            name: args.name,
            mobile: args.mobile.as_deref().map(MobileNumber::parse).transpose()?,
            line1: args.line1,
            line2: args.line2,
            city: args.city,
            state: args.state,
            pincode: args.pincode.as_deref().map(Pincode::parse).transpose()?,
            country: args.country,
            address_type: args.address_type,
            landmark: args.landmark,
            is_default: args.default.then_some(true),
        })
    }
}

pub async fn me(shop: &Storefront, json: bool) -> Result<(), ClientError> {
    let user = shop.me().await?;
    if json {
        return render::json(&user);
    }
    println!("{}", render::user(&user));
    Ok(())
}

pub async fn update_me(
    shop: &Storefront,
    name: Option<String>,
    email: Option<String>,
    json: bool,
) -> Result<(), ClientError> {
    let user = shop.update_me(&UserUpdate { name, email }).await?;
    if json {
        return render::json(&user);
    }
    println!("{}", render::user(&user));
    Ok(())
}

pub async fn addresses(shop: &Storefront, json: bool) -> Result<(), ClientError> {
    let addresses = shop.addresses().await?;
    if json {
        return render::json(&addresses);
    }
    if addresses.is_empty() {
        println!("No saved addresses. Add one with: shopfront addresses add --help");
    }
    for address in &addresses {
        println!("{}", render::address(address));
    }
    Ok(())
}

pub async fn add_address(shop: &Storefront, args: AddressArgs, json: bool) -> Result<(), ClientError> {
    let input = AddressInput::try_from(args)?;
    let address = shop.add_address(&input).await?;
    if json {
        return render::json(&address);
    }
    println!("Saved:\n{}", render::address(&address));
    Ok(())
}

pub async fn update_address(
    shop: &Storefront,
    id: AddressId,
    args: AddressUpdateArgs,
    json: bool,
) -> Result<(), ClientError> {
    let update = AddressUpdate::try_from(args)?;
    let address = shop.update_address(id, &update).await?;
    if json {
        return render::json(&address);
    }
    println!("Updated:\n{}", render::address(&address));
    Ok(())
}

pub async fn remove_address(shop: &Storefront, id: AddressId) -> Result<(), ClientError> {
    shop.remove_address(id).await?;
    println!("Address removed.");
    Ok(())
}
