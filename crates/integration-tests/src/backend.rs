//! In-process fake of the storefront REST backend.
//!
//! Serves the `/api/v1` routes the client uses, with enough behavior to
//! exercise the client end to end: OTP login (code `123456`), token refresh,
//! stock-checked cart, order creation with the real fee rules, and payment
//! verification where the signature `valid` passes and anything else fails.
//!
//! Knobs let a test expire access tokens, reject refreshes, or fail the cart
//! merge. Counters record how often the interesting endpoints were hit.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use shopfront_core::{
    Address, AddressId, AddressInput, AddressUpdate, Cart, CartItem, CartItemId, CartLineInput,
    CartQuantityUpdate, Order, OrderCreate, OrderEstimate, OrderId, OrderItem, OrderItemId,
    OrderList, OrderStatus, OrderTracking, Payment, PaymentCreate, PaymentId, PaymentIntent,
    PaymentStatus, PaymentVerification, Price, Product, ProductId, ProductList, Quantity,
    ShippingSnapshot, User, UserId, UserUpdate,
};
use uuid::Uuid;

/// The only OTP the fake accepts.
pub const VALID_OTP: &str = "123456";

/// The only payment signature the fake accepts.
pub const VALID_SIGNATURE: &str = "valid";

/// Request counters.
#[derive(Debug, Default)]
pub struct Counters {
    pub refresh: AtomicUsize,
    pub merge: AtomicUsize,
    pub create_order: AtomicUsize,
    pub create_payment: AtomicUsize,
    pub verify_payment: AtomicUsize,
    pub logout: AtomicUsize,
}

impl Counters {
    #[must_use]
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

struct Data {
    products: Vec<Product>,
    cart: Vec<CartItem>,
    addresses: Vec<Address>,
    orders: Vec<Order>,
    payments: Vec<Payment>,
    user: User,
    access_tokens: HashSet<String>,
    refresh_tokens: HashSet<String>,
    issued: u32,
    reject_all_access: bool,
    reject_refresh: bool,
    fail_merge: bool,
}

impl Data {
    fn new() -> Self {
        Self {
            products: Vec::new(),
            cart: Vec::new(),
            addresses: Vec::new(),
            orders: Vec::new(),
            payments: Vec::new(),
            user: User {
                id: UserId::new(Uuid::new_v4()),
                mobile_number: "+919876543210".to_string(),
                name: Some("Asha Rao".to_string()),
                email: None,
                is_verified: true,
                created_at: None,
            },
            access_tokens: HashSet::new(),
            refresh_tokens: HashSet::new(),
            issued: 0,
            reject_all_access: false,
            reject_refresh: false,
            fail_merge: false,
        }
    }

    fn issue_tokens(&mut self) -> Value {
        self.issued += 1;
        let access = format!("access-{}", self.issued);
        let refresh = format!("refresh-{}", self.issued);
        self.access_tokens.insert(access.clone());
        self.refresh_tokens.insert(refresh.clone());
        json!({
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "bearer",
            "expires_in": 1800,
        })
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn order_index(&self, order_ref: &str) -> Option<usize> {
        self.orders
            .iter()
            .position(|o| o.id.to_string() == order_ref || o.order_number == order_ref)
    }

    fn cart(&self) -> Cart {
        Cart::from_items(self.cart.clone())
    }
}

struct Shared {
    data: Mutex<Data>,
    counters: Counters,
}

/// Handle to a fake backend. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct FakeBackend {
    shared: Arc<Shared>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                data: Mutex::new(Data::new()),
                counters: Counters::default(),
            }),
        }
    }

    fn data(&self) -> MutexGuard<'_, Data> {
        self.shared
            .data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Serve on an ephemeral local port and return the API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(&self) -> std::io::Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let app = Router::new().nest("/api/v1", self.router());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service()).await;
        });
        Ok(format!("http://{addr}/api/v1"))
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/auth/send-otp", post(send_otp))
            .route("/auth/verify-otp", post(verify_otp))
            .route("/auth/refresh", post(refresh))
            .route("/auth/logout", post(logout))
            .route("/products", get(list_products))
            .route("/products/{id_or_slug}", get(get_product))
            .route("/cart", get(get_cart))
            .route("/cart/add", post(add_to_cart))
            .route("/cart/clear", post(clear_cart))
            .route("/cart/merge", post(merge_cart))
            .route("/cart/{item_id}", put(update_cart_item).delete(remove_cart_item))
            .route("/orders", post(create_order).get(list_orders))
            .route("/orders/{order_ref}", get(get_order))
            .route("/orders/{order_ref}/track", get(track_order))
            .route("/orders/{order_ref}/cancel", post(cancel_order))
            .route("/payments/create", post(create_payment))
            .route("/payments/verify", post(verify_payment))
            .route("/users/me", get(get_me).put(update_me))
            .route(
                "/users/me/addresses",
                get(list_addresses).post(create_address),
            )
            .route(
                "/users/me/addresses/{id}",
                put(update_address).delete(delete_address),
            )
            .with_state(self.clone())
    }

    // =========================================================================
    // Fixtures and inspection
    // =========================================================================

    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.shared.counters
    }

    /// Add an active product priced at `price` rupees.
    pub fn add_product(&self, slug: &str, price: i64, stock: i64) -> Product {
        let product = Product {
            id: ProductId::new(Uuid::new_v4()),
            name: slug.replace('-', " "),
            slug: slug.to_string(),
            description: String::new(),
            short_description: None,
            price: Decimal::new(price, 0),
            mrp: Decimal::new(price, 0),
            stock,
            images: Vec::new(),
            specifications: Value::Null,
            is_active: true,
            created_at: None,
            updated_at: None,
        };
        self.data().products.push(product.clone());
        product
    }

    /// Add a default delivery address for the user.
    pub fn add_address(&self) -> Address {
        let address = Address {
            id: AddressId::new(Uuid::new_v4()),
            name: "Asha Rao".to_string(),
            mobile: "+919876543210".to_string(),
            line1: "12 MG Road".to_string(),
            line2: None,
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            country: "India".to_string(),
            address_type: shopfront_core::AddressType::Home,
            landmark: None,
            is_default: true,
            created_at: None,
        };
        self.data().addresses.push(address.clone());
        address
    }

    /// Put a line straight into the server cart.
    pub fn seed_cart(&self, product_id: ProductId, quantity: u32) {
        let mut data = self.data();
        let Some(product) = data.product(product_id).cloned() else {
            return;
        };
        data.cart.push(CartItem {
            id: Some(CartItemId::new(Uuid::new_v4())),
            product_id,
            quantity,
            product,
            created_at: None,
        });
    }

    /// `(product, quantity)` for every server cart line.
    #[must_use]
    pub fn cart_lines(&self) -> Vec<(ProductId, u32)> {
        self.data()
            .cart
            .iter()
            .map(|item| (item.product_id, item.quantity))
            .collect()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.data().orders.clone()
    }

    /// Invalidate every access token issued so far. Refreshing still works.
    pub fn expire_access_tokens(&self) {
        self.data().access_tokens.clear();
    }

    /// Answer every authenticated request with 401, even with fresh tokens.
    pub fn reject_all_access(&self, reject: bool) {
        self.data().reject_all_access = reject;
    }

    pub fn reject_refresh(&self, reject: bool) {
        self.data().reject_refresh = reject;
    }

    pub fn fail_merge(&self, fail: bool) {
        self.data().fail_merge = fail;
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn message(text: &str) -> Response {
    Json(json!({ "message": text, "success": true })).into_response()
}

fn authorize(backend: &FakeBackend, headers: &HeaderMap) -> Result<(), Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let data = backend.data();
    match token {
        Some(token) if !data.reject_all_access && data.access_tokens.contains(token) => Ok(()),
        _ => Err(detail(
            StatusCode::UNAUTHORIZED,
            "Could not validate credentials",
        )),
    }
}

macro_rules! authorized {
    ($backend:expr, $headers:expr) => {
        if let Err(response) = authorize(&$backend, &$headers) {
            return response;
        }
    };
}

#[derive(Deserialize)]
struct PageParams {
    page: Option<u32>,
    page_size: Option<u32>,
}

impl PageParams {
    fn bounds(&self, len: usize) -> (u32, u32, std::ops::Range<usize>) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size.unwrap_or(20).clamp(1, 50);
        let start = ((page - 1) * page_size) as usize;
        let end = (start + page_size as usize).min(len);
        (page, page_size, start.min(len)..end)
    }
}

// =============================================================================
// Auth
// =============================================================================

async fn send_otp(Json(body): Json<Value>) -> Response {
    if body.get("mobile_number").and_then(Value::as_str).is_none() {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "mobile_number is required");
    }
    message("OTP sent successfully")
}

async fn verify_otp(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Response {
    if body.get("otp").and_then(Value::as_str) != Some(VALID_OTP) {
        return detail(StatusCode::BAD_REQUEST, "Invalid or expired OTP");
    }
    Json(backend.data().issue_tokens()).into_response()
}

async fn refresh(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Response {
    bump(&backend.counters().refresh);
    let token = body
        .get("refresh_token")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let mut data = backend.data();
    if data.reject_refresh || !data.refresh_tokens.remove(token) {
        return detail(StatusCode::UNAUTHORIZED, "Invalid refresh token");
    }
    Json(data.issue_tokens()).into_response()
}

async fn logout(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    bump(&backend.counters().logout);
    authorized!(backend, headers);
    message("Logged out successfully")
}

// =============================================================================
// Products
// =============================================================================

async fn list_products(
    State(backend): State<FakeBackend>,
    Query(params): Query<PageParams>,
) -> Response {
    let data = backend.data();
    let active: Vec<Product> = data.products.iter().filter(|p| p.is_active).cloned().collect();
    let (page, page_size, range) = params.bounds(active.len());
    Json(ProductList {
        items: active.get(range).map(<[Product]>::to_vec).unwrap_or_default(),
        total: active.len() as u64,
        page,
        page_size,
    })
    .into_response()
}

async fn get_product(State(backend): State<FakeBackend>, Path(id_or_slug): Path<String>) -> Response {
    let data = backend.data();
    data.products
        .iter()
        .find(|p| p.is_active && (p.slug == id_or_slug || p.id.to_string() == id_or_slug))
        .map_or_else(
            || detail(StatusCode::NOT_FOUND, "Product not found"),
            |p| Json(p.clone()).into_response(),
        )
}

// =============================================================================
// Cart
// =============================================================================

async fn get_cart(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    authorized!(backend, headers);
    Json(backend.data().cart()).into_response()
}

async fn add_to_cart(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(line): Json<CartLineInput>,
) -> Response {
    authorized!(backend, headers);
    let mut data = backend.data();
    let Some(product) = data.product(line.product_id).filter(|p| p.is_active).cloned() else {
        return detail(StatusCode::NOT_FOUND, "Product not found");
    };
    let stock = u32::try_from(product.stock).unwrap_or(0);
    let quantity = line.quantity.get();

    if let Some(item) = data.cart.iter_mut().find(|i| i.product_id == line.product_id) {
        let wanted = item.quantity + quantity;
        if wanted > stock {
            return detail(
                StatusCode::BAD_REQUEST,
                &format!("Cannot add more. Only {stock} items available"),
            );
        }
        item.quantity = wanted.min(Quantity::MAX);
        return Json(item.clone()).into_response();
    }

    if quantity > stock {
        return detail(
            StatusCode::BAD_REQUEST,
            &format!("Only {stock} items available"),
        );
    }
    let item = CartItem {
        id: Some(CartItemId::new(Uuid::new_v4())),
        product_id: line.product_id,
        quantity,
        product,
        created_at: Some(Utc::now()),
    };
    data.cart.push(item.clone());
    Json(item).into_response()
}

async fn update_cart_item(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(item_id): Path<CartItemId>,
    Json(update): Json<CartQuantityUpdate>,
) -> Response {
    authorized!(backend, headers);
    let mut data = backend.data();
    let Some(item) = data.cart.iter_mut().find(|i| i.id == Some(item_id)) else {
        return detail(StatusCode::NOT_FOUND, "Cart item not found");
    };
    let stock = u32::try_from(item.product.stock).unwrap_or(0);
    if update.quantity.get() > stock {
        return detail(
            StatusCode::BAD_REQUEST,
            &format!("Only {stock} items available"),
        );
    }
    item.quantity = update.quantity.get();
    Json(item.clone()).into_response()
}

async fn remove_cart_item(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(item_id): Path<CartItemId>,
) -> Response {
    authorized!(backend, headers);
    let mut data = backend.data();
    let before = data.cart.len();
    data.cart.retain(|i| i.id != Some(item_id));
    if data.cart.len() == before {
        return detail(StatusCode::NOT_FOUND, "Cart item not found");
    }
    message("Item removed from cart")
}

async fn clear_cart(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    authorized!(backend, headers);
    backend.data().cart.clear();
    message("Cart cleared")
}

async fn merge_cart(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(lines): Json<Vec<CartLineInput>>,
) -> Response {
    authorized!(backend, headers);
    bump(&backend.counters().merge);
    let mut data = backend.data();
    if data.fail_merge {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
    }

    for line in lines {
        let Some(product) = data.product(line.product_id).filter(|p| p.is_active).cloned() else {
            continue;
        };
        let stock = u32::try_from(product.stock).unwrap_or(0);
        if let Some(item) = data.cart.iter_mut().find(|i| i.product_id == line.product_id) {
            item.quantity = (item.quantity + line.quantity.get())
                .min(Quantity::MAX)
                .min(stock);
            continue;
        }
        let quantity = line.quantity.get().min(stock);
        if quantity > 0 {
            data.cart.push(CartItem {
                id: Some(CartItemId::new(Uuid::new_v4())),
                product_id: line.product_id,
                quantity,
                product,
                created_at: Some(Utc::now()),
            });
        }
    }
    Json(data.cart()).into_response()
}

// =============================================================================
// Orders
// =============================================================================

async fn create_order(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<OrderCreate>,
) -> Response {
    authorized!(backend, headers);
    bump(&backend.counters().create_order);
    let mut data = backend.data();

    let lines: Vec<CartItem> = data.cart.iter().filter(|i| i.is_countable()).cloned().collect();
    if lines.is_empty() {
        return detail(StatusCode::BAD_REQUEST, "Cart is empty");
    }
    let Some(address) = data.addresses.iter().find(|a| a.id == body.address_id).cloned() else {
        return detail(StatusCode::NOT_FOUND, "Delivery address not found");
    };

    let items: Vec<OrderItem> = lines
        .iter()
        .map(|line| OrderItem {
            id: OrderItemId::new(Uuid::new_v4()),
            product_id: line.product_id,
            product_name: line.product.name.clone(),
            product_image: None,
            quantity: line.quantity,
            price: line.product.price,
            total: line.line_total(),
        })
        .collect();
    let subtotal: Decimal = items.iter().map(|i| i.total).sum();
    let estimate = OrderEstimate::from_subtotal(subtotal);

    let order = Order {
        id: OrderId::new(Uuid::new_v4()),
        order_number: format!("ORD{:04}", data.orders.len() + 1),
        status: OrderStatus::Pending,
        subtotal,
        shipping_fee: estimate.shipping_fee,
        tax: estimate.tax,
        discount: Decimal::ZERO,
        total: estimate.total,
        shipping: ShippingSnapshot {
            name: address.name,
            mobile: address.mobile,
            line1: address.line1,
            line2: address.line2,
            city: address.city,
            state: address.state,
            pincode: address.pincode,
            country: address.country,
            email: None,
            address_type: address.address_type,
        },
        items,
        created_at: Some(Utc::now()),
        updated_at: None,
    };
    data.orders.push(order.clone());
    Json(order).into_response()
}

async fn list_orders(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Response {
    authorized!(backend, headers);
    let data = backend.data();
    let newest_first: Vec<Order> = data.orders.iter().rev().cloned().collect();
    let (page, page_size, range) = params.bounds(newest_first.len());
    Json(OrderList {
        items: newest_first.get(range).map(<[Order]>::to_vec).unwrap_or_default(),
        total: newest_first.len() as u64,
        page,
        page_size,
    })
    .into_response()
}

async fn get_order(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(order_ref): Path<String>,
) -> Response {
    authorized!(backend, headers);
    let data = backend.data();
    match data.order_index(&order_ref).and_then(|i| data.orders.get(i)) {
        Some(order) => Json(order.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Order not found"),
    }
}

async fn track_order(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(order_ref): Path<String>,
) -> Response {
    authorized!(backend, headers);
    let data = backend.data();
    let Some(order) = data.order_index(&order_ref).and_then(|i| data.orders.get(i)) else {
        return detail(StatusCode::NOT_FOUND, "Order not found");
    };
    Json(OrderTracking {
        order_number: order.order_number.clone(),
        order_status: order.status,
        shipment_status: None,
        courier_name: None,
        awb_number: None,
        tracking_url: None,
        tracking_history: Vec::new(),
        estimated_delivery: None,
    })
    .into_response()
}

async fn cancel_order(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(order_ref): Path<String>,
) -> Response {
    authorized!(backend, headers);
    let mut data = backend.data();
    let Some(order) = data.order_index(&order_ref).and_then(|i| data.orders.get_mut(i)) else {
        return detail(StatusCode::NOT_FOUND, "Order not found");
    };
    if !order.status.is_cancellable() {
        return detail(
            StatusCode::BAD_REQUEST,
            &format!("Order cannot be cancelled. Current status: {}", order.status),
        );
    }
    order.status = OrderStatus::Cancelled;
    message("Order cancelled successfully")
}

// =============================================================================
// Payments
// =============================================================================

async fn create_payment(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<PaymentCreate>,
) -> Response {
    authorized!(backend, headers);
    bump(&backend.counters().create_payment);
    let mut data = backend.data();
    let Some(order) = data.orders.iter().find(|o| o.id == body.order_id).cloned() else {
        return detail(StatusCode::NOT_FOUND, "Order not found");
    };
    if order.status != OrderStatus::Pending {
        return detail(
            StatusCode::BAD_REQUEST,
            &format!("Order is already {}", order.status),
        );
    }

    let gateway_order_id = format!("order_gw{}", data.payments.len() + 1);
    data.payments.push(Payment {
        id: PaymentId::new(Uuid::new_v4()),
        order_id: order.id,
        gateway: "razorpay".to_string(),
        gateway_order_id: gateway_order_id.clone(),
        gateway_payment_id: None,
        amount: order.total,
        currency: "INR".to_string(),
        status: PaymentStatus::Pending,
        created_at: Some(Utc::now()),
    });

    Json(PaymentIntent {
        gateway_order_id,
        key_id: "rzp_test_key".to_string(),
        amount: Price::inr(order.total).minor_units().unwrap_or_default(),
        currency: "INR".to_string(),
        order_id: order.id.to_string(),
    })
    .into_response()
}

async fn verify_payment(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<PaymentVerification>,
) -> Response {
    authorized!(backend, headers);
    bump(&backend.counters().verify_payment);
    let mut data = backend.data();
    let Some(index) = data
        .payments
        .iter()
        .position(|p| p.gateway_order_id == body.gateway_order_id)
    else {
        return detail(StatusCode::NOT_FOUND, "Payment not found");
    };

    let Some(payment) = data.payments.get_mut(index) else {
        return detail(StatusCode::NOT_FOUND, "Payment not found");
    };
    if payment.status == PaymentStatus::Captured {
        return Json(payment.clone()).into_response();
    }
    if body.signature != VALID_SIGNATURE {
        payment.status = PaymentStatus::Failed;
        return detail(StatusCode::BAD_REQUEST, "Invalid payment signature");
    }
    payment.status = PaymentStatus::Captured;
    payment.gateway_payment_id = Some(body.gateway_payment_id);
    let payment = payment.clone();

    if let Some(order) = data.orders.iter_mut().find(|o| o.id == payment.order_id) {
        order.status = OrderStatus::Confirmed;
    }
    data.cart.clear();
    Json(payment).into_response()
}

// =============================================================================
// Users
// =============================================================================

async fn get_me(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    authorized!(backend, headers);
    Json(backend.data().user.clone()).into_response()
}

async fn update_me(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(update): Json<UserUpdate>,
) -> Response {
    authorized!(backend, headers);
    let mut data = backend.data();
    if update.name.is_some() {
        data.user.name = update.name;
    }
    if update.email.is_some() {
        data.user.email = update.email;
    }
    Json(data.user.clone()).into_response()
}

async fn list_addresses(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    authorized!(backend, headers);
    let mut addresses = backend.data().addresses.clone();
    addresses.sort_by_key(|a| !a.is_default);
    Json(addresses).into_response()
}

async fn create_address(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(input): Json<AddressInput>,
) -> Response {
    authorized!(backend, headers);
    let mut data = backend.data();
    if input.is_default {
        for address in &mut data.addresses {
            address.is_default = false;
        }
    }
    let address = Address {
        id: AddressId::new(Uuid::new_v4()),
        name: input.name,
        mobile: input.mobile.as_str().to_string(),
        line1: input.line1,
        line2: input.line2,
        city: input.city,
        state: input.state,
        pincode: input.pincode.as_str().to_string(),
        country: input.country,
        address_type: input.address_type,
        landmark: input.landmark,
        is_default: input.is_default,
        created_at: Some(Utc::now()),
    };
    data.addresses.push(address.clone());
    (StatusCode::CREATED, Json(address)).into_response()
}

async fn update_address(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<AddressId>,
    Json(update): Json<AddressUpdate>,
) -> Response {
    authorized!(backend, headers);
    let mut data = backend.data();
    if update.is_default == Some(true) {
        for address in &mut data.addresses {
            address.is_default = false;
        }
    }
    let Some(address) = data.addresses.iter_mut().find(|a| a.id == id) else {
        return detail(StatusCode::NOT_FOUND, "Address not found");
    };
    if let Some(name) = update.name {
        address.name = name;
    }
    if let Some(mobile) = update.mobile {
        address.mobile = mobile.as_str().to_string();
    }
    if let Some(line1) = update.line1 {
        address.line1 = line1;
    }
    if update.line2.is_some() {
        address.line2 = update.line2;
    }
    if let Some(city) = update.city {
        address.city = city;
    }
    if let Some(state) = update.state {
        address.state = state;
    }
    if let Some(pincode) = update.pincode {
        address.pincode = pincode.as_str().to_string();
    }
    if let Some(country) = update.country {
        address.country = country;
    }
    if let Some(address_type) = update.address_type {
        address.address_type = address_type;
    }
    if update.landmark.is_some() {
        address.landmark = update.landmark;
    }
    if let Some(is_default) = update.is_default {
        address.is_default = is_default;
    }
    Json(address.clone()).into_response()
}

async fn delete_address(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<AddressId>,
) -> Response {
    authorized!(backend, headers);
    let mut data = backend.data();
    let before = data.addresses.len();
    data.addresses.retain(|a| a.id != id);
    if data.addresses.len() == before {
        return detail(StatusCode::NOT_FOUND, "Address not found");
    }
    message("Address deleted successfully")
}
