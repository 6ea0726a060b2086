#![allow(dead_code)]

// Shared helpers for integration tests.
//
// `FakeStorefront` is an in-memory stand-in for the remote cart API that behaves like the real
// platform where it matters here: carts get fresh ids, adding the same variant twice merges the
// line, quantity zero removes a line, and unknown line ids come back as user errors.
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use axum::{Router, body::Body};
use http::{HeaderMap, Request, header};
use http_body_util::BodyExt as _;
use serde_json::Value;
use storefront_cart_session::{
    Cart, CartApi, CartCookieConfig, CartId, CartLine, CartLineInput, CartLineUpdateInput,
    CartSessions, SessionSecret, StorefrontError, TokenCodec, routes::cart_router,
};
use tower_cookies::Cookie;

pub const SECRET: &str = "integration-secret";

#[derive(Debug, Default)]
pub struct FakeStorefront {
    carts: Mutex<HashMap<CartId, Cart>>,
    next_id: AtomicUsize,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeStorefront {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drop a cart as if it expired on the platform.
    pub fn forget(&self, id: &CartId) {
        self.carts.lock().expect("carts lock").remove(id);
    }

    pub fn cart_count(&self) -> usize {
        self.carts.lock().expect("carts lock").len()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn add_into(&self, cart: &mut Cart, lines: Vec<CartLineInput>) {
        for input in lines {
            if let Some(line) = cart
                .lines
                .nodes
                .iter_mut()
                .find(|line| line.merchandise.id == input.merchandise_id)
            {
                line.quantity += input.quantity;
                continue;
            }

            let mut line = CartLine {
                id: format!("gid://shopify/CartLine/{}", self.next()),
                quantity: input.quantity,
                ..CartLine::default()
            };
            line.merchandise.id = input.merchandise_id;
            cart.lines.nodes.push(line);
        }
        recount(cart);
    }

    fn with_cart<F>(&self, id: &CartId, f: F) -> Result<Cart, StorefrontError>
    where
        F: FnOnce(&mut Cart) -> Result<(), StorefrontError>,
    {
        let mut carts = self.carts.lock().expect("carts lock");
        let cart = carts
            .get_mut(id)
            .ok_or_else(|| StorefrontError::UserErrors("The specified cart does not exist.".into()))?;
        f(cart)?;
        recount(cart);
        Ok(cart.clone())
    }
}

fn recount(cart: &mut Cart) {
    cart.total_quantity = cart.lines.nodes.iter().map(|line| line.quantity).sum();
}

fn missing_line(id: &str) -> StorefrontError {
    StorefrontError::UserErrors(format!("The merchandise line with id {id} does not exist."))
}

#[async_trait]
impl CartApi for FakeStorefront {
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, StorefrontError> {
        self.record("create_cart");
        let id = CartId::new(format!("gid://shopify/Cart/c{}", self.next()));
        let mut cart = Cart {
            id: id.clone(),
            checkout_url: format!("https://shop.example/cart/c/{id}"),
            ..Cart::default()
        };
        self.add_into(&mut cart, lines);
        self.carts
            .lock()
            .expect("carts lock")
            .insert(id, cart.clone());
        Ok(cart)
    }

    async fn cart(&self, id: &CartId) -> Result<Option<Cart>, StorefrontError> {
        self.record("cart");
        Ok(self.carts.lock().expect("carts lock").get(id).cloned())
    }

    async fn add_lines(
        &self,
        id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, StorefrontError> {
        self.record("add_lines");
        let mut carts = self.carts.lock().expect("carts lock");
        let cart = carts
            .get_mut(id)
            .ok_or_else(|| StorefrontError::UserErrors("The specified cart does not exist.".into()))?;
        self.add_into(cart, lines);
        Ok(cart.clone())
    }

    async fn update_lines(
        &self,
        id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, StorefrontError> {
        self.record("update_lines");
        self.with_cart(id, |cart| {
            for update in lines {
                let line = cart
                    .lines
                    .nodes
                    .iter_mut()
                    .find(|line| line.id == update.id)
                    .ok_or_else(|| missing_line(&update.id))?;
                line.quantity = update.quantity;
            }
            cart.lines.nodes.retain(|line| line.quantity > 0);
            Ok(())
        })
    }

    async fn remove_lines(
        &self,
        id: &CartId,
        line_ids: Vec<String>,
    ) -> Result<Cart, StorefrontError> {
        self.record("remove_lines");
        self.with_cart(id, |cart| {
            for line_id in &line_ids {
                if !cart.lines.nodes.iter().any(|line| &line.id == line_id) {
                    return Err(missing_line(line_id));
                }
            }
            cart.lines.nodes.retain(|line| !line_ids.contains(&line.id));
            Ok(())
        })
    }
}

pub fn codec() -> TokenCodec {
    TokenCodec::new(SessionSecret::new(SECRET).expect("secret is valid"))
}

pub fn app(storefront: Arc<FakeStorefront>) -> Router {
    app_with_config(storefront, CartCookieConfig::default().with_secure(false))
}

pub fn app_with_config(storefront: Arc<FakeStorefront>, config: CartCookieConfig) -> Router {
    cart_router(CartSessions::new(codec(), storefront), config)
}

pub async fn body_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("body collects successfully")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is json")
}

pub fn get_cart_cookie(headers: &HeaderMap) -> Cookie<'static> {
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .expect("response includes set-cookie header");
    let set_cookie = set_cookie
        .to_str()
        .expect("set-cookie header is valid utf-8");
    Cookie::parse_encoded(set_cookie)
        .expect("set-cookie parses successfully")
        .into_owned()
}

pub fn cookie_header_value(cookie: &Cookie<'_>) -> String {
    // Only name=value goes back in a `Cookie` request header.
    format!("{}={}", cookie.name(), cookie.value())
}

pub fn post_json(uri: &str, cookie: Option<&Cookie<'_>>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie_header_value(cookie));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request builds successfully")
}

pub fn get(uri: &str, cookie: Option<&Cookie<'_>>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie_header_value(cookie));
    }
    builder
        .body(Body::empty())
        .expect("request builds successfully")
}

pub fn cart_id_of(body: &Value) -> CartId {
    CartId::new(
        body["cart"]["id"]
            .as_str()
            .expect("response carries a cart id"),
    )
}
