//! Signed cart-session cookies for headless storefronts.
//!
//! A shopper's cart lives on the commerce platform; the browser only holds a pointer to it: a
//! cookie carrying a signed, expiring token whose single claim is the remote cart id. This crate
//! issues and verifies that token, moves it in and out of the cookie jar, and runs the
//! get-or-create flow every cart mutation needs:
//!
//! 1. verify the cookie's token (a bad or expired token means "no cart");
//! 2. check that the named cart still exists remotely;
//! 3. mutate it, or create a replacement cart and issue a new cookie.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use storefront_cart_session::{
//!     CartSessions, Settings, StorefrontClient, TokenCodec, routes::cart_router,
//! };
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::from_env()?;
//! let client = StorefrontClient::from_settings(&settings.storefront)?;
//! let sessions = CartSessions::new(TokenCodec::new(settings.secret.clone()), Arc::new(client));
//!
//! let app: axum::Router = cart_router(sessions, settings.cookie_config());
//! # Ok(())
//! # }
//! ```

mod config;
mod controller;
mod error;
pub mod format;
pub mod layer;
pub mod routes;
mod secret;
mod session;
pub mod settings;
pub mod storefront;

pub use time::Duration;
pub use tower_cookies::cookie::SameSite;

pub use crate::config::CartCookieConfig;
pub use crate::controller::{CookieTokenStore, TokenStore};
pub use crate::error::{CartError, ConfigError, InvalidToken, IssueError, StorefrontError};
pub use crate::format::{TokenCodec, Verification};
pub use crate::layer::CartSessionLayer;
pub use crate::secret::{SESSION_SECRET_VAR, SessionSecret};
pub use crate::session::{CartSession, CartSessions};
pub use crate::settings::{Environment, Settings};
pub use crate::storefront::{
    Cart, CartApi, CartId, CartLine, CartLineInput, CartLineUpdateInput, StorefrontClient,
};

/// Name of the cookie carrying the cart token.
pub const DEFAULT_COOKIE_NAME: &str = "rtv_cart_id";

/// Lifetime of a cart token and of the cookie holding it: 14 days.
pub const DEFAULT_SESSION_TTL: Duration = Duration::days(14);
