use std::{fmt::Debug, sync::Arc};

use tower_cookies::Cookies;

use crate::config::CartCookieConfig;

/// Where the cart token lives between requests.
///
/// The token is already signed by [`TokenCodec`](crate::TokenCodec), so stores only move opaque
/// strings around.
pub trait TokenStore: Debug + Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: String);
    fn clear(&self);

    /// Whether a token that fails verification should be cleared when it is read.
    fn clear_on_invalid(&self) -> bool {
        true
    }
}

/// [`TokenStore`] backed by the request's cookie jar.
#[derive(Debug, Clone)]
pub struct CookieTokenStore {
    cookies: Cookies,
    config: Arc<CartCookieConfig>,
}

impl CookieTokenStore {
    pub fn new(cookies: Cookies, config: Arc<CartCookieConfig>) -> Self {
        Self { cookies, config }
    }
}

impl TokenStore for CookieTokenStore {
    fn token(&self) -> Option<String> {
        self.cookies
            .get(&self.config.name)
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn set_token(&self, token: String) {
        self.cookies.add(self.config.build_cookie(token));
    }

    fn clear(&self) {
        self.cookies.remove(self.config.removal_cookie());
    }

    fn clear_on_invalid(&self) -> bool {
        self.config.clear_on_invalid_token
    }
}
