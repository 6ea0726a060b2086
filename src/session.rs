//! Get-or-create cart orchestration.
//!
//! Every mutating operation runs the same flow: verify the stored token, make sure the cart it
//! names still exists remotely, and fall back to creating a fresh cart (and a fresh token) when
//! either check fails. Only the storefront's own errors and local validation failures ever reach
//! the caller; a bad token or a vanished cart is absorbed here.

use std::{fmt, sync::Arc};

use axum::extract::FromRequestParts;
use http::{StatusCode, request::Parts};

use crate::{
    controller::{CookieTokenStore, TokenStore},
    error::{CartError, StorefrontError},
    format::{TokenCodec, Verification},
    storefront::{Cart, CartApi, CartId, CartLineInput, CartLineUpdateInput},
};

/// Shared cart session machinery: the token codec plus the remote cart API.
#[derive(Clone)]
pub struct CartSessions {
    codec: Arc<TokenCodec>,
    api: Arc<dyn CartApi>,
}

impl fmt::Debug for CartSessions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSessions")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

enum Mutation {
    Add(Vec<CartLineInput>),
    Update(Vec<CartLineUpdateInput>),
    Remove(Vec<String>),
}

impl Mutation {
    async fn apply(self, api: &dyn CartApi, id: &CartId) -> Result<Cart, StorefrontError> {
        match self {
            Self::Add(lines) => api.add_lines(id, lines).await,
            Self::Update(lines) => api.update_lines(id, lines).await,
            Self::Remove(line_ids) => api.remove_lines(id, line_ids).await,
        }
    }

    /// Lines a replacement cart starts with. Line ids from another cart mean nothing in a fresh
    /// one, so only additions carry over.
    fn into_seed(self) -> Vec<CartLineInput> {
        match self {
            Self::Add(lines) => lines,
            Self::Update(_) | Self::Remove(_) => Vec::new(),
        }
    }
}

impl CartSessions {
    pub fn new(codec: TokenCodec, api: Arc<dyn CartApi>) -> Self {
        Self {
            codec: Arc::new(codec),
            api,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// The cart id named by a valid stored token, if any.
    pub fn session_cart_id<S: TokenStore + ?Sized>(&self, store: &S) -> Option<CartId> {
        let token = store.token()?;

        match self.codec.verify(&token) {
            Verification::Valid(id) => Some(id),
            Verification::Invalid(reason) => {
                tracing::debug!(%reason, "cart token rejected");
                if store.clear_on_invalid() {
                    store.clear();
                }
                None
            }
        }
    }

    /// Read the session's cart. Never creates one.
    pub async fn cart<S: TokenStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Option<Cart>, CartError> {
        let Some(id) = self.session_cart_id(store) else {
            return Ok(None);
        };

        Ok(self.api.cart(&id).await?)
    }

    pub async fn add_lines<S: TokenStore + ?Sized>(
        &self,
        store: &S,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, CartError> {
        if lines.is_empty() {
            return Err(CartError::validation("at least one line is required"));
        }
        for line in &lines {
            if line.merchandise_id.trim().is_empty() {
                return Err(CartError::validation("merchandiseId is required"));
            }
            if line.quantity == 0 {
                return Err(CartError::validation("quantity must be at least 1"));
            }
        }

        self.get_or_create(store, Mutation::Add(lines)).await
    }

    pub async fn update_lines<S: TokenStore + ?Sized>(
        &self,
        store: &S,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, CartError> {
        if lines.is_empty() {
            return Err(CartError::validation("at least one line is required"));
        }
        if lines.iter().any(|line| line.id.trim().is_empty()) {
            return Err(CartError::validation("lineId is required"));
        }

        self.get_or_create(store, Mutation::Update(lines)).await
    }

    pub async fn remove_lines<S: TokenStore + ?Sized>(
        &self,
        store: &S,
        line_ids: Vec<String>,
    ) -> Result<Cart, CartError> {
        if line_ids.is_empty() {
            return Err(CartError::validation("lineIds array is required"));
        }
        if line_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(CartError::validation("lineIds must not contain empty ids"));
        }

        self.get_or_create(store, Mutation::Remove(line_ids)).await
    }

    /// Forget the session's cart. The remote cart itself is left alone.
    pub fn clear<S: TokenStore + ?Sized>(&self, store: &S) {
        store.clear();
    }

    async fn get_or_create<S: TokenStore + ?Sized>(
        &self,
        store: &S,
        mutation: Mutation,
    ) -> Result<Cart, CartError> {
        if let Some(id) = self.session_cart_id(store) {
            // Transport and GraphQL failures propagate; only an explicit "no such cart" recreates.
            if self.api.cart(&id).await?.is_some() {
                return Ok(mutation.apply(self.api.as_ref(), &id).await?);
            }
            tracing::info!(cart_id = %id, "session cart no longer exists remotely");
        }

        let cart = self.api.create_cart(mutation.into_seed()).await?;
        let token = self.codec.issue(&cart.id)?;
        store.set_token(token);
        tracing::debug!(cart_id = %cart.id, "issued cart session");

        Ok(cart)
    }
}

/// Request-scoped cart session, handed to handlers by
/// [`CartSessionLayer`](crate::CartSessionLayer).
#[derive(Debug, Clone)]
pub struct CartSession {
    sessions: CartSessions,
    store: CookieTokenStore,
}

impl CartSession {
    pub fn new(sessions: CartSessions, store: CookieTokenStore) -> Self {
        Self { sessions, store }
    }

    pub fn cart_id(&self) -> Option<CartId> {
        self.sessions.session_cart_id(&self.store)
    }

    pub async fn cart(&self) -> Result<Option<Cart>, CartError> {
        self.sessions.cart(&self.store).await
    }

    pub async fn add_lines(&self, lines: Vec<CartLineInput>) -> Result<Cart, CartError> {
        self.sessions.add_lines(&self.store, lines).await
    }

    pub async fn add_line(
        &self,
        merchandise_id: impl Into<String>,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        self.add_lines(vec![CartLineInput::new(merchandise_id, quantity)])
            .await
    }

    pub async fn update_lines(&self, lines: Vec<CartLineUpdateInput>) -> Result<Cart, CartError> {
        self.sessions.update_lines(&self.store, lines).await
    }

    pub async fn update_line(
        &self,
        line_id: impl Into<String>,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        self.update_lines(vec![CartLineUpdateInput::new(line_id, quantity)])
            .await
    }

    pub async fn remove_lines(&self, line_ids: Vec<String>) -> Result<Cart, CartError> {
        self.sessions.remove_lines(&self.store, line_ids).await
    }

    pub fn clear(&self) {
        self.sessions.clear(&self.store);
    }
}

impl<S> FromRequestParts<S> for CartSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CartSession>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Can't extract cart session. Is `CartSessionLayer` enabled?",
        ))
    }
}
