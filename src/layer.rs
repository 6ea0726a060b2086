use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use http::{Request, Response};
use tower_cookies::CookieManager;
use tower_layer::Layer;
use tower_service::Service;

use crate::{
    config::CartCookieConfig,
    controller::CookieTokenStore,
    session::{CartSession, CartSessions},
};

/// Inserts a request-scoped [`CartSession`] into request extensions.
///
/// Cookie reads and writes go through `tower_cookies`, which this layer installs itself.
#[derive(Debug, Clone)]
pub struct CartSessionLayer {
    config: Arc<CartCookieConfig>,
    sessions: CartSessions,
}

impl CartSessionLayer {
    #[must_use]
    pub fn new(sessions: CartSessions) -> Self {
        Self {
            config: Arc::new(CartCookieConfig::default()),
            sessions,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: CartCookieConfig) -> Self {
        self.config = Arc::new(config);
        self
    }
}

#[derive(Debug, Clone)]
pub struct CartSessionManager<S> {
    inner: S,
    config: Arc<CartCookieConfig>,
    sessions: CartSessions,
}

impl<S> Layer<S> for CartSessionLayer {
    type Service = CookieManager<CartSessionManager<S>>;

    fn layer(&self, inner: S) -> Self::Service {
        CookieManager::new(CartSessionManager {
            inner,
            config: self.config.clone(),
            sessions: self.sessions.clone(),
        })
    }
}

impl<ReqBody, ResBody, S> Service<Request<ReqBody>> for CartSessionManager<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Default + Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let config = self.config.clone();
        let sessions = self.sessions.clone();

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let Some(cookies) = req.extensions().get::<tower_cookies::Cookies>().cloned() else {
                tracing::error!("cookie manager did not run before the cart session layer");
                let mut res = Response::default();
                *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                return Ok(res);
            };

            let store = CookieTokenStore::new(cookies, config);
            req.extensions_mut()
                .insert(CartSession::new(sessions, store));

            inner.call(req).await
        })
    }
}
