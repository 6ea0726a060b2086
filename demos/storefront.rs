//! Serves the cart endpoints against a real storefront.
//!
//! ```sh
//! SESSION_SECRET=dev-secret \
//! SHOPIFY_STORE_DOMAIN=your-store.myshopify.com \
//! SHOPIFY_STOREFRONT_API_TOKEN=... \
//! RUST_LOG=storefront_cart_session=debug \
//! cargo run --example storefront
//! ```

use std::{net::SocketAddr, sync::Arc};

use storefront_cart_session::{
    CartSessions, Settings, StorefrontClient, TokenCodec, routes::cart_router,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let client = StorefrontClient::from_settings(&settings.storefront)?;
    tracing::info!(
        endpoint = client.endpoint(),
        environment = ?settings.environment,
        "storefront configured"
    );

    let sessions = CartSessions::new(TokenCodec::new(settings.secret.clone()), Arc::new(client));
    let app = cart_router(sessions, settings.cookie_config());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
