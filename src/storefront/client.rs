use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

use super::{
    CartApi,
    model::{Cart, CartId, CartLineInput, CartLineUpdateInput},
    queries,
};
use crate::{error::StorefrontError, settings::StorefrontSettings};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

/// GraphQL client for the storefront cart operations.
///
/// Every request bypasses caching; cart state is always read fresh from the remote.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: Client,
    endpoint: String,
    access_token: String,
}

impl StorefrontClient {
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint, access_token)
    }

    pub fn with_client(
        http: Client,
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_settings(settings: &StorefrontSettings) -> Result<Self, StorefrontError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_client(
            builder.build()?,
            settings.endpoint(),
            settings.access_token.clone(),
        ))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &'static str,
        variables: Value,
    ) -> Result<T, StorefrontError> {
        tracing::debug!(operation, "storefront request");

        let res = self
            .http
            .post(&self.endpoint)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(operation, %status, "storefront request rejected");
            return Err(StorefrontError::Status(status));
        }

        let body: GraphQlResponse<T> = res.json().await?;

        if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            tracing::warn!(operation, count = errors.len(), "storefront graphql errors");
            return Err(StorefrontError::GraphQl(join_messages(
                errors.into_iter().map(|e| e.message),
            )));
        }

        body.data.ok_or(StorefrontError::MissingData("data"))
    }
}

#[async_trait]
impl CartApi for StorefrontClient {
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, StorefrontError> {
        let data: CreateCartData = self
            .execute("cartCreate", queries::CREATE_CART, json!({ "lines": lines }))
            .await?;
        data.cart_create.into_cart()
    }

    async fn cart(&self, id: &CartId) -> Result<Option<Cart>, StorefrontError> {
        let data: GetCartData = self
            .execute("cart", queries::GET_CART, json!({ "cartId": id }))
            .await?;
        Ok(data.cart)
    }

    async fn add_lines(
        &self,
        id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, StorefrontError> {
        let data: AddLinesData = self
            .execute(
                "cartLinesAdd",
                queries::ADD_TO_CART,
                json!({ "cartId": id, "lines": lines }),
            )
            .await?;
        data.cart_lines_add.into_cart()
    }

    async fn update_lines(
        &self,
        id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, StorefrontError> {
        let data: UpdateLinesData = self
            .execute(
                "cartLinesUpdate",
                queries::UPDATE_CART,
                json!({ "cartId": id, "lines": lines }),
            )
            .await?;
        data.cart_lines_update.into_cart()
    }

    async fn remove_lines(
        &self,
        id: &CartId,
        line_ids: Vec<String>,
    ) -> Result<Cart, StorefrontError> {
        let data: RemoveLinesData = self
            .execute(
                "cartLinesRemove",
                queries::REMOVE_FROM_CART,
                json!({ "cartId": id, "lineIds": line_ids }),
            )
            .await?;
        data.cart_lines_remove.into_cart()
    }
}

fn join_messages(messages: impl Iterator<Item = String>) -> String {
    messages.collect::<Vec<_>>().join("\n")
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UserError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartPayload {
    cart: Option<Cart>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

impl CartPayload {
    fn into_cart(self) -> Result<Cart, StorefrontError> {
        if !self.user_errors.is_empty() {
            return Err(StorefrontError::UserErrors(join_messages(
                self.user_errors.into_iter().map(|e| e.message),
            )));
        }
        self.cart.ok_or(StorefrontError::MissingData("cart"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCartData {
    cart_create: CartPayload,
}

#[derive(Debug, Deserialize)]
struct GetCartData {
    cart: Option<Cart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddLinesData {
    cart_lines_add: CartPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateLinesData {
    cart_lines_update: CartPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveLinesData {
    cart_lines_remove: CartPayload,
}
