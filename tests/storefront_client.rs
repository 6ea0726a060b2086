// `StorefrontClient` against a local GraphQL endpoint that replays canned responses.
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use serde_json::{Value, json};
use storefront_cart_session::{
    CartApi, CartId, CartLineInput, CartLineUpdateInput, StorefrontClient, StorefrontError,
};
use testresult::TestResult;

#[derive(Debug, Clone)]
struct Endpoint {
    reply: Arc<(StatusCode, Value)>,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl Endpoint {
    fn requests(&self) -> Vec<(Option<String>, Value)> {
        self.seen.lock().expect("seen lock").clone()
    }
}

async fn graphql(
    State(endpoint): State<Endpoint>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let token = headers
        .get("x-shopify-storefront-access-token")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    endpoint.seen.lock().expect("seen lock").push((token, body));

    let (status, reply) = endpoint.reply.as_ref();
    (*status, Json(reply.clone()))
}

async fn serve(status: StatusCode, reply: Value) -> TestResult<(StorefrontClient, Endpoint)> {
    let endpoint = Endpoint {
        reply: Arc::new((status, reply)),
        seen: Arc::default(),
    };
    let app = Router::new()
        .route("/api/2024-10/graphql.json", post(graphql))
        .with_state(endpoint.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake endpoint serves");
    });

    let client = StorefrontClient::new(
        format!("http://{addr}/api/2024-10/graphql.json"),
        "public-token",
    );
    Ok((client, endpoint))
}

fn money(amount: &str) -> Value {
    json!({ "amount": amount, "currencyCode": "USD" })
}

fn cart_json(id: &str) -> Value {
    json!({
        "id": id,
        "checkoutUrl": "https://shop.example/cart/c/1",
        "totalQuantity": 2,
        "lines": { "nodes": [{
            "id": "gid://shopify/CartLine/1",
            "quantity": 2,
            "merchandise": {
                "id": "gid://variant/1",
                "title": "Large",
                "selectedOptions": [{ "name": "Size", "value": "Large" }],
                "product": {
                    "id": "gid://product/1",
                    "title": "Mug",
                    "handle": "mug",
                    "vendor": "RTV"
                },
                "image": null,
                "price": money("10.0"),
                "compareAtPrice": null
            },
            "cost": {
                "totalAmount": money("20.0"),
                "amountPerQuantity": money("10.0"),
                "compareAtAmountPerQuantity": null
            }
        }] },
        "cost": {
            "subtotalAmount": money("20.0"),
            "totalAmount": money("20.0"),
            "totalTaxAmount": null
        },
        "note": null,
        "attributes": [],
        "discountCodes": []
    })
}

#[tokio::test]
async fn create_sends_token_and_variables() -> TestResult {
    let (client, endpoint) = serve(
        StatusCode::OK,
        json!({ "data": { "cartCreate": {
            "cart": cart_json("gid://shopify/Cart/1"),
            "userErrors": []
        } } }),
    )
    .await?;

    let cart = client
        .create_cart(vec![CartLineInput::new("gid://variant/1", 2)])
        .await?;

    assert_eq!(cart.id, CartId::new("gid://shopify/Cart/1"));
    assert_eq!(cart.total_quantity, 2);
    assert_eq!(cart.lines.nodes[0].merchandise.id, "gid://variant/1");

    let requests = endpoint.requests();
    assert_eq!(requests.len(), 1);
    let (token, body) = &requests[0];
    assert_eq!(token.as_deref(), Some("public-token"));
    assert!(
        body["query"]
            .as_str()
            .is_some_and(|query| query.contains("cartCreate"))
    );
    assert_eq!(
        body["variables"]["lines"],
        json!([{ "merchandiseId": "gid://variant/1", "quantity": 2 }])
    );

    Ok(())
}

#[tokio::test]
async fn unknown_cart_is_none() -> TestResult {
    let (client, endpoint) = serve(StatusCode::OK, json!({ "data": { "cart": null } })).await?;

    let cart = client.cart(&CartId::new("gid://shopify/Cart/gone")).await?;

    assert!(cart.is_none());
    assert_eq!(
        endpoint.requests()[0].1["variables"]["cartId"],
        "gid://shopify/Cart/gone"
    );

    Ok(())
}

#[tokio::test]
async fn user_errors_are_joined() -> TestResult {
    let (client, _) = serve(
        StatusCode::OK,
        json!({ "data": { "cartLinesUpdate": {
            "cart": null,
            "userErrors": [
                { "field": ["lines", "0"], "message": "Line not found" },
                { "field": null, "message": "Quantity is too high" }
            ]
        } } }),
    )
    .await?;

    let err = client
        .update_lines(
            &CartId::new("gid://shopify/Cart/1"),
            vec![CartLineUpdateInput::new("gid://shopify/CartLine/9", 3)],
        )
        .await
        .expect_err("user errors fail the call");

    assert!(matches!(err, StorefrontError::UserErrors(_)));
    assert_eq!(err.to_string(), "Line not found\nQuantity is too high");

    Ok(())
}

#[tokio::test]
async fn top_level_errors_are_joined() -> TestResult {
    let (client, _) = serve(
        StatusCode::OK,
        json!({ "errors": [
            { "message": "Throttled" },
            { "message": "Try again later" }
        ] }),
    )
    .await?;

    let err = client
        .remove_lines(
            &CartId::new("gid://shopify/Cart/1"),
            vec!["gid://shopify/CartLine/1".to_owned()],
        )
        .await
        .expect_err("graphql errors fail the call");

    assert!(matches!(err, StorefrontError::GraphQl(_)));
    assert_eq!(err.to_string(), "Throttled\nTry again later");

    Ok(())
}

#[tokio::test]
async fn non_success_status_fails_with_status() -> TestResult {
    let (client, _) = serve(StatusCode::UNAUTHORIZED, json!({})).await?;

    let err = client
        .add_lines(
            &CartId::new("gid://shopify/Cart/1"),
            vec![CartLineInput::new("gid://variant/1", 1)],
        )
        .await
        .expect_err("401 fails the call");

    assert!(matches!(
        err,
        StorefrontError::Status(StatusCode::UNAUTHORIZED)
    ));
    assert!(err.to_string().starts_with("Shopify API error: 401"));

    Ok(())
}
