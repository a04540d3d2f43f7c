//! Shopify Storefront API client.
//!
//! A thin GraphQL-over-HTTP client behind the product, cart and checkout
//! endpoints. The handful of operations are plain query strings with serde
//! response types rather than a generated schema.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use okome_core::parse_amount;

use crate::config::ShopifyConfig;
use crate::models::Address;
use crate::shopify::ShopifyError;

const CHECKOUT_CREATE: &str = r"
mutation checkoutCreate($input: CheckoutCreateInput!) {
  checkoutCreate(input: $input) {
    checkout {
      id
      webUrl
    }
    checkoutUserErrors {
      field
      message
    }
  }
}";

const PRODUCTS_QUERY: &str = r"
query Products {
  products(first: 20) {
    edges {
      node {
        id
        handle
        title
        description
        featuredImage { url }
        variants(first: 1) { edges { node { id price { amount } availableForSale } } }
      }
    }
  }
}";

const PRODUCT_BY_HANDLE_QUERY: &str = r"
query ProductByHandle($handle: String!) {
  productByHandle(handle: $handle) {
    id
    handle
    title
    description
    featuredImage { url }
    images(first: 8) { edges { node { url } } }
    variants(first: 10) {
      edges {
        node {
          id
          title
          availableForSale
          price { amount }
        }
      }
    }
  }
}";

/// Cart selection shared by every cart operation.
const CART_FIELDS: &str = r"
  id
  checkoutUrl
  totalQuantity
  lines(first: 50) {
    nodes {
      id
      quantity
      cost {
        amountPerQuantity { amount currencyCode }
        subtotalAmount { amount currencyCode }
      }
      merchandise {
        ... on ProductVariant {
          id
          title
          product { title handle }
          image { url altText }
          price { amount currencyCode }
        }
      }
    }
  }
";

/// A line to be checked out: a variant and how many of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutLine {
    #[serde(rename = "variantId")]
    pub variant_id: String,
    pub quantity: i32,
}

/// A created checkout: its Shopify id and the hosted payment URL the
/// frontend redirects the customer to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkout {
    pub id: String,
    #[serde(rename = "webUrl")]
    pub web_url: String,
}

/// A shipping address pre-filled into a checkout, in the shape of the
/// Storefront `MailingAddressInput`. The single recipient name is carried
/// as the last name.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutAddress {
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub address1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub zip: String,
    pub phone: String,
}

impl From<&Address> for CheckoutAddress {
    fn from(address: &Address) -> Self {
        Self {
            last_name: address.recipient_name.clone(),
            address1: address.address_1.clone(),
            address2: address.address_2.clone(),
            zip: address.postal_code.clone(),
            phone: address.phone.clone(),
        }
    }
}

/// One product of the catalog listing, shaped for the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: i64,
    pub available: bool,
}

/// One purchasable variant of a product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductVariant {
    pub id: String,
    pub title: String,
    pub price: i64,
    pub available: bool,
}

/// Full detail of a single product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub price: i64,
}

/// An input line for cart creation or addition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub merchandise_id: String,
    pub quantity: i64,
}

/// A Shopify cart, passed through to the frontend in Storefront shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub checkout_url: String,
    #[serde(default)]
    pub total_quantity: i64,
    #[serde(default)]
    pub lines: CartLineConnection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartLineConnection {
    #[serde(default)]
    pub nodes: Vec<CartLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CartLineCost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchandise: Option<CartMerchandise>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineCost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_per_quantity: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal_amount: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMerchandise {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<CartProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<CartImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartProduct {
    pub title: String,
    pub handle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartImage {
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
}

/// A Storefront money value; the amount stays a decimal string on the
/// wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// Client for the Shopify Storefront API.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.storefront_url.clone(),
                access_token: config.storefront_token.expose_secret().to_owned(),
            }),
        }
    }

    /// Create a checkout for the given lines and return its payment URL.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the request fails, Shopify reports
    /// GraphQL or user errors, or the response is missing the checkout.
    pub async fn create_checkout(
        &self,
        lines: &[CheckoutLine],
        email: Option<&str>,
        shipping: Option<&CheckoutAddress>,
    ) -> Result<Checkout, ShopifyError> {
        let variables = serde_json::json!({
            "input": {
                "lineItems": lines,
                "email": email,
                "shippingAddress": shipping,
            }
        });

        let data: CheckoutCreateData = self.execute(CHECKOUT_CREATE, variables).await?;

        let payload = data.checkout_create.ok_or_else(|| {
            ShopifyError::UnexpectedResponse("checkoutCreate missing from response".to_owned())
        })?;

        if !payload.checkout_user_errors.is_empty() {
            let messages: Vec<String> = payload
                .checkout_user_errors
                .iter()
                .map(|e| e.message.clone())
                .collect();
            return Err(ShopifyError::Graphql(messages.join("; ")));
        }

        payload.checkout.ok_or_else(|| {
            ShopifyError::UnexpectedResponse("checkout missing from response".to_owned())
        })
    }

    /// List the first page of the product catalog.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the request fails or Shopify reports
    /// GraphQL errors.
    pub async fn list_products(&self) -> Result<Vec<ProductSummary>, ShopifyError> {
        let data: ProductsData = self
            .execute(PRODUCTS_QUERY, serde_json::json!({}))
            .await?;

        let edges = data.products.map(|p| p.edges).unwrap_or_default();
        Ok(edges
            .into_iter()
            .filter_map(|e| e.node)
            .map(summarize_product)
            .collect())
    }

    /// Fetch one product by its handle. `None` when Shopify knows no such
    /// product.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the request fails or Shopify reports
    /// GraphQL errors.
    pub async fn product_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<ProductDetail>, ShopifyError> {
        let data: ProductByHandleData = self
            .execute(
                PRODUCT_BY_HANDLE_QUERY,
                serde_json::json!({ "handle": handle }),
            )
            .await?;

        Ok(data.product_by_handle.map(product_detail))
    }

    /// Create a cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on transport failure, GraphQL or user
    /// errors, or a response without a cart.
    pub async fn cart_create(&self, lines: &[CartLineInput]) -> Result<Cart, ShopifyError> {
        let query = format!(
            "mutation CreateCart($lines: [CartLineInput!]) {{
               cartCreate(input: {{ lines: $lines }}) {{
                 cart {{ {CART_FIELDS} }}
                 userErrors {{ message }}
               }}
             }}"
        );

        let data: CartCreateData = self
            .execute(&query, serde_json::json!({ "lines": lines }))
            .await?;

        cart_from(data.cart_create, "cartCreate")
    }

    /// Fetch a cart by id. `None` when the cart does not exist or has
    /// expired.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the request fails or Shopify reports
    /// GraphQL errors.
    pub async fn cart(&self, id: &str) -> Result<Option<Cart>, ShopifyError> {
        let query = format!(
            "query GetCart($id: ID!) {{
               cart(id: $id) {{ {CART_FIELDS} }}
             }}"
        );

        let data: CartData = self.execute(&query, serde_json::json!({ "id": id })).await?;
        Ok(data.cart)
    }

    /// Add lines to an existing cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on transport failure, GraphQL or user
    /// errors, or a response without a cart.
    pub async fn cart_lines_add(
        &self,
        id: &str,
        lines: &[CartLineInput],
    ) -> Result<Cart, ShopifyError> {
        let query = format!(
            "mutation AddLines($id: ID!, $lines: [CartLineInput!]!) {{
               cartLinesAdd(cartId: $id, lines: $lines) {{
                 cart {{ {CART_FIELDS} }}
                 userErrors {{ message }}
               }}
             }}"
        );

        let data: CartLinesAddData = self
            .execute(&query, serde_json::json!({ "id": id, "lines": lines }))
            .await?;

        cart_from(data.cart_lines_add, "cartLinesAdd")
    }

    /// Set the quantity of one cart line.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on transport failure, GraphQL or user
    /// errors, or a response without a cart.
    pub async fn cart_lines_update(
        &self,
        id: &str,
        line_id: &str,
        quantity: i64,
    ) -> Result<Cart, ShopifyError> {
        let query = format!(
            "mutation UpdateLines($id: ID!, $lines: [CartLineUpdateInput!]!) {{
               cartLinesUpdate(cartId: $id, lines: $lines) {{
                 cart {{ {CART_FIELDS} }}
                 userErrors {{ message }}
               }}
             }}"
        );

        let variables = serde_json::json!({
            "id": id,
            "lines": [{ "id": line_id, "quantity": quantity }],
        });

        let data: CartLinesUpdateData = self.execute(&query, variables).await?;

        cart_from(data.cart_lines_update, "cartLinesUpdate")
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on transport failure, GraphQL or user
    /// errors, or a response without a cart.
    pub async fn cart_lines_remove(
        &self,
        id: &str,
        line_ids: &[String],
    ) -> Result<Cart, ShopifyError> {
        let query = format!(
            "mutation RemoveLines($id: ID!, $lineIds: [ID!]!) {{
               cartLinesRemove(cartId: $id, lineIds: $lineIds) {{
                 cart {{ {CART_FIELDS} }}
                 userErrors {{ message }}
               }}
             }}"
        );

        let data: CartLinesRemoveData = self
            .execute(&query, serde_json::json!({ "id": id, "lineIds": line_ids }))
            .await?;

        cart_from(data.cart_lines_remove, "cartLinesRemove")
    }

    /// Execute one GraphQL operation and deserialize its `data` field.
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Storefront-Access-Token", &self.inner.access_token)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ShopifyError::Status {
                status,
                body: body.chars().take(500).collect(),
            });
        }

        let envelope: GraphqlResponse<T> = serde_json::from_str(&body).map_err(|e| {
            ShopifyError::UnexpectedResponse(format!("invalid graphql response: {e}"))
        })?;

        if let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(ShopifyError::Graphql(messages.join("; ")));
        }

        debug!("storefront request succeeded");

        envelope
            .data
            .ok_or_else(|| ShopifyError::UnexpectedResponse("response had no data".to_owned()))
    }
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("endpoint", &self.inner.endpoint)
            .finish_non_exhaustive()
    }
}

fn cart_from(payload: Option<CartPayload>, operation: &str) -> Result<Cart, ShopifyError> {
    let payload = payload.ok_or_else(|| {
        ShopifyError::UnexpectedResponse(format!("{operation} missing from response"))
    })?;

    if !payload.user_errors.is_empty() {
        let messages: Vec<String> = payload
            .user_errors
            .iter()
            .map(|e| e.message.clone())
            .collect();
        return Err(ShopifyError::Graphql(messages.join("; ")));
    }

    payload
        .cart
        .ok_or_else(|| ShopifyError::UnexpectedResponse(format!("{operation} returned no cart")))
}

fn money_amount(money: Option<&Money>) -> i64 {
    money.and_then(|m| parse_amount(&m.amount).ok()).unwrap_or(0)
}

fn summarize_product(node: ProductNode) -> ProductSummary {
    let variant = node
        .variants
        .and_then(|v| v.edges.into_iter().next())
        .and_then(|e| e.node);

    ProductSummary {
        id: node.id,
        handle: node.handle,
        title: node.title,
        description: node.description.unwrap_or_default(),
        image: node
            .featured_image
            .and_then(|i| i.url)
            .unwrap_or_default(),
        price: money_amount(variant.as_ref().and_then(|v| v.price.as_ref())),
        available: variant
            .as_ref()
            .and_then(|v| v.available_for_sale)
            .unwrap_or(true),
    }
}

fn product_detail(node: ProductNode) -> ProductDetail {
    let variants: Vec<ProductVariant> = node
        .variants
        .map(|v| v.edges)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|e| e.node)
        .map(|v| ProductVariant {
            id: v.id,
            title: v.title.unwrap_or_default(),
            price: money_amount(v.price.as_ref()),
            available: v.available_for_sale.unwrap_or(true),
        })
        .collect();

    let images: Vec<String> = node
        .images
        .map(|i| i.edges)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|e| e.node.and_then(|n| n.url))
        .collect();

    ProductDetail {
        id: node.id,
        handle: node.handle,
        title: node.title,
        description: node.description.unwrap_or_default(),
        image: node
            .featured_image
            .and_then(|i| i.url)
            .or_else(|| images.first().cloned())
            .unwrap_or_default(),
        price: variants.first().map_or(0, |v| v.price),
        variants,
        images,
    }
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct CheckoutCreateData {
    #[serde(rename = "checkoutCreate")]
    checkout_create: Option<CheckoutCreatePayload>,
}

#[derive(Deserialize)]
struct CheckoutCreatePayload {
    checkout: Option<Checkout>,
    #[serde(rename = "checkoutUserErrors", default)]
    checkout_user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
struct UserError {
    message: String,
}

#[derive(Deserialize)]
struct ProductsData {
    products: Option<EdgeList<ProductNode>>,
}

#[derive(Deserialize)]
struct ProductByHandleData {
    #[serde(rename = "productByHandle")]
    product_by_handle: Option<ProductNode>,
}

#[derive(Deserialize)]
struct EdgeList<T> {
    #[serde(default)]
    edges: Vec<Edge<T>>,
}

#[derive(Deserialize)]
struct Edge<T> {
    node: Option<T>,
}

#[derive(Deserialize, Default)]
struct ProductNode {
    id: String,
    handle: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "featuredImage", default)]
    featured_image: Option<ImageNode>,
    #[serde(default)]
    images: Option<EdgeList<ImageNode>>,
    #[serde(default)]
    variants: Option<EdgeList<VariantNode>>,
}

#[derive(Deserialize, Default)]
struct ImageNode {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize, Default)]
struct VariantNode {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    price: Option<Money>,
    #[serde(rename = "availableForSale", default)]
    available_for_sale: Option<bool>,
}

#[derive(Deserialize)]
struct CartPayload {
    #[serde(default)]
    cart: Option<Cart>,
    #[serde(rename = "userErrors", default)]
    user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
struct CartData {
    cart: Option<Cart>,
}

#[derive(Deserialize)]
struct CartCreateData {
    #[serde(rename = "cartCreate")]
    cart_create: Option<CartPayload>,
}

#[derive(Deserialize)]
struct CartLinesAddData {
    #[serde(rename = "cartLinesAdd")]
    cart_lines_add: Option<CartPayload>,
}

#[derive(Deserialize)]
struct CartLinesUpdateData {
    #[serde(rename = "cartLinesUpdate")]
    cart_lines_update: Option<CartPayload>,
}

#[derive(Deserialize)]
struct CartLinesRemoveData {
    #[serde(rename = "cartLinesRemove")]
    cart_lines_remove: Option<CartPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_response_parses() {
        let body = r#"{
            "data": {
                "checkoutCreate": {
                    "checkout": {"id": "gid://shopify/Checkout/abc", "webUrl": "https://shop.example/checkout/abc"},
                    "checkoutUserErrors": []
                }
            }
        }"#;

        let envelope: GraphqlResponse<CheckoutCreateData> =
            serde_json::from_str(body).expect("parses");
        let checkout = envelope
            .data
            .and_then(|d| d.checkout_create)
            .and_then(|p| p.checkout)
            .expect("checkout present");

        assert_eq!(checkout.web_url, "https://shop.example/checkout/abc");
    }

    #[test]
    fn test_user_errors_parse() {
        let body = r#"{
            "data": {
                "checkoutCreate": {
                    "checkout": null,
                    "checkoutUserErrors": [{"field": ["lineItems"], "message": "Variant is out of stock"}]
                }
            }
        }"#;

        let envelope: GraphqlResponse<CheckoutCreateData> =
            serde_json::from_str(body).expect("parses");
        let payload = envelope
            .data
            .and_then(|d| d.checkout_create)
            .expect("payload present");

        assert!(payload.checkout.is_none());
        assert_eq!(payload.checkout_user_errors.len(), 1);
    }

    #[test]
    fn test_checkout_address_serializes_as_mailing_address_input() {
        let address = CheckoutAddress {
            last_name: "Yamada Taro".to_owned(),
            address1: "Shibuya 1-2-3".to_owned(),
            address2: None,
            zip: "150-0001".to_owned(),
            phone: "03-1234-5678".to_owned(),
        };

        let json = serde_json::to_value(&address).expect("serializes");
        assert_eq!(json["lastName"], "Yamada Taro");
        assert_eq!(json["address1"], "Shibuya 1-2-3");
        assert_eq!(json["zip"], "150-0001");
        assert!(json.get("address2").is_none());
    }

    #[test]
    fn test_products_response_shapes_summaries() {
        let body = r#"{
            "data": {
                "products": {
                    "edges": [
                        {
                            "node": {
                                "id": "gid://shopify/Product/1",
                                "handle": "koshihikari-5kg",
                                "title": "Koshihikari 5kg",
                                "description": "Rice.",
                                "featuredImage": {"url": "https://cdn.example/rice.jpg"},
                                "variants": {"edges": [{"node": {
                                    "id": "gid://shopify/ProductVariant/11",
                                    "price": {"amount": "3500.0"},
                                    "availableForSale": true
                                }}]}
                            }
                        },
                        {
                            "node": {
                                "id": "gid://shopify/Product/2",
                                "handle": "no-variant",
                                "title": "No variant",
                                "description": null,
                                "featuredImage": null,
                                "variants": {"edges": []}
                            }
                        }
                    ]
                }
            }
        }"#;

        let envelope: GraphqlResponse<ProductsData> = serde_json::from_str(body).expect("parses");
        let edges = envelope
            .data
            .and_then(|d| d.products)
            .map(|p| p.edges)
            .expect("edges present");
        let items: Vec<ProductSummary> = edges
            .into_iter()
            .filter_map(|e| e.node)
            .map(summarize_product)
            .collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].handle, "koshihikari-5kg");
        assert_eq!(items[0].price, 3500);
        assert!(items[0].available);
        assert_eq!(items[1].price, 0);
        assert!(items[1].image.is_empty());
    }

    #[test]
    fn test_product_detail_falls_back_to_first_image() {
        let node: ProductNode = serde_json::from_str(
            r#"{
                "id": "gid://shopify/Product/1",
                "handle": "koshihikari-5kg",
                "title": "Koshihikari 5kg",
                "featuredImage": null,
                "images": {"edges": [{"node": {"url": "https://cdn.example/a.jpg"}}]},
                "variants": {"edges": [
                    {"node": {"id": "v1", "title": "5kg", "price": {"amount": "3500"}, "availableForSale": false}}
                ]}
            }"#,
        )
        .expect("parses");

        let detail = product_detail(node);
        assert_eq!(detail.image, "https://cdn.example/a.jpg");
        assert_eq!(detail.price, 3500);
        assert_eq!(detail.variants.len(), 1);
        assert!(!detail.variants[0].available);
    }

    #[test]
    fn test_cart_round_trips_storefront_shape() {
        let body = r#"{
            "id": "gid://shopify/Cart/xyz",
            "checkoutUrl": "https://shop.example/cart/c/xyz",
            "totalQuantity": 2,
            "lines": {"nodes": [{
                "id": "gid://shopify/CartLine/1",
                "quantity": 2,
                "cost": {
                    "amountPerQuantity": {"amount": "3500.0", "currencyCode": "JPY"},
                    "subtotalAmount": {"amount": "7000.0", "currencyCode": "JPY"}
                },
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/11",
                    "title": "5kg",
                    "product": {"title": "Koshihikari 5kg", "handle": "koshihikari-5kg"},
                    "image": {"url": "https://cdn.example/rice.jpg", "altText": null},
                    "price": {"amount": "3500.0", "currencyCode": "JPY"}
                }
            }]}
        }"#;

        let cart: Cart = serde_json::from_str(body).expect("parses");
        assert_eq!(cart.total_quantity, 2);
        assert_eq!(cart.lines.nodes.len(), 1);

        let out = serde_json::to_value(&cart).expect("serializes");
        assert_eq!(out["checkoutUrl"], "https://shop.example/cart/c/xyz");
        assert_eq!(out["lines"]["nodes"][0]["merchandise"]["product"]["handle"], "koshihikari-5kg");
    }

    #[test]
    fn test_cart_user_errors_surface_as_graphql_error() {
        let payload: CartPayload = serde_json::from_str(
            r#"{"cart": null, "userErrors": [{"message": "Merchandise is sold out"}]}"#,
        )
        .expect("parses");

        let err = cart_from(Some(payload), "cartLinesAdd").expect_err("user errors reject");
        assert!(matches!(err, ShopifyError::Graphql(m) if m.contains("sold out")));
    }
}
