//! Webhook order payload parsing and field derivation.
//!
//! Shopify's webhook JSON is loosely typed: ids arrive as numbers or
//! strings depending on API version, prices are decimal strings, and most
//! fields are optional. Everything here is deserialized leniently and then
//! derived into the strict [`NewOrder`] / [`NewOrderItem`] shapes the
//! repositories persist.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use okome_core::{AmountError, FulfillStatus, OrderStatus, parse_amount};

use crate::db::orders::{NewOrder, NewOrderItem};
use crate::models::ShippingSnapshot;

/// Fallback currency when the payload omits one.
const DEFAULT_CURRENCY: &str = "JPY";

/// Errors deriving order fields from a parsed payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// A field the derivation cannot proceed without is absent.
    #[error("payload is missing required field `{0}`")]
    MissingField(&'static str),

    /// A price field could not be parsed as a decimal amount.
    #[error("invalid amount in field `{field}`: {source}")]
    InvalidAmount {
        field: &'static str,
        source: AmountError,
    },

    /// A line item carried a zero or negative quantity.
    #[error("invalid line item quantity {0}")]
    InvalidQuantity(i64),
}

/// A JSON value that may be a number or a string, kept as sent.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumOrStr {
    Num(i64),
    Str(String),
}

impl NumOrStr {
    fn to_id_string(&self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Str(s) => s.clone(),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
        }
    }
}

/// An order webhook payload (`orders/create`, `orders/updated`).
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPayload {
    pub id: Option<NumOrStr>,
    #[serde(default)]
    pub order_number: Option<NumOrStr>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub total_price: Option<NumOrStr>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddressPayload>,
    #[serde(default)]
    pub line_items: Vec<LineItemPayload>,
    #[serde(default)]
    pub fulfillments: Vec<FulfillmentPayload>,
}

/// One entry of the order payload's `fulfillments` array. Only the
/// timestamp is of interest.
#[derive(Debug, Clone, Deserialize)]
pub struct FulfillmentPayload {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The shipping address block of an order payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingAddressPayload {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// REST payloads call the postal code `zip`; some variants send
    /// `postal_code`. Either is accepted.
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
}

/// One line item of an order payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemPayload {
    #[serde(default)]
    pub id: Option<NumOrStr>,
    #[serde(default)]
    pub product_id: Option<NumOrStr>,
    #[serde(default)]
    pub variant_id: Option<NumOrStr>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub price: Option<NumOrStr>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl OrderPayload {
    /// Derive the persistable order and item set from this payload.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError` if the order id or total price is missing, or
    /// a price cannot be parsed.
    pub fn derive(&self) -> Result<(NewOrder, Vec<NewOrderItem>), PayloadError> {
        let shopify_order_id = self
            .id
            .as_ref()
            .map(NumOrStr::to_id_string)
            .filter(|id| !id.is_empty())
            .ok_or(PayloadError::MissingField("id"))?;

        let total_price = match self.total_price.as_ref() {
            Some(NumOrStr::Num(n)) => *n,
            Some(NumOrStr::Str(s)) => {
                parse_amount(s).map_err(|source| PayloadError::InvalidAmount {
                    field: "total_price",
                    source,
                })?
            }
            None => return Err(PayloadError::MissingField("total_price")),
        };

        let email = self
            .email
            .as_deref()
            .or(self.contact_email.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_owned);

        let currency = self
            .currency
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_owned();

        let order = NewOrder {
            shopify_order_id,
            order_number: self.order_number.as_ref().and_then(NumOrStr::as_i64),
            email,
            currency,
            total_price,
            status: OrderStatus::from_financial_status(self.financial_status.as_deref()),
            fulfill_status: FulfillStatus::from_fulfillment_status(
                self.fulfillment_status.as_deref(),
            ),
            ordered_at: self.processed_at.or(self.created_at),
            shipping: self.shipping_address.as_ref().map(derive_shipping),
        };

        let items = self
            .line_items
            .iter()
            .enumerate()
            .map(|(index, line)| derive_item(line, index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((order, items))
    }

    /// The timestamp the order was fulfilled, taken from the newest entry
    /// of the `fulfillments` array.
    #[must_use]
    pub fn fulfilled_at(&self) -> Option<DateTime<Utc>> {
        self.fulfillments.iter().filter_map(|f| f.created_at).max()
    }
}

fn derive_shipping(addr: &ShippingAddressPayload) -> ShippingSnapshot {
    let joined = match (addr.first_name.as_deref(), addr.last_name.as_deref()) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (Some(only), None) | (None, Some(only)) => Some(only.to_owned()),
        (None, None) => None,
    };

    ShippingSnapshot {
        name: joined.or_else(|| addr.name.clone()),
        phone: addr.phone.clone(),
        postal_code: addr.zip.clone().or_else(|| addr.postal_code.clone()),
        address_1: addr.address1.clone(),
        address_2: addr.address2.clone(),
    }
}

fn derive_item(line: &LineItemPayload, index: usize) -> Result<NewOrderItem, PayloadError> {
    let price = match line.price.as_ref() {
        Some(NumOrStr::Num(n)) => *n,
        Some(NumOrStr::Str(s)) => parse_amount(s).map_err(|source| PayloadError::InvalidAmount {
            field: "line_items.price",
            source,
        })?,
        None => 0,
    };

    // A missing quantity means one; an explicit non-positive (or absurdly
    // large) quantity is upstream garbage we refuse to persist.
    let quantity = line.quantity.unwrap_or(1);
    let quantity = i32::try_from(quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or(PayloadError::InvalidQuantity(quantity))?;

    Ok(NewOrderItem {
        product_id: synthesize_product_id(line, index),
        title: line.title.clone().unwrap_or_default(),
        quantity,
        price,
        image_url: line.image_url.clone(),
    })
}

/// Pick a non-empty product identifier for a line item.
///
/// Priority: `product_id`, then `variant_id`, then `sku`, then a
/// placeholder derived from the line-item id (or its position when even
/// that is absent).
fn synthesize_product_id(line: &LineItemPayload, index: usize) -> String {
    line.product_id
        .as_ref()
        .map(NumOrStr::to_id_string)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            line.variant_id
                .as_ref()
                .map(NumOrStr::to_id_string)
                .filter(|s| !s.is_empty())
        })
        .or_else(|| line.sku.clone().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| match line.id.as_ref() {
            Some(id) => format!("line-{}", id.to_id_string()),
            None => format!("line-pos-{index}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> OrderPayload {
        serde_json::from_str(json).expect("payload parses")
    }

    #[test]
    fn test_derive_full_payload() {
        let payload = parse(
            r#"{
                "id": 555,
                "order_number": 1001,
                "email": "a@x.com",
                "total_price": "100.00",
                "currency": "JPY",
                "financial_status": "pending",
                "created_at": "2024-01-01T00:00:00Z",
                "line_items": [
                    {"id": 1, "product_id": 9, "title": "Rice", "quantity": 2, "price": "50.00"}
                ]
            }"#,
        );

        let (order, items) = payload.derive().expect("derives");

        assert_eq!(order.shopify_order_id, "555");
        assert_eq!(order.order_number, Some(1001));
        assert_eq!(order.email.as_deref(), Some("a@x.com"));
        assert_eq!(order.currency, "JPY");
        assert_eq!(order.total_price, 100);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.fulfill_status, FulfillStatus::Unfulfilled);
        assert!(order.ordered_at.is_some());

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "9");
        assert_eq!(items[0].title, "Rice");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].price, 50);
    }

    #[test]
    fn test_string_and_numeric_ids_normalize() {
        let numeric = parse(r#"{"id": 42, "total_price": "10"}"#);
        let string = parse(r#"{"id": "42", "total_price": "10"}"#);

        assert_eq!(
            numeric.derive().expect("derives").0.shopify_order_id,
            string.derive().expect("derives").0.shopify_order_id,
        );
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let payload = parse(r#"{"total_price": "10"}"#);

        assert!(matches!(
            payload.derive(),
            Err(PayloadError::MissingField("id"))
        ));
    }

    #[test]
    fn test_missing_total_price_is_an_error() {
        let payload = parse(r#"{"id": 1}"#);

        assert!(matches!(
            payload.derive(),
            Err(PayloadError::MissingField("total_price"))
        ));
    }

    #[test]
    fn test_fractional_total_rounds_half_away_from_zero() {
        let payload = parse(r#"{"id": 1, "total_price": "1999.6"}"#);
        assert_eq!(payload.derive().expect("derives").0.total_price, 2000);

        let payload = parse(r#"{"id": 1, "total_price": "1999.4"}"#);
        assert_eq!(payload.derive().expect("derives").0.total_price, 1999);
    }

    #[test]
    fn test_email_falls_back_to_contact_email() {
        let payload = parse(r#"{"id": 1, "total_price": "10", "contact_email": "c@x.com"}"#);
        assert_eq!(
            payload.derive().expect("derives").0.email.as_deref(),
            Some("c@x.com")
        );

        let payload = parse(
            r#"{"id": 1, "total_price": "10", "email": "a@x.com", "contact_email": "c@x.com"}"#,
        );
        assert_eq!(
            payload.derive().expect("derives").0.email.as_deref(),
            Some("a@x.com")
        );
    }

    #[test]
    fn test_missing_currency_defaults() {
        let payload = parse(r#"{"id": 1, "total_price": "10"}"#);
        assert_eq!(payload.derive().expect("derives").0.currency, "JPY");
    }

    #[test]
    fn test_financial_status_mapping() {
        for (upstream, expected) in [
            (r#""paid""#, OrderStatus::Paid),
            (r#""refunded""#, OrderStatus::Cancelled),
            (r#""voided""#, OrderStatus::Cancelled),
            (r#""pending""#, OrderStatus::Pending),
            ("null", OrderStatus::Pending),
        ] {
            let payload = parse(&format!(
                r#"{{"id": 1, "total_price": "10", "financial_status": {upstream}}}"#
            ));
            assert_eq!(payload.derive().expect("derives").0.status, expected);
        }
    }

    #[test]
    fn test_ordered_at_prefers_processed_at() {
        let payload = parse(
            r#"{
                "id": 1, "total_price": "10",
                "processed_at": "2024-02-02T00:00:00Z",
                "created_at": "2024-01-01T00:00:00Z"
            }"#,
        );

        let ordered_at = payload.derive().expect("derives").0.ordered_at;
        assert_eq!(
            ordered_at,
            Some("2024-02-02T00:00:00Z".parse().expect("valid timestamp"))
        );
    }

    #[test]
    fn test_shipping_name_joined_and_zip_fallback() {
        let payload = parse(
            r#"{
                "id": 1, "total_price": "10",
                "shipping_address": {
                    "first_name": "Taro",
                    "last_name": "Yamada",
                    "zip": "150-0001",
                    "address1": "Shibuya 1-2-3"
                }
            }"#,
        );

        let shipping = payload
            .derive()
            .expect("derives")
            .0
            .shipping
            .expect("snapshot present");
        assert_eq!(shipping.name.as_deref(), Some("Taro Yamada"));
        assert_eq!(shipping.postal_code.as_deref(), Some("150-0001"));
        assert_eq!(shipping.address_1.as_deref(), Some("Shibuya 1-2-3"));

        let payload = parse(
            r#"{
                "id": 1, "total_price": "10",
                "shipping_address": {"postal_code": "100-0001"}
            }"#,
        );
        let shipping = payload
            .derive()
            .expect("derives")
            .0
            .shipping
            .expect("snapshot present");
        assert_eq!(shipping.postal_code.as_deref(), Some("100-0001"));
    }

    #[test]
    fn test_product_id_synthesis_priority() {
        let from_variant =
            parse(r#"{"id": 1, "total_price": "10", "line_items": [{"id": 7, "variant_id": 33}]}"#);
        assert_eq!(
            from_variant.derive().expect("derives").1[0].product_id,
            "33"
        );

        let from_sku =
            parse(r#"{"id": 1, "total_price": "10", "line_items": [{"id": 7, "sku": "RICE-5KG"}]}"#);
        assert_eq!(
            from_sku.derive().expect("derives").1[0].product_id,
            "RICE-5KG"
        );

        let from_line_id = parse(r#"{"id": 1, "total_price": "10", "line_items": [{"id": 7}]}"#);
        assert_eq!(
            from_line_id.derive().expect("derives").1[0].product_id,
            "line-7"
        );

        let bare = parse(r#"{"id": 1, "total_price": "10", "line_items": [{}]}"#);
        let product_id = &bare.derive().expect("derives").1[0].product_id;
        assert!(!product_id.is_empty());
    }

    #[test]
    fn test_zero_or_negative_quantity_is_rejected() {
        for quantity in ["0", "-3"] {
            let payload = parse(&format!(
                r#"{{"id": 1, "total_price": "10", "line_items": [{{"id": 1, "quantity": {quantity}}}]}}"#
            ));
            assert!(matches!(
                payload.derive(),
                Err(PayloadError::InvalidQuantity(_))
            ));
        }
    }

    #[test]
    fn test_missing_quantity_defaults_to_one() {
        let payload = parse(r#"{"id": 1, "total_price": "10", "line_items": [{"id": 1}]}"#);
        assert_eq!(payload.derive().expect("derives").1[0].quantity, 1);
    }

    #[test]
    fn test_fulfilled_at_picks_newest_fulfillment() {
        let payload = parse(
            r#"{
                "id": 1, "total_price": "10",
                "fulfillments": [
                    {"created_at": "2024-03-01T00:00:00Z"},
                    {"created_at": "2024-03-05T00:00:00Z"},
                    {}
                ]
            }"#,
        );

        assert_eq!(
            payload.fulfilled_at(),
            Some("2024-03-05T00:00:00Z".parse().expect("valid timestamp"))
        );

        let bare = parse(r#"{"id": 1, "total_price": "10"}"#);
        assert_eq!(bare.fulfilled_at(), None);
    }

    #[test]
    fn test_line_price_rounds_like_total() {
        let payload = parse(
            r#"{"id": 1, "total_price": "10", "line_items": [{"id": 1, "price": "49.5"}]}"#,
        );
        assert_eq!(payload.derive().expect("derives").1[0].price, 50);
    }
}
