//! Order lifecycle status enums.
//!
//! Both enums are stored as `text` columns and follow a "monotonic only"
//! transition policy: a later webhook delivery can move an order forward
//! (pending -> paid, any -> cancelled, unfulfilled -> fulfilled) but never
//! backward. See [`OrderStatus::can_advance_to`].

use serde::{Deserialize, Serialize};

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Derive a status from Shopify's `financial_status` string.
    ///
    /// `"paid"` maps to [`Self::Paid`]; `"refunded"`, `"voided"` and
    /// `"cancelled"` map to [`Self::Cancelled`]; everything else (including
    /// absence) maps to [`Self::Pending`].
    #[must_use]
    pub fn from_financial_status(financial_status: Option<&str>) -> Self {
        match financial_status {
            Some("paid") => Self::Paid,
            Some("refunded" | "voided" | "cancelled") => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    /// Whether moving from `self` to `next` is a forward transition.
    ///
    /// Allowed: identity, pending -> paid, pending -> cancelled,
    /// paid -> cancelled. A paid or cancelled order never returns to
    /// pending, and a cancelled order stays cancelled.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, _) | (Self::Paid, Self::Paid | Self::Cancelled) | (Self::Cancelled, Self::Cancelled)
        )
    }

    /// Stable string form used in the database and API responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Fulfillment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FulfillStatus {
    #[default]
    Unfulfilled,
    Fulfilled,
}

impl FulfillStatus {
    /// Derive a status from Shopify's `fulfillment_status` string.
    ///
    /// Only `"fulfilled"` maps to [`Self::Fulfilled`]; partial states and
    /// absence map to [`Self::Unfulfilled`].
    #[must_use]
    pub fn from_fulfillment_status(fulfillment_status: Option<&str>) -> Self {
        match fulfillment_status {
            Some("fulfilled") => Self::Fulfilled,
            _ => Self::Unfulfilled,
        }
    }

    /// Whether moving from `self` to `next` is a forward transition.
    /// Fulfillment never reverts.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        !matches!((self, next), (Self::Fulfilled, Self::Unfulfilled))
    }

    /// Stable string form used in the database and API responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unfulfilled => "unfulfilled",
            Self::Fulfilled => "fulfilled",
        }
    }
}

impl std::fmt::Display for FulfillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FulfillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unfulfilled" => Ok(Self::Unfulfilled),
            "fulfilled" => Ok(Self::Fulfilled),
            _ => Err(format!("invalid fulfill status: {s}")),
        }
    }
}

// SQLx support (with postgres feature): stored as TEXT.
#[cfg(feature = "postgres")]
mod postgres {
    use super::{FulfillStatus, OrderStatus};

    macro_rules! text_enum {
        ($name:ident) => {
            impl sqlx::Type<sqlx::Postgres> for $name {
                fn type_info() -> sqlx::postgres::PgTypeInfo {
                    <String as sqlx::Type<sqlx::Postgres>>::type_info()
                }

                fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                    <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
                }
            }

            impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
                fn decode(
                    value: sqlx::postgres::PgValueRef<'r>,
                ) -> Result<Self, sqlx::error::BoxDynError> {
                    let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                    s.parse::<Self>().map_err(Into::into)
                }
            }

            impl sqlx::Encode<'_, sqlx::Postgres> for $name {
                fn encode_by_ref(
                    &self,
                    buf: &mut sqlx::postgres::PgArgumentBuffer,
                ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                    <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
                }
            }
        };
    }

    text_enum!(OrderStatus);
    text_enum!(FulfillStatus);
}
