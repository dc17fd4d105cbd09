use serde::{Deserialize, Serialize};

use super::common::{Currency, OrderStatus, PaymentMethod};

pub const DEFAULT_QUERY_LIMIT: u32 = 10;
pub const MAX_QUERY_LIMIT: u32 = 50;

// ---- Create ----

/// Input for `create_order`. Currency and payment method are kept as the
/// caller's raw strings and validated when the order is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
}

impl CreateOrderRequest {
    pub fn new(amount: f64, currency: Currency, payment_method: PaymentMethod) -> Self {
        Self {
            amount,
            currency: currency.as_str().to_string(),
            payment_method: payment_method.as_str().to_string(),
            description: None,
            client_order_id: None,
            customer_name: None,
            customer_email: None,
            customer_phone: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }

    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn customer_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn customer_phone(mut self, phone: impl Into<String>) -> Self {
        self.customer_phone = Some(phone.into());
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order_id: String,
    #[serde(default)]
    pub qr_image_url: Option<String>,
    #[serde(default)]
    pub order_amount: Option<serde_json::Value>,
    #[serde(default)]
    pub order_currency: Option<String>,
    #[serde(default)]
    pub order_payment_method: Option<String>,
    #[serde(default)]
    pub order_description: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub status_string: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ---- Query ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    pub order_id: Option<String>,
    pub limit: u32,
    pub page: u32,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            order_id: None,
            limit: DEFAULT_QUERY_LIMIT,
            page: 1,
        }
    }
}

impl OrderQuery {
    /// Look up a single order.
    pub fn by_id(order_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            ..Self::default()
        }
    }

    /// List the caller's orders, one page at a time.
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            order_id: None,
            limit,
            page,
        }
    }

    /// Limit actually sent on the wire.
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_QUERY_LIMIT)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_id: String,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default, rename = "status_str")]
    pub status_str: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_time: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl OrderRecord {
    pub fn order_status(&self) -> Option<OrderStatus> {
        self.status.and_then(OrderStatus::from_code)
    }
}

/// `data` of an order query: one record for `action=order`, a page for `action=orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderData {
    Single(Box<OrderRecord>),
    List(Vec<OrderRecord>),
}

impl OrderData {
    pub fn into_vec(self) -> Vec<OrderRecord> {
        match self {
            Self::Single(record) => vec![*record],
            Self::List(records) => records,
        }
    }
}

// ---- Public status ----

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResponse {
    pub status: String,
    pub status_code: i64,
    pub order_id: String,
}

impl OrderStatusResponse {
    pub fn order_status(&self) -> Option<OrderStatus> {
        OrderStatus::from_code(self.status_code)
    }
}
