use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PayGateError;

/// Envelope every authenticated endpoint answers with. `code == 1` is success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

impl<T> GatewayResponse<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

pub(crate) const SUCCESS_CODE: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "CNY")]
    Cny,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cny => "CNY",
            Self::Usd => "USD",
        }
    }
}

impl FromStr for Currency {
    type Err = PayGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CNY" => Ok(Self::Cny),
            "USD" => Ok(Self::Usd),
            other => Err(PayGateError::validation(format!(
                "currency must be CNY or USD, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Alipay,
    Wxpay,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alipay => "alipay",
            Self::Wxpay => "wxpay",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = PayGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alipay" => Ok(Self::Alipay),
            "wxpay" => Ok(Self::Wxpay),
            "" => Err(PayGateError::validation("paymentMethod is required")),
            other => Err(PayGateError::validation(format!(
                "paymentMethod must be alipay or wxpay, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side order lifecycle. `Paid`, `Failed` and `Cancelled` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Ready,
    Paid,
    Failed,
    Cancelled,
}

impl OrderStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Ready),
            2 => Some(Self::Paid),
            3 => Some(Self::Failed),
            4 => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::Ready => 1,
            Self::Paid => 2,
            Self::Failed => 3,
            Self::Cancelled => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
