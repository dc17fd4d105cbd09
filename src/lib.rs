pub mod api;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod model;
pub mod transport;

pub use client::PayGateClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use crypto::sign::sign_md5;
pub use error::{ErrorKind, PayGateError};
pub use model::common::{Currency, GatewayResponse, OrderStatus, PaymentMethod};
pub use model::order::{
    CreateOrderRequest, CreatedOrder, OrderData, OrderQuery, OrderRecord, OrderStatusResponse,
};
pub use model::params::ParamSet;
pub use model::rate::ExchangeRate;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
