use tracing::debug;

use crate::client::{PayGateClient, encode_path_segment};
use crate::crypto::sign::SIGN_TYPE_MD5;
use crate::error::PayGateError;
use crate::model::common::{Currency, GatewayResponse, PaymentMethod};
use crate::model::order::{
    CreateOrderRequest, CreatedOrder, OrderData, OrderQuery, OrderStatusResponse,
};
use crate::model::params::{ParamSet, amount_value};

const CREATE_ORDER_PATH: &str = "/api/createorder";
const ORDER_PATH: &str = "/api/order";
const ORDER_STATUS_PATH: &str = "/api/order/status";

impl PayGateClient {
    /// Create a payment order.
    ///
    /// POST /api/createorder
    ///
    /// Input is validated before anything is sent; a rejected amount, currency
    /// or payment method never reaches the network.
    pub async fn create_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<GatewayResponse<CreatedOrder>, PayGateError> {
        let params = self.build_create_order_params(req)?;
        debug!(action = "createorder", "creating order");
        self.post_envelope(CREATE_ORDER_PATH, &params, "Failed to create order")
            .await
    }

    /// Query one order (when `order_id` is set) or a page of orders.
    ///
    /// GET /api/order?action=order|orders&...
    pub async fn query_order(
        &self,
        query: &OrderQuery,
    ) -> Result<GatewayResponse<OrderData>, PayGateError> {
        let params = self.build_query_params(query);
        debug!(action = ?params.get("action"), "querying orders");
        self.get_envelope(ORDER_PATH, &params, "Failed to query order")
            .await
    }

    /// Public status lookup, no signature. The body is returned as-is; there
    /// is no `code` envelope on this endpoint.
    ///
    /// GET /api/order/status/{order_id}
    pub async fn check_order_status(
        &self,
        order_id: &str,
    ) -> Result<OrderStatusResponse, PayGateError> {
        if order_id.trim().is_empty() {
            return Err(PayGateError::validation("orderId is required"));
        }
        let path = format!("{ORDER_STATUS_PATH}/{}", encode_path_segment(order_id));
        self.get_raw(&path, "Failed to check order status").await
    }

    pub(crate) fn build_create_order_params(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<ParamSet, PayGateError> {
        if !req.amount.is_finite() || req.amount <= 0.0 {
            return Err(PayGateError::validation(format!(
                "amount must be a positive number, got {}",
                req.amount
            )));
        }
        let currency: Currency = req.currency.parse()?;
        let payment_method: PaymentMethod = req.payment_method.parse()?;

        let mut params = ParamSet::new();
        params
            .insert("appid", self.config.app_id.as_str())
            .insert("clientip", self.config.client_ip.as_str())
            .insert("action", "createorder")
            .insert("amount", amount_value(req.amount))
            .insert("currency", currency.as_str())
            .insert("paymentMethod", payment_method.as_str())
            .insert("description", req.description.as_deref().unwrap_or_default())
            .insert("sign_type", SIGN_TYPE_MD5)
            .insert_non_empty("clientOrderId", req.client_order_id.as_deref())
            .insert_non_empty("customerName", req.customer_name.as_deref())
            .insert_non_empty("customerEmail", req.customer_email.as_deref())
            .insert_non_empty("customerPhone", req.customer_phone.as_deref());

        self.sign(&mut params);
        Ok(params)
    }

    pub(crate) fn build_query_params(&self, query: &OrderQuery) -> ParamSet {
        let order_id = query.order_id.as_deref().filter(|id| !id.is_empty());
        let action = if order_id.is_some() { "order" } else { "orders" };

        let mut params = ParamSet::new();
        params
            .insert("appid", self.config.app_id.as_str())
            .insert("apikey", self.config.api_key.as_str())
            .insert("action", action)
            .insert("limit", query.effective_limit())
            .insert("page", query.page)
            .insert_non_empty("orderId", order_id);

        self.sign(&mut params);
        params.insert("sign_type", SIGN_TYPE_MD5);
        params
    }
}
