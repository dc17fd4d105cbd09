use crate::client::PayGateClient;
use crate::error::PayGateError;
use crate::model::common::GatewayResponse;
use crate::model::params::ParamSet;
use crate::model::rate::ExchangeRate;

const EXCHANGE_RATE_PATH: &str = "/api/config/exchange-rate";

impl PayGateClient {
    /// Current exchange rate. Public endpoint, no signature.
    ///
    /// GET /api/config/exchange-rate
    pub async fn get_exchange_rate(&self) -> Result<GatewayResponse<ExchangeRate>, PayGateError> {
        self.get_envelope(
            EXCHANGE_RATE_PATH,
            &ParamSet::new(),
            "Failed to get exchange rate",
        )
        .await
    }
}
