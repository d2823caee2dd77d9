//! A client for the gateway's REST API.
//!
//! [`TBankClient`] signs each request with the terminal's credentials, posts
//! it as JSON to `{base}/{Method}` and decodes the answer through
//! [`GatewayResponse`], so a `Success: false` answer surfaces as
//! [`ClientError::Rejected`].
//!
//! ## Features
//!
//! - Uses `reqwest` for async HTTP requests
//! - Validates requests locally before sending them
//! - Integrates with `tracing` if the `telemetry` feature is enabled

use std::fmt::Display;
use std::time::Duration;

use http::StatusCode;
use reqwest::Client;
use tkassa::proto::{
    Cancel, Cancellation, Confirm, Confirmation, GetState, Init, Payment, PaymentState,
};
use tkassa::token::sign_request;
use tkassa::{Credentials, Environment, GatewayResponse, TokenRequest};
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::constants::{DEFAULT_TIMEOUT, USER_AGENT};
use crate::error::ClientError;

/// Settings for a [`TBankClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    credentials: Credentials,
    environment: Environment,
    base_url: Option<String>,
    timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl ClientConfig {
    /// Creates a production configuration for the given terminal.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            environment: Environment::default(),
            base_url: None,
            timeout: None,
            http_client: None,
        }
    }

    /// Selects the gateway environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Overrides the base URL chosen by the environment.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets a timeout for every request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses a preconfigured `reqwest` client.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Returns the base URL requests will be sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }
}

/// A client for the T-Bank acquiring gateway.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct TBankClient {
    /// Base URL with a trailing slash (e.g. `https://securepay.tinkoff.ru/v2/`)
    base_url: Url,
    /// Terminal credentials used to sign requests
    credentials: Credentials,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Request timeout
    timeout: Duration,
}

impl TBankClient {
    /// Builds a client from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the base URL does not parse or the HTTP
    /// client cannot be built.
    pub fn try_new(config: ClientConfig) -> Result<Self, ClientError> {
        // Normalize: strip trailing slashes and add a single trailing slash
        let mut normalized = config.base_url().trim_end_matches('/').to_owned();
        normalized.push('/');
        let base_url = Url::parse(&normalized).map_err(|e| ClientError::UrlParse {
            context: "Failed to parse base url",
            source: e,
        })?;

        let client = match config.http_client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .map_err(ClientError::Builder)?,
        };

        Ok(Self {
            base_url,
            credentials: config.credentials,
            client,
            timeout: config.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }

    /// Returns the base URL used by this client.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the terminal key requests are signed for.
    #[must_use]
    pub fn terminal_key(&self) -> &str {
        self.credentials.terminal_key()
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates a payment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request is invalid, the call fails or
    /// the gateway rejects it.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "tkassa.client.init",
            skip_all,
            fields(
                order_id = %request.order_id,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn init(&self, request: &Init) -> Result<Payment, ClientError> {
        self.execute(request).await
    }

    /// Fetches the status of a payment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the call fails or the gateway rejects it.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "tkassa.client.get_state",
            skip_all,
            fields(
                payment_id = %request.payment_id,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn get_state(&self, request: &GetState) -> Result<PaymentState, ClientError> {
        self.execute(request).await
    }

    /// Confirms a two-stage payment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request is invalid, the call fails or
    /// the gateway rejects it.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "tkassa.client.confirm",
            skip_all,
            fields(
                payment_id = %request.payment_id,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn confirm(&self, request: &Confirm) -> Result<Confirmation, ClientError> {
        self.execute(request).await
    }

    /// Cancels or refunds a payment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request is invalid, the call fails or
    /// the gateway rejects it.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "tkassa.client.cancel",
            skip_all,
            fields(
                payment_id = %request.payment_id,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn cancel(&self, request: &Cancel) -> Result<Cancellation, ClientError> {
        self.execute(request).await
    }

    /// Validates, signs and sends any gateway request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without sending anything if the
    /// request is invalid, [`ClientError::Rejected`] for `Success: false`,
    /// and a transport variant for everything else.
    pub async fn execute<R>(&self, request: &R) -> Result<R::Response, ClientError>
    where
        R: TokenRequest + Sync,
    {
        let result = self.send(request).await;
        record_result_on_span(&result);
        result
    }

    async fn send<R>(&self, request: &R) -> Result<R::Response, ClientError>
    where
        R: TokenRequest + Sync,
    {
        let context = R::METHOD;
        request.validate()?;
        let body = sign_request(request, &self.credentials)?;
        let url = self
            .base_url
            .join(context)
            .map_err(|e| ClientError::UrlParse { context, source: e })?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(method = context, url = %url, "sending gateway request");

        let response: GatewayResponse<R::Response> = self.post_json(url, context, &body).await?;
        response.into_result().map_err(ClientError::Rejected)
    }

    /// POST helper that handles JSON serialization, error mapping and
    /// timeout application.
    ///
    /// `context` is the gateway method, used in error messages.
    async fn post_json<T, R>(
        &self,
        url: Url,
        context: &'static str,
        payload: &T,
    ) -> Result<GatewayResponse<R>, ClientError>
    where
        T: serde::Serialize + Sync + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let http_response = self
            .client
            .post(url)
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::Http { context, source: e })?;

        let status = http_response.status();
        if status != StatusCode::OK {
            let body = http_response
                .text()
                .await
                .map_err(|e| ClientError::ResponseBodyRead { context, source: e })?;
            return Err(ClientError::HttpStatus {
                context,
                status,
                body,
            });
        }

        let bytes = http_response
            .bytes()
            .await
            .map_err(|e| ClientError::ResponseBodyRead { context, source: e })?;
        GatewayResponse::from_slice(&bytes)
            .map_err(|e| ClientError::JsonDeserialization { context, source: e })
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to gateway failed");
        }
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tkassa::{Amount, Decimal};
    use tkassa::proto::PaymentStatus;
    use serde_json::json;
    use tkassa::receipt::{
        ItemFfd12, MeasurementUnit, PaymentMethod, PaymentObject, ReceiptFfd12, Tax, Taxation,
    };
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GIFT_CARD_TOKEN: &str =
        "44a2c8230d1154e7e67c36eceb381690a6c5ee4e969353d79e319fceca64285f";

    fn client_for(server: &MockServer) -> TBankClient {
        let config = ClientConfig::new(Credentials::new("TinkoffBankTest", "usaf8fw8fsw21g"))
            .with_base_url(server.uri());
        TBankClient::try_new(config).unwrap()
    }

    fn gift_card() -> Init {
        Init::new(Amount::from_kopecks(19_200), "21090")
            .with_description("Подарочная карта на 1000 рублей")
    }

    #[test]
    fn test_base_url_from_environment() {
        let credentials = Credentials::new("k", "p");
        let prod = TBankClient::try_new(ClientConfig::new(credentials.clone())).unwrap();
        assert_eq!(prod.base_url().as_str(), "https://securepay.tinkoff.ru/v2/");

        let test = TBankClient::try_new(
            ClientConfig::new(credentials).with_environment(Environment::Test),
        )
        .unwrap();
        assert_eq!(test.base_url().as_str(), "https://rest-api-test.tinkoff.ru/v2/");
        assert_eq!(test.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig::new(Credentials::new("k", "p")).with_base_url("not a url");
        assert!(matches!(
            TBankClient::try_new(config),
            Err(ClientError::UrlParse { .. })
        ));
    }

    #[tokio::test]
    async fn test_init_sends_signed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Init"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({
                "TerminalKey": "TinkoffBankTest",
                "Amount": 19200,
                "OrderId": "21090",
                "Token": GIFT_CARD_TOKEN
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Success": true,
                "ErrorCode": "0",
                "TerminalKey": "TinkoffBankTest",
                "Status": "NEW",
                "PaymentId": "13660",
                "OrderId": "21090",
                "Amount": 19200,
                "PaymentURL": "https://securepay.tinkoff.ru/new/fU1ppgqa"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let payment = client_for(&server).init(&gift_card()).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::New);
        assert_eq!(payment.payment_id.as_str(), "13660");
        assert!(payment.payment_url.is_some());
    }

    #[tokio::test]
    async fn test_init_with_ffd12_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Init"))
            .and(body_partial_json(json!({
                "Token": GIFT_CARD_TOKEN,
                "Receipt": { "FfdVersion": "1.2", "Taxation": "osn" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Success": true,
                "ErrorCode": "0",
                "TerminalKey": "TinkoffBankTest",
                "Status": "NEW",
                "PaymentId": 13661,
                "OrderId": "21090",
                "Amount": 19200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let item = ItemFfd12::new(
            "Подарочная карта",
            Amount::from_kopecks(19_200),
            Decimal::ONE,
            Amount::from_kopecks(19_200),
            Tax::Vat20,
            PaymentMethod::FullPayment,
            PaymentObject::Service,
            MeasurementUnit::Piece,
        );
        let receipt = ReceiptFfd12::new(vec![item], Taxation::Osn).with_email("buyer@example.com");
        let payment = client_for(&server)
            .init(&gift_card().with_receipt(receipt))
            .await
            .unwrap();
        assert_eq!(payment.payment_id.as_str(), "13661");
    }

    #[tokio::test]
    async fn test_rejected_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Init"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Success": false,
                "ErrorCode": "204",
                "Message": "Неверный токен. Проверьте пару TerminalKey/SecretKey.",
                "Details": "Указан неверный токен."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).init(&gift_card()).await.unwrap_err();
        let failure = err.as_rejection().unwrap();
        assert_eq!(failure.error_code, "204");
        assert!(err.to_string().contains("204"));
    }

    #[tokio::test]
    async fn test_invalid_request_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .init(&Init::new(Amount::from_kopecks(100), ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(e) if e.field == "OrderId"));
    }

    #[tokio::test]
    async fn test_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/GetState"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_state(&GetState::new("13660"))
            .await
            .unwrap_err();
        match err {
            ClientError::HttpStatus {
                context,
                status,
                body,
            } => {
                assert_eq!(context, "GetState");
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/GetState"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_state(&GetState::new("13660"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::JsonDeserialization { context: "GetState", .. }
        ));
    }

    #[tokio::test]
    async fn test_get_state_under_base_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/GetState"))
            .and(body_partial_json(json!({ "PaymentId": "13660" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Success": true,
                "ErrorCode": "0",
                "TerminalKey": "TinkoffBankTest",
                "Status": "AUTHORIZED",
                "PaymentId": "13660",
                "OrderId": "21090",
                "Amount": 19200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ClientConfig::new(Credentials::new("TinkoffBankTest", "secret"))
            .with_base_url(format!("{}/v2/", server.uri()));
        let state = TBankClient::try_new(config)
            .unwrap()
            .get_state(&GetState::new(13_660_u64))
            .await
            .unwrap();
        assert_eq!(state.status, PaymentStatus::Authorized);
    }

    #[tokio::test]
    async fn test_confirm_and_cancel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Confirm"))
            .and(body_partial_json(json!({ "PaymentId": "13660", "Amount": 10000 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Success": true,
                "ErrorCode": "0",
                "TerminalKey": "TinkoffBankTest",
                "Status": "CONFIRMED",
                "PaymentId": "13660",
                "OrderId": "21090"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/Cancel"))
            .and(body_partial_json(json!({ "PaymentId": "13660" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Success": true,
                "ErrorCode": "0",
                "TerminalKey": "TinkoffBankTest",
                "Status": "PARTIAL_REFUNDED",
                "PaymentId": "13660",
                "OrderId": "21090",
                "OriginalAmount": 10000,
                "NewAmount": 4000
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let confirmation = client
            .confirm(&Confirm::new("13660").with_amount(Amount::from_kopecks(10_000)))
            .await
            .unwrap();
        assert_eq!(confirmation.status, PaymentStatus::Confirmed);

        let cancellation = client
            .cancel(&Cancel::new("13660").with_amount(Amount::from_kopecks(6_000)))
            .await
            .unwrap();
        assert_eq!(cancellation.new_amount, Amount::from_kopecks(4_000));
    }
}
