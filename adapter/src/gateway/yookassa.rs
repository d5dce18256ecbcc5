use std::time::Duration;

use async_trait::async_trait;
use kernel::{
    gateway::{CreateGatewayPayment, GatewayError, GatewayPayment, PaymentGateway, PaymentMetadata},
    model::payment::PaymentStatus,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// YooKassa の決済 API（/v3/payments）クライアント
pub struct YooKassaGateway {
    client: Client,
    api_url: String,
    shop_id: String,
    secret_key: String,
}

impl YooKassaGateway {
    pub fn new(api_url: &str, shop_id: &str, secret_key: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::ExternalServiceError(e.to_string()))?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            shop_id: shop_id.to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    fn payments_url(&self) -> String {
        format!("{}/v3/payments", self.api_url)
    }
}

#[derive(Serialize)]
struct Amount {
    value: String,
    currency: String,
}

#[derive(Serialize)]
struct Confirmation {
    #[serde(rename = "type")]
    kind: &'static str,
    return_url: String,
}

#[derive(Serialize)]
struct CreatePaymentBody {
    amount: Amount,
    confirmation: Confirmation,
    capture: bool,
    description: String,
    metadata: PaymentMetadata,
}

impl From<CreateGatewayPayment> for CreatePaymentBody {
    fn from(value: CreateGatewayPayment) -> Self {
        let CreateGatewayPayment {
            amount,
            currency,
            return_url,
            capture,
            description,
            metadata,
            idempotence_key: _,
        } = value;
        Self {
            amount: Amount {
                // 金額は小数点以下2桁の文字列で送る
                value: format!("{:.2}", amount.round_dp(2)),
                currency,
            },
            confirmation: Confirmation {
                kind: "redirect",
                return_url,
            },
            capture,
            // 説明文の上限は 128 文字
            description: description.chars().take(128).collect(),
            metadata,
        }
    }
}

#[derive(Deserialize)]
struct PaymentResponse {
    id: String,
    status: String,
    #[serde(default)]
    confirmation: Option<ConfirmationResponse>,
}

#[derive(Deserialize)]
struct ConfirmationResponse {
    #[serde(default)]
    confirmation_url: Option<String>,
}

impl TryFrom<PaymentResponse> for GatewayPayment {
    type Error = GatewayError;

    fn try_from(value: PaymentResponse) -> Result<Self, Self::Error> {
        let status = value
            .status
            .parse::<PaymentStatus>()
            .map_err(|_| GatewayError::Decode(format!("unknown status: {}", value.status)))?;
        Ok(GatewayPayment {
            id: value.id,
            status,
            confirmation_url: value.confirmation.and_then(|c| c.confirmation_url),
        })
    }
}

async fn read_payment(response: reqwest::Response) -> Result<GatewayPayment, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json::<PaymentResponse>()
        .await
        .map_err(|e| GatewayError::Decode(e.to_string()))?
        .try_into()
}

#[async_trait]
impl PaymentGateway for YooKassaGateway {
    fn initial_status(&self) -> PaymentStatus {
        PaymentStatus::Pending
    }

    async fn create_payment(
        &self,
        request: CreateGatewayPayment,
    ) -> Result<GatewayPayment, GatewayError> {
        let idempotence_key = request.idempotence_key;
        let response = self
            .client
            .post(self.payments_url())
            .basic_auth(&self.shop_id, Some(&self.secret_key))
            .header("Idempotence-Key", idempotence_key.to_string())
            .json(&CreatePaymentBody::from(request))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let payment = read_payment(response).await?;
        if payment.confirmation_url.is_none() && !payment.status.is_terminal() {
            return Err(GatewayError::Decode(
                "confirmation_url is missing from the response".into(),
            ));
        }
        Ok(payment)
    }

    async fn fetch_payment(
        &self,
        gateway_payment_id: &str,
    ) -> Result<GatewayPayment, GatewayError> {
        let response = self
            .client
            .get(format!("{}/{}", self.payments_url(), gateway_payment_id))
            .basic_auth(&self.shop_id, Some(&self.secret_key))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::UnknownPayment(gateway_payment_id.into()));
        }
        read_payment(response).await
    }
}
