use std::{net::IpAddr, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use shared::{
    config::{BookingConfig, PaymentConfig},
    error::{AppError, AppResult},
};
use uuid::Uuid;

use crate::{
    gateway::{CreateGatewayPayment, PaymentGateway, PaymentMetadata},
    model::{
        booking::Booking,
        id::{BookingId, PaymentId},
        payment::{
            amount_due,
            event::{CreatePayment, UpdatePaymentStatus},
            notification::{GatewayNotification, TrustedNetworks},
            Payment, PaymentKind, PaymentStatus, PaymentSummary,
        },
    },
    repository::payment::PaymentRepository,
};

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub prepayment_percent: u32,
    pub refund_days: u32,
    pub currency: String,
    pub public_base_url: String,
    pub trusted_networks: TrustedNetworks,
    pub pending_ttl: Duration,
}

impl PaymentSettings {
    pub fn from_config(booking: &BookingConfig, payment: &PaymentConfig) -> AppResult<Self> {
        // 前払いが総額を超えると残額が負になる
        if !(1..=100).contains(&booking.prepayment_percent) {
            return Err(AppError::ConversionEntityError(format!(
                "prepayment percent must be between 1 and 100: {}",
                booking.prepayment_percent
            )));
        }
        Ok(Self {
            prepayment_percent: booking.prepayment_percent,
            refund_days: booking.refund_days,
            currency: payment.currency.clone(),
            public_base_url: payment.public_base_url.trim_end_matches('/').to_string(),
            trusted_networks: TrustedNetworks::parse(&payment.trusted_networks)?,
            pending_ttl: Duration::minutes(payment.pending_ttl_minutes),
        })
    }
}

pub fn payment_page_path(booking_id: BookingId) -> String {
    format!("/api/v1/bookings/{booking_id}/payment")
}

pub fn payment_success_path(payment_id: PaymentId) -> String {
    format!("/api/v1/payments/{payment_id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentRedirect {
    // ゲートウェイの決済ページへ遷移させる
    Gateway { payment_id: PaymentId, url: String },
    // 即時決済済みなので完了ページへ
    SuccessPage { payment_id: PaymentId, path: String },
}

impl PaymentRedirect {
    pub fn payment_id(&self) -> PaymentId {
        match self {
            Self::Gateway { payment_id, .. } | Self::SuccessPage { payment_id, .. } => *payment_id,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Self::Gateway { url, .. } => url,
            Self::SuccessPage { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    // 送信元が許可されていない。何も更新しない
    Rejected,
    Applied,
    // 受領はするが更新は行わない（未知の ID、重複通知、解析不能など）
    Ignored,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub canceled: usize,
    pub refreshed: usize,
}

pub struct PaymentService {
    repository: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settings: PaymentSettings,
}

impl PaymentService {
    pub fn new(
        repository: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            repository,
            gateway,
            settings,
        }
    }

    pub fn summary(&self, booking: &Booking) -> PaymentSummary {
        PaymentSummary::new(
            booking.total_cost,
            self.settings.prepayment_percent,
            self.settings.refund_days,
        )
    }

    pub async fn initiate(
        &self,
        booking: &Booking,
        kind: PaymentKind,
        now: DateTime<Utc>,
    ) -> AppResult<PaymentRedirect> {
        let amount = amount_due(booking.total_cost, kind, self.settings.prepayment_percent);
        if amount <= rust_decimal::Decimal::ZERO {
            return Err(AppError::UnprocessableEntity(
                "payment amount must be greater than zero".into(),
            ));
        }

        // 前回ゲートウェイ登録に失敗した行があれば、冪等キーごと再利用する
        let payment = match self
            .repository
            .find_retryable(booking.booking_id, kind)
            .await?
            .filter(|p| p.amount == amount)
        {
            Some(payment) => {
                tracing::info!(
                    payment_id = %payment.payment_id,
                    booking_id = %booking.booking_id,
                    "Retrying payment registration"
                );
                payment
            }
            None => {
                let status = self.gateway.initial_status();
                self.repository
                    .create(CreatePayment {
                        payment_id: PaymentId::new(),
                        booking_id: booking.booking_id,
                        amount,
                        kind,
                        status,
                        idempotence_key: Uuid::new_v4(),
                        created_at: now,
                        captured_at: (status == PaymentStatus::Succeeded).then_some(now),
                    })
                    .await?
            }
        };

        let request = CreateGatewayPayment {
            amount,
            currency: self.settings.currency.clone(),
            return_url: format!(
                "{}{}",
                self.settings.public_base_url,
                payment_success_path(payment.payment_id)
            ),
            capture: true,
            description: self.describe(booking, kind),
            metadata: PaymentMetadata {
                booking_id: booking.booking_id,
                payment_id: payment.payment_id,
                payment_type: kind,
            },
            idempotence_key: payment.idempotence_key,
        };

        let registered = match self.gateway.create_payment(request).await {
            Ok(registered) => registered,
            Err(e) => {
                tracing::error!(
                    error.message = %e,
                    payment_id = %payment.payment_id,
                    booking_id = %booking.booking_id,
                    "Payment creation error"
                );
                return Err(AppError::PaymentGatewayUnavailable {
                    retry_path: payment_page_path(booking.booking_id),
                    message: e.to_string(),
                });
            }
        };

        self.repository
            .attach_gateway_payment(payment.payment_id, &registered.id)
            .await?;

        tracing::info!(
            payment_id = %payment.payment_id,
            gateway_payment_id = %registered.id,
            amount = %amount,
            kind = %kind,
            "Payment registered"
        );

        // 登録時点で確定した状態はそのまま台帳に反映する
        self.transition(&payment, registered.status, now).await?;

        match (registered.confirmation_url, registered.status) {
            (Some(url), _) => Ok(PaymentRedirect::Gateway {
                payment_id: payment.payment_id,
                url,
            }),
            (None, PaymentStatus::Succeeded) => Ok(PaymentRedirect::SuccessPage {
                payment_id: payment.payment_id,
                path: payment_success_path(payment.payment_id),
            }),
            (None, status) => {
                tracing::warn!(
                    payment_id = %payment.payment_id,
                    status = %status,
                    "Payment was not accepted by the gateway"
                );
                Err(AppError::PaymentGatewayUnavailable {
                    retry_path: payment_page_path(booking.booking_id),
                    message: format!("payment is {status}"),
                })
            }
        }
    }

    // 送信元の検証は本文の解析より先に行う
    pub async fn reconcile(
        &self,
        origin: IpAddr,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> ReconcileOutcome {
        if !self.settings.trusted_networks.contains(origin) {
            tracing::warn!(%origin, "Payment notification from untrusted address");
            return ReconcileOutcome::Rejected;
        }

        let notification = match GatewayNotification::parse(body) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error.message = %e, "Malformed payment notification");
                return ReconcileOutcome::Ignored;
            }
        };

        match self.apply_notification(notification, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to reconcile payment notification"
                );
                ReconcileOutcome::Ignored
            }
        }
    }

    async fn apply_notification(
        &self,
        notification: GatewayNotification,
        now: DateTime<Utc>,
    ) -> AppResult<ReconcileOutcome> {
        let object = notification.object;
        let Ok(status) = object.status.parse::<PaymentStatus>() else {
            tracing::warn!(
                gateway_payment_id = %object.id,
                status = %object.status,
                "Unknown payment status in notification"
            );
            return Ok(ReconcileOutcome::Ignored);
        };

        let Some(payment) = self.repository.find_by_gateway_id(&object.id).await? else {
            tracing::info!(gateway_payment_id = %object.id, "Notification for unknown payment");
            return Ok(ReconcileOutcome::Ignored);
        };

        self.transition(&payment, status, now).await
    }

    async fn transition(
        &self,
        payment: &Payment,
        status: PaymentStatus,
        now: DateTime<Utc>,
    ) -> AppResult<ReconcileOutcome> {
        if !payment.status.can_transition_to(status) {
            return Ok(ReconcileOutcome::Ignored);
        }

        let updated = self
            .repository
            .update_status(UpdatePaymentStatus::new(payment.payment_id, status, now))
            .await?;
        if !updated {
            // 同時に届いた別の通知が先に反映された
            return Ok(ReconcileOutcome::Ignored);
        }

        tracing::info!(
            payment_id = %payment.payment_id,
            from = %payment.status,
            to = %status,
            "Payment status updated"
        );
        Ok(ReconcileOutcome::Applied)
    }

    pub async fn sweep_stale(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let stale = self
            .repository
            .find_stale_pending(now - self.settings.pending_ttl)
            .await?;

        let mut report = SweepReport::default();
        for payment in stale {
            match payment.gateway_payment_id.as_deref() {
                // ゲートウェイに登録されていない支払いは決済されることがない
                None => {
                    if self
                        .transition(&payment, PaymentStatus::Canceled, now)
                        .await?
                        == ReconcileOutcome::Applied
                    {
                        report.canceled += 1;
                    }
                }
                Some(gateway_payment_id) => {
                    match self.gateway.fetch_payment(gateway_payment_id).await {
                        Ok(remote) => {
                            if self.transition(&payment, remote.status, now).await?
                                == ReconcileOutcome::Applied
                            {
                                report.refreshed += 1;
                            }
                        }
                        Err(e) => tracing::warn!(
                            error.message = %e,
                            payment_id = %payment.payment_id,
                            "Could not refresh stale payment"
                        ),
                    }
                }
            }
        }
        Ok(report)
    }

    fn describe(&self, booking: &Booking, kind: PaymentKind) -> String {
        match kind {
            PaymentKind::Full => format!("Full payment for booking at {}", booking.house.name),
            PaymentKind::Prepayment => format!(
                "{}% prepayment for {}",
                self.settings.prepayment_percent, booking.house.name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gateway::{GatewayError, GatewayPayment},
        model::{
            booking::BookingHouse,
            id::{HouseId, UserId},
        },
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryPayments {
        rows: Mutex<Vec<Payment>>,
        writes: Mutex<usize>,
    }

    impl InMemoryPayments {
        fn all(&self) -> Vec<Payment> {
            self.rows.lock().unwrap().clone()
        }

        fn writes(&self) -> usize {
            *self.writes.lock().unwrap()
        }

        fn insert(&self, payment: Payment) {
            self.rows.lock().unwrap().push(payment);
        }
    }

    #[async_trait]
    impl PaymentRepository for InMemoryPayments {
        async fn create(&self, event: CreatePayment) -> AppResult<Payment> {
            let payment = Payment {
                payment_id: event.payment_id,
                booking_id: event.booking_id,
                amount: event.amount,
                kind: event.kind,
                status: event.status,
                gateway_payment_id: None,
                idempotence_key: event.idempotence_key,
                created_at: event.created_at,
                captured_at: event.captured_at,
            };
            self.insert(payment.clone());
            *self.writes.lock().unwrap() += 1;
            Ok(payment)
        }

        async fn find_by_id(&self, payment_id: PaymentId) -> AppResult<Option<Payment>> {
            Ok(self.all().into_iter().find(|p| p.payment_id == payment_id))
        }

        async fn find_by_gateway_id(&self, id: &str) -> AppResult<Option<Payment>> {
            Ok(self
                .all()
                .into_iter()
                .find(|p| p.gateway_payment_id.as_deref() == Some(id)))
        }

        async fn find_retryable(
            &self,
            booking_id: BookingId,
            kind: PaymentKind,
        ) -> AppResult<Option<Payment>> {
            Ok(self.all().into_iter().find(|p| {
                p.booking_id == booking_id
                    && p.kind == kind
                    && p.status == PaymentStatus::Pending
                    && p.gateway_payment_id.is_none()
            }))
        }

        async fn attach_gateway_payment(
            &self,
            payment_id: PaymentId,
            gateway_payment_id: &str,
        ) -> AppResult<()> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|p| p.payment_id == payment_id)
                .ok_or_else(|| AppError::EntityNotFound("payment".into()))?;
            row.gateway_payment_id = Some(gateway_payment_id.into());
            *self.writes.lock().unwrap() += 1;
            Ok(())
        }

        async fn update_status(&self, event: UpdatePaymentStatus) -> AppResult<bool> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows
                .iter_mut()
                .find(|p| p.payment_id == event.payment_id && !p.status.is_terminal())
            else {
                return Ok(false);
            };
            row.status = event.status;
            if row.captured_at.is_none() {
                row.captured_at = event.captured_at;
            }
            *self.writes.lock().unwrap() += 1;
            Ok(true)
        }

        async fn find_stale_pending(&self, before: DateTime<Utc>) -> AppResult<Vec<Payment>> {
            Ok(self
                .all()
                .into_iter()
                .filter(|p| !p.status.is_terminal() && p.created_at < before)
                .collect())
        }
    }

    // 呼び出しを記録し、あらかじめ決めた結果を返すゲートウェイ
    struct ScriptedGateway {
        initial: PaymentStatus,
        fail_first: Mutex<usize>,
        registered_status: PaymentStatus,
        confirmation_url: Option<String>,
        remote_status: PaymentStatus,
        requests: Mutex<Vec<CreateGatewayPayment>>,
        simulated: bool,
    }

    impl ScriptedGateway {
        fn live(failures: usize) -> Self {
            Self {
                initial: PaymentStatus::Pending,
                fail_first: Mutex::new(failures),
                registered_status: PaymentStatus::Pending,
                confirmation_url: Some("https://pay.example/confirm".into()),
                remote_status: PaymentStatus::Succeeded,
                requests: Mutex::new(Vec::new()),
                simulated: false,
            }
        }

        // 確認ページを返さず、登録時点で状態が確定するゲートウェイ
        fn settled(status: PaymentStatus) -> Self {
            Self {
                registered_status: status,
                confirmation_url: None,
                ..Self::live(0)
            }
        }

        fn simulated() -> Self {
            Self {
                initial: PaymentStatus::Succeeded,
                simulated: true,
                ..Self::live(0)
            }
        }

        fn requests(&self) -> Vec<CreateGatewayPayment> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for ScriptedGateway {
        fn initial_status(&self) -> PaymentStatus {
            self.initial
        }

        async fn create_payment(
            &self,
            request: CreateGatewayPayment,
        ) -> Result<GatewayPayment, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut fail = self.fail_first.lock().unwrap();
            if *fail > 0 {
                *fail -= 1;
                return Err(GatewayError::Transport("connection refused".into()));
            }
            if self.simulated {
                return Ok(GatewayPayment {
                    id: format!("test_{}", request.idempotence_key),
                    status: PaymentStatus::Succeeded,
                    confirmation_url: None,
                });
            }
            Ok(GatewayPayment {
                id: format!("gw-{}", request.metadata.payment_id),
                status: self.registered_status,
                confirmation_url: self.confirmation_url.clone(),
            })
        }

        async fn fetch_payment(&self, id: &str) -> Result<GatewayPayment, GatewayError> {
            Ok(GatewayPayment {
                id: id.into(),
                status: self.remote_status,
                confirmation_url: None,
            })
        }
    }

    fn booking(total: i64) -> Booking {
        Booking {
            booking_id: BookingId::new(),
            booked_by: UserId::new(),
            check_in: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
            guests: 2,
            total_cost: Decimal::from(total),
            created_at: Utc::now(),
            house: BookingHouse {
                house_id: HouseId::new(),
                name: "Forest Cottage".into(),
                price_per_night: Decimal::from(total / 3),
            },
            services: vec![],
        }
    }

    fn settings() -> PaymentSettings {
        PaymentSettings {
            prepayment_percent: 30,
            refund_days: 3,
            currency: "RUB".into(),
            public_base_url: "https://cottages.example".into(),
            trusted_networks: TrustedNetworks::parse(&["185.71.76.0/27"]).unwrap(),
            pending_ttl: Duration::minutes(60),
        }
    }

    fn service(gateway: Arc<ScriptedGateway>) -> (PaymentService, Arc<InMemoryPayments>) {
        let repo = Arc::new(InMemoryPayments::default());
        (PaymentService::new(repo.clone(), gateway, settings()), repo)
    }

    fn trusted() -> IpAddr {
        "185.71.76.10".parse().unwrap()
    }

    fn notification(id: &str, status: &str) -> Vec<u8> {
        format!(
            r#"{{"type":"notification","event":"payment.{status}","object":{{"id":"{id}","status":"{status}"}}}}"#
        )
        .into_bytes()
    }

    #[tokio::test]
    async fn simulated_full_payment_succeeds_without_redirecting_to_gateway() {
        let gateway = Arc::new(ScriptedGateway::simulated());
        let (svc, repo) = service(gateway.clone());
        let b = booking(15000);
        let now = Utc::now();

        let redirect = svc.initiate(&b, PaymentKind::Full, now).await.unwrap();

        let rows = repo.all();
        assert_eq!(rows.len(), 1);
        let p = &rows[0];
        assert_eq!(p.status, PaymentStatus::Succeeded);
        assert_eq!(p.captured_at, Some(now));
        assert_eq!(p.amount, Decimal::from(15000));
        assert!(p.gateway_payment_id.as_deref().unwrap().starts_with("test_"));
        assert_eq!(
            redirect,
            PaymentRedirect::SuccessPage {
                payment_id: p.payment_id,
                path: format!("/api/v1/payments/{}", p.payment_id),
            }
        );
    }

    #[tokio::test]
    async fn live_prepayment_registers_amount_and_metadata() {
        let gateway = Arc::new(ScriptedGateway::live(0));
        let (svc, repo) = service(gateway.clone());
        let b = booking(15000);

        let redirect = svc
            .initiate(&b, PaymentKind::Prepayment, Utc::now())
            .await
            .unwrap();
        assert_eq!(redirect.target(), "https://pay.example/confirm");

        let p = repo.all().remove(0);
        assert_eq!(p.status, PaymentStatus::Pending);
        assert_eq!(p.captured_at, None);
        assert_eq!(p.amount, Decimal::from(4500));
        assert_eq!(
            p.gateway_payment_id.as_deref(),
            Some(format!("gw-{}", p.payment_id).as_str())
        );

        let req = gateway.requests().remove(0);
        assert_eq!(req.amount, Decimal::from(4500));
        assert_eq!(req.currency, "RUB");
        assert!(req.capture);
        assert_eq!(req.description, "30% prepayment for Forest Cottage");
        assert_eq!(
            req.return_url,
            format!("https://cottages.example/api/v1/payments/{}", p.payment_id)
        );
        assert_eq!(
            req.metadata,
            PaymentMetadata {
                booking_id: b.booking_id,
                payment_id: p.payment_id,
                payment_type: PaymentKind::Prepayment,
            }
        );
        assert_eq!(req.idempotence_key, p.idempotence_key);
    }

    #[tokio::test]
    async fn gateway_failure_keeps_pending_row_and_retry_reuses_it() {
        let gateway = Arc::new(ScriptedGateway::live(1));
        let (svc, repo) = service(gateway.clone());
        let b = booking(15000);

        let err = svc
            .initiate(&b, PaymentKind::Full, Utc::now())
            .await
            .unwrap_err();
        match err {
            AppError::PaymentGatewayUnavailable { retry_path, .. } => {
                assert_eq!(retry_path, format!("/api/v1/bookings/{}/payment", b.booking_id))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let rows = repo.all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, PaymentStatus::Pending);
        assert!(rows[0].gateway_payment_id.is_none());

        // 再試行しても行は増えず、同じ冪等キーが送られる
        svc.initiate(&b, PaymentKind::Full, Utc::now())
            .await
            .unwrap();
        let rows = repo.all();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].gateway_payment_id.is_some());
        let requests = gateway.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].idempotence_key, requests[1].idempotence_key);
        assert_eq!(requests[0].metadata.payment_id, requests[1].metadata.payment_id);
    }

    #[tokio::test]
    async fn canceled_registration_is_not_reported_as_success() {
        let gateway = Arc::new(ScriptedGateway::settled(PaymentStatus::Canceled));
        let (svc, repo) = service(gateway.clone());
        let b = booking(15000);

        let err = svc
            .initiate(&b, PaymentKind::Full, Utc::now())
            .await
            .unwrap_err();
        match err {
            AppError::PaymentGatewayUnavailable { retry_path, .. } => {
                assert_eq!(retry_path, format!("/api/v1/bookings/{}/payment", b.booking_id))
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let p = repo.all().remove(0);
        assert_eq!(p.status, PaymentStatus::Canceled);
        assert_eq!(p.captured_at, None);
        assert!(p.gateway_payment_id.is_some());

        // 取り消された行は再利用されず、新しい支払いとして登録される
        assert!(svc.initiate(&b, PaymentKind::Full, Utc::now()).await.is_err());
        assert_eq!(repo.all().len(), 2);
    }

    #[tokio::test]
    async fn immediately_succeeded_registration_is_captured() {
        let gateway = Arc::new(ScriptedGateway::settled(PaymentStatus::Succeeded));
        let (svc, repo) = service(gateway.clone());
        let b = booking(15000);
        let now = Utc::now();

        let redirect = svc.initiate(&b, PaymentKind::Full, now).await.unwrap();

        let p = repo.all().remove(0);
        assert_eq!(p.status, PaymentStatus::Succeeded);
        assert_eq!(p.captured_at, Some(now));
        assert_eq!(
            redirect,
            PaymentRedirect::SuccessPage {
                payment_id: p.payment_id,
                path: format!("/api/v1/payments/{}", p.payment_id),
            }
        );
    }

    #[tokio::test]
    async fn different_kind_does_not_reuse_failed_row() {
        let gateway = Arc::new(ScriptedGateway::live(1));
        let (svc, repo) = service(gateway.clone());
        let b = booking(15000);

        assert!(svc.initiate(&b, PaymentKind::Full, Utc::now()).await.is_err());
        svc.initiate(&b, PaymentKind::Prepayment, Utc::now())
            .await
            .unwrap();
        assert_eq!(repo.all().len(), 2);
    }

    #[tokio::test]
    async fn zero_cost_booking_cannot_be_paid() {
        let (svc, repo) = service(Arc::new(ScriptedGateway::live(0)));
        let err = svc
            .initiate(&booking(0), PaymentKind::Full, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
        assert!(repo.all().is_empty());
    }

    #[tokio::test]
    async fn duplicate_success_callbacks_are_idempotent() {
        let (svc, repo) = service(Arc::new(ScriptedGateway::live(0)));
        let b = booking(15000);
        let redirect = svc.initiate(&b, PaymentKind::Full, Utc::now()).await.unwrap();
        let gw_id = format!("gw-{}", redirect.payment_id());
        let body = notification(&gw_id, "succeeded");

        let first = Utc::now();
        assert_eq!(
            svc.reconcile(trusted(), &body, first).await,
            ReconcileOutcome::Applied
        );
        let after_first = repo.all().remove(0);
        assert_eq!(after_first.status, PaymentStatus::Succeeded);
        assert_eq!(after_first.captured_at, Some(first));

        let second = first + Duration::minutes(5);
        assert_eq!(
            svc.reconcile(trusted(), &body, second).await,
            ReconcileOutcome::Ignored
        );
        let after_second = repo.all().remove(0);
        assert_eq!(after_second.status, PaymentStatus::Succeeded);
        assert_eq!(after_second.captured_at, Some(first));
    }

    #[tokio::test]
    async fn untrusted_origin_never_mutates() {
        let (svc, repo) = service(Arc::new(ScriptedGateway::live(0)));
        let b = booking(15000);
        let redirect = svc.initiate(&b, PaymentKind::Full, Utc::now()).await.unwrap();
        let writes = repo.writes();

        let body = notification(&format!("gw-{}", redirect.payment_id()), "succeeded");
        let outcome = svc
            .reconcile("203.0.113.9".parse().unwrap(), &body, Utc::now())
            .await;
        assert_eq!(outcome, ReconcileOutcome::Rejected);
        // 本文が壊れていても送信元で先に弾く
        let outcome = svc
            .reconcile("203.0.113.9".parse().unwrap(), b"{not json", Utc::now())
            .await;
        assert_eq!(outcome, ReconcileOutcome::Rejected);

        assert_eq!(repo.writes(), writes);
        assert_eq!(repo.all()[0].status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_gateway_id_is_acknowledged_without_writes() {
        let (svc, repo) = service(Arc::new(ScriptedGateway::live(0)));
        let outcome = svc
            .reconcile(trusted(), &notification("missing", "succeeded"), Utc::now())
            .await;
        assert_eq!(outcome, ReconcileOutcome::Ignored);
        assert_eq!(repo.writes(), 0);
    }

    #[tokio::test]
    async fn malformed_or_unknown_status_is_ignored() {
        let (svc, repo) = service(Arc::new(ScriptedGateway::live(0)));
        let b = booking(15000);
        let redirect = svc.initiate(&b, PaymentKind::Full, Utc::now()).await.unwrap();
        let writes = repo.writes();

        let gw_id = format!("gw-{}", redirect.payment_id());
        assert_eq!(
            svc.reconcile(trusted(), b"{not json", Utc::now()).await,
            ReconcileOutcome::Ignored
        );
        assert_eq!(
            svc.reconcile(trusted(), &notification(&gw_id, "refunded"), Utc::now())
                .await,
            ReconcileOutcome::Ignored
        );
        assert_eq!(repo.writes(), writes);
    }

    #[tokio::test]
    async fn cancellation_is_terminal() {
        let (svc, repo) = service(Arc::new(ScriptedGateway::live(0)));
        let b = booking(15000);
        let redirect = svc.initiate(&b, PaymentKind::Full, Utc::now()).await.unwrap();
        let gw_id = format!("gw-{}", redirect.payment_id());

        assert_eq!(
            svc.reconcile(trusted(), &notification(&gw_id, "canceled"), Utc::now())
                .await,
            ReconcileOutcome::Applied
        );
        assert_eq!(
            svc.reconcile(trusted(), &notification(&gw_id, "succeeded"), Utc::now())
                .await,
            ReconcileOutcome::Ignored
        );
        let p = repo.all().remove(0);
        assert_eq!(p.status, PaymentStatus::Canceled);
        assert_eq!(p.captured_at, None);
    }

    #[tokio::test]
    async fn sweep_cancels_unregistered_and_refreshes_registered() {
        let gateway = Arc::new(ScriptedGateway::live(0));
        let (svc, repo) = service(gateway);
        let old = Utc::now() - Duration::hours(3);
        let registered = PaymentId::new();
        let unregistered = PaymentId::new();
        let fresh = PaymentId::new();
        for (payment_id, gateway_payment_id, created_at) in [
            (registered, Some("gw-old".to_string()), old),
            (unregistered, None, old),
            (fresh, None, Utc::now()),
        ] {
            repo.insert(Payment {
                payment_id,
                booking_id: BookingId::new(),
                amount: Decimal::from(100),
                kind: PaymentKind::Full,
                status: PaymentStatus::Pending,
                gateway_payment_id,
                idempotence_key: Uuid::new_v4(),
                created_at,
                captured_at: None,
            });
        }

        let report = svc.sweep_stale(Utc::now()).await.unwrap();
        assert_eq!(
            report,
            SweepReport {
                canceled: 1,
                refreshed: 1
            }
        );

        let status_of = |id: PaymentId| {
            repo.all()
                .into_iter()
                .find(|p| p.payment_id == id)
                .unwrap()
        };
        assert_eq!(status_of(registered).status, PaymentStatus::Succeeded);
        assert!(status_of(registered).captured_at.is_some());
        assert_eq!(status_of(unregistered).status, PaymentStatus::Canceled);
        assert_eq!(status_of(fresh).status, PaymentStatus::Pending);
    }

    #[test]
    fn prepayment_percent_outside_range_is_rejected() {
        let payment = PaymentConfig {
            mode: shared::config::PaymentMode::Simulated,
            shop_id: String::new(),
            secret_key: String::new(),
            api_url: shared::config::DEFAULT_YOOKASSA_API_URL.into(),
            currency: "RUB".into(),
            public_base_url: "https://cottages.example/".into(),
            trusted_networks: vec!["185.71.76.0/27".into()],
            pending_ttl_minutes: 60,
            sweep_interval_secs: 300,
        };
        let booking = |prepayment_percent| BookingConfig {
            prepayment_percent,
            ..BookingConfig::default()
        };

        for percent in [0, 101, 150] {
            assert!(
                PaymentSettings::from_config(&booking(percent), &payment).is_err(),
                "{percent}"
            );
        }
        let settings = PaymentSettings::from_config(&booking(100), &payment).unwrap();
        assert_eq!(settings.prepayment_percent, 100);
        assert_eq!(settings.public_base_url, "https://cottages.example");
    }

    #[test]
    fn summary_uses_configured_percent() {
        let (svc, _) = service(Arc::new(ScriptedGateway::live(0)));
        let summary = svc.summary(&booking(15000));
        assert_eq!(summary.prepayment_amount, Decimal::from(4500));
        assert_eq!(summary.remaining_amount, Decimal::from(10500));
        assert_eq!(summary.refund_days, 3);
    }
}
