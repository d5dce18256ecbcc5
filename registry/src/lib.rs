use std::sync::Arc;

use adapter::{
    database::ConnectionPool,
    gateway::build_gateway,
    redis::RedisClient,
    repository::{
        auth::AuthRepositoryImpl, booking::BookingRepositoryImpl,
        health::HealthCheckRepositoryImpl, house::HouseRepositoryImpl,
        payment::PaymentRepositoryImpl, review::ReviewRepositoryImpl,
        service::ServiceRepositoryImpl, user::UserRepositoryImpl,
    },
};
use anyhow::Result;
use kernel::{
    repository::{
        auth::AuthRepository, booking::BookingRepository, health::HealthCheckRepository,
        house::HouseRepository, payment::PaymentRepository, review::ReviewRepository,
        service::ServiceRepository, user::UserRepository,
    },
    service::payment::{PaymentService, PaymentSettings},
};
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    auth_repository: Arc<dyn AuthRepository>,
    user_repository: Arc<dyn UserRepository>,
    house_repository: Arc<dyn HouseRepository>,
    service_repository: Arc<dyn ServiceRepository>,
    booking_repository: Arc<dyn BookingRepository>,
    payment_repository: Arc<dyn PaymentRepository>,
    review_repository: Arc<dyn ReviewRepository>,
    payment_service: Arc<PaymentService>,
}

impl AppRegistry {
    pub fn new(
        pool: ConnectionPool,
        redis_client: Arc<RedisClient>,
        app_config: AppConfig,
    ) -> Result<Self> {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let auth_repository = Arc::new(AuthRepositoryImpl::new(
            pool.clone(),
            redis_client.clone(),
            app_config.auth.ttl,
        ));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        let house_repository = Arc::new(HouseRepositoryImpl::new(pool.clone()));
        let service_repository = Arc::new(ServiceRepositoryImpl::new(pool.clone()));
        let booking_repository = Arc::new(BookingRepositoryImpl::new(
            pool.clone(),
            app_config.booking.reject_overlapping,
        ));
        let payment_repository: Arc<dyn PaymentRepository> =
            Arc::new(PaymentRepositoryImpl::new(pool.clone()));
        let review_repository = Arc::new(ReviewRepositoryImpl::new(pool.clone()));

        let gateway = build_gateway(&app_config.payment)?;
        let settings = PaymentSettings::from_config(&app_config.booking, &app_config.payment)?;
        let payment_service = Arc::new(PaymentService::new(
            payment_repository.clone(),
            gateway,
            settings,
        ));

        Ok(Self {
            health_check_repository,
            auth_repository,
            user_repository,
            house_repository,
            service_repository,
            booking_repository,
            payment_repository,
            review_repository,
            payment_service,
        })
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn auth_repository(&self) -> Arc<dyn AuthRepository> {
        self.auth_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn house_repository(&self) -> Arc<dyn HouseRepository> {
        self.house_repository.clone()
    }

    pub fn service_repository(&self) -> Arc<dyn ServiceRepository> {
        self.service_repository.clone()
    }

    pub fn booking_repository(&self) -> Arc<dyn BookingRepository> {
        self.booking_repository.clone()
    }

    pub fn payment_repository(&self) -> Arc<dyn PaymentRepository> {
        self.payment_repository.clone()
    }

    pub fn review_repository(&self) -> Arc<dyn ReviewRepository> {
        self.review_repository.clone()
    }

    pub fn payment_service(&self) -> Arc<PaymentService> {
        self.payment_service.clone()
    }
}
