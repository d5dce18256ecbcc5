use kernel::model::{
    id::ServiceId,
    service::{Service, ServiceType},
};
use rust_decimal::Decimal;
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct ServiceRow {
    pub service_id: ServiceId,
    pub name: String,
    pub description: String,
    pub service_type: String,
    pub price: Decimal,
    pub quantity: i32,
    pub is_active: bool,
}

impl TryFrom<ServiceRow> for Service {
    type Error = AppError;

    fn try_from(value: ServiceRow) -> Result<Self, Self::Error> {
        let ServiceRow {
            service_id,
            name,
            description,
            service_type,
            price,
            quantity,
            is_active,
        } = value;
        let service_type = service_type.parse::<ServiceType>().map_err(|_| {
            AppError::ConversionEntityError(format!("unknown service type: {service_type}"))
        })?;
        Ok(Service {
            service_id,
            name,
            description,
            service_type,
            price,
            quantity,
            is_active,
        })
    }
}
