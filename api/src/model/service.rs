use kernel::model::{id::ServiceId, service::Service};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub service_id: ServiceId,
    pub name: String,
    pub description: String,
    pub service_type: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl From<Service> for ServiceResponse {
    fn from(value: Service) -> Self {
        let Service {
            service_id,
            name,
            description,
            service_type,
            price,
            quantity,
            is_active: _,
        } = value;
        Self {
            service_id,
            name,
            description,
            service_type: service_type.to_string(),
            price,
            quantity,
        }
    }
}

#[derive(Serialize)]
pub struct ServicesResponse {
    pub items: Vec<ServiceResponse>,
}

impl From<Vec<Service>> for ServicesResponse {
    fn from(value: Vec<Service>) -> Self {
        Self {
            items: value.into_iter().map(ServiceResponse::from).collect(),
        }
    }
}
