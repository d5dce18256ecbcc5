use crate::model::id::ServiceId;
use rust_decimal::Decimal;
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ServiceType {
    Entertainment,
    Relax,
    Food,
    Transfer,
    Other,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub service_id: ServiceId,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub price: Decimal,
    pub quantity: i32,
    pub is_active: bool,
}
