use crate::model::id::{HouseId, UserId};
use rust_decimal::Decimal;

pub struct CreateHouse {
    pub name: String,
    pub description: String,
    pub capacity: i32,
    pub price_per_night: Decimal,
    pub is_active: bool,
    pub amenities: String,
}

#[derive(Debug)]
pub struct UpdateHouse {
    pub house_id: HouseId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub price_per_night: Option<Decimal>,
    pub is_active: Option<bool>,
    pub amenities: Option<String>,
    pub requested_user: UserId,
}
