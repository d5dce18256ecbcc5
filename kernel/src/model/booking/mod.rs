use crate::model::id::{BookingId, HouseId, ServiceId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

pub mod event;
pub mod pricing;

#[derive(Debug, Clone)]
pub struct Booking {
    pub booking_id: BookingId,
    pub booked_by: UserId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub house: BookingHouse,
    pub services: Vec<BookingService>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.booked_by == user_id
    }
}

#[derive(Debug, Clone)]
pub struct BookingHouse {
    pub house_id: HouseId,
    pub name: String,
    pub price_per_night: Decimal,
}

#[derive(Debug, Clone)]
pub struct BookingService {
    pub service_id: ServiceId,
    pub name: String,
    pub price: Decimal,
}
