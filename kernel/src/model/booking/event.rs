use crate::model::id::{HouseId, ServiceId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use derive_new::new;
use rust_decimal::Decimal;

#[derive(new)]
pub struct CreateBooking {
    pub house_id: HouseId,
    pub booked_by: UserId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub total_cost: Decimal,
    pub service_ids: Vec<ServiceId>,
    pub booked_at: DateTime<Utc>,
}
