use chrono::{DateTime, NaiveDate, Utc};
use kernel::{
    model::{
        booking::{pricing::RawBookingParams, Booking, BookingHouse, BookingService},
        house::House,
        id::{BookingId, HouseId, ServiceId},
        service::Service,
    },
    service::payment::payment_page_path,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::service::ServiceResponse;

// フォームから文字列で届く場合と JSON の数値で届く場合がある
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(i64),
    Text(String),
}

impl From<RawField> for String {
    fn from(value: RawField) -> Self {
        match value {
            RawField::Number(n) => n.to_string(),
            RawField::Text(s) => s,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuoteQuery {
    pub house: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub guests: Option<String>,
}

impl From<BookingQuoteQuery> for RawBookingParams {
    fn from(value: BookingQuoteQuery) -> Self {
        let BookingQuoteQuery {
            house,
            check_in,
            check_out,
            guests,
        } = value;
        Self {
            house,
            check_in,
            check_out,
            guests,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub house: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub guests: Option<RawField>,
    #[serde(default)]
    pub services: Vec<ServiceId>,
}

impl CreateBookingRequest {
    pub fn into_parts(self) -> (RawBookingParams, Vec<ServiceId>) {
        let CreateBookingRequest {
            house,
            check_in,
            check_out,
            guests,
            services,
        } = self;
        (
            RawBookingParams {
                house,
                check_in,
                check_out,
                guests: guests.map(String::from),
            },
            services,
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuoteResponse {
    pub house_id: HouseId,
    pub house_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub nights: i64,
    pub price_per_night: Decimal,
    pub total_cost: Decimal,
    pub services: Vec<ServiceResponse>,
    pub recommended_services: Vec<ServiceResponse>,
}

pub struct QuoteParts {
    pub house: House,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub nights: i64,
    pub total_cost: Decimal,
    pub services: Vec<Service>,
    pub recommended: Vec<Service>,
}

impl From<QuoteParts> for BookingQuoteResponse {
    fn from(value: QuoteParts) -> Self {
        let QuoteParts {
            house,
            check_in,
            check_out,
            guests,
            nights,
            total_cost,
            services,
            recommended,
        } = value;
        Self {
            house_id: house.house_id,
            house_name: house.name,
            check_in,
            check_out,
            guests,
            nights,
            price_per_night: house.price_per_night,
            total_cost,
            services: services.into_iter().map(ServiceResponse::from).collect(),
            recommended_services: recommended.into_iter().map(ServiceResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub booking_id: BookingId,
    // 次の画面（支払い方法の選択）
    pub payment_path: String,
}

impl From<BookingId> for CreateBookingResponse {
    fn from(booking_id: BookingId) -> Self {
        Self {
            booking_id,
            payment_path: payment_page_path(booking_id),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: BookingId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub guests: i32,
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub house: BookingHouseResponse,
    pub services: Vec<BookingServiceResponse>,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let nights = value.nights();
        let Booking {
            booking_id,
            booked_by: _,
            check_in,
            check_out,
            guests,
            total_cost,
            created_at,
            house,
            services,
        } = value;
        Self {
            booking_id,
            check_in,
            check_out,
            nights,
            guests,
            total_cost,
            created_at,
            house: house.into(),
            services: services
                .into_iter()
                .map(BookingServiceResponse::from)
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingHouseResponse {
    pub house_id: HouseId,
    pub name: String,
    pub price_per_night: Decimal,
}

impl From<BookingHouse> for BookingHouseResponse {
    fn from(value: BookingHouse) -> Self {
        let BookingHouse {
            house_id,
            name,
            price_per_night,
        } = value;
        Self {
            house_id,
            name,
            price_per_night,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingServiceResponse {
    pub service_id: ServiceId,
    pub name: String,
    pub price: Decimal,
}

impl From<BookingService> for BookingServiceResponse {
    fn from(value: BookingService) -> Self {
        let BookingService {
            service_id,
            name,
            price,
        } = value;
        Self {
            service_id,
            name,
            price,
        }
    }
}

#[derive(Serialize)]
pub struct BookingsResponse {
    pub items: Vec<BookingResponse>,
}

impl From<Vec<Booking>> for BookingsResponse {
    fn from(value: Vec<Booking>) -> Self {
        Self {
            items: value.into_iter().map(BookingResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::booking::pricing::{BookingParams, BookingRejection};

    #[test]
    fn guests_may_arrive_as_number_or_text() {
        let req: CreateBookingRequest = serde_json::from_str(
            r#"{"house":"8d2e3a4f-1b5c-4e6d-9f7a-0b1c2d3e4f50","checkIn":"2099-06-01","checkOut":"2099-06-04","guests":2}"#,
        )
        .unwrap();
        let (raw, services) = req.into_parts();
        assert!(services.is_empty());
        let params = BookingParams::try_from(raw).unwrap();
        assert_eq!(params.guests, 2);

        let req: CreateBookingRequest =
            serde_json::from_str(r#"{"house":"x","checkIn":"2099-06-01","checkOut":"2099-06-04","guests":"two"}"#)
                .unwrap();
        let (raw, _) = req.into_parts();
        assert_eq!(
            BookingParams::try_from(raw).unwrap_err(),
            BookingRejection::InvalidHouse
        );
    }

    #[test]
    fn missing_fields_are_a_single_rejection() {
        let req: CreateBookingRequest = serde_json::from_str(r#"{"checkIn":"2099-06-01"}"#).unwrap();
        let (raw, _) = req.into_parts();
        assert_eq!(
            BookingParams::try_from(raw).unwrap_err(),
            BookingRejection::MissingParameters
        );
    }

    #[test]
    fn created_booking_points_to_payment_step() {
        let booking_id = BookingId::new();
        let res = CreateBookingResponse::from(booking_id);
        assert_eq!(res.payment_path, format!("/api/v1/bookings/{booking_id}/payment"));
    }
}
