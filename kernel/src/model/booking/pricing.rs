use crate::model::{house::House, id::HouseId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::error::AppError;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MAX_NIGHTS: i64 = 365;
// bookings.total_cost は NUMERIC(12, 2)
const MAX_TOTAL_COST: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingRejection {
    #[error("all booking parameters are required")]
    MissingParameters,
    #[error("invalid booking data: {0} is not a valid date")]
    InvalidDate(String),
    #[error("invalid booking data: guests must be a positive integer")]
    InvalidGuests,
    #[error("invalid booking data: unknown house")]
    InvalidHouse,
    #[error("this house is not available for booking")]
    HouseUnavailable,
    #[error("check-in date cannot be in the past")]
    CheckInInPast,
    #[error("check-out date must be after check-in date")]
    CheckOutNotAfterCheckIn,
    #[error("the house accommodates at most {capacity} guests")]
    CapacityExceeded { capacity: i32 },
    #[error("a booking cannot be longer than {max_nights} nights")]
    StayTooLong { max_nights: i64 },
    #[error("the total cost of this booking is too large")]
    TotalCostTooLarge,
    #[error("the house is already booked for the selected dates")]
    DatesUnavailable,
}

impl From<BookingRejection> for AppError {
    fn from(value: BookingRejection) -> Self {
        AppError::BookingRejected(value.to_string())
    }
}

// クエリパラメータやフォームから届く生の値
#[derive(Debug, Default, Clone)]
pub struct RawBookingParams {
    pub house: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub guests: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingParams {
    pub house_id: HouseId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
}

impl TryFrom<RawBookingParams> for BookingParams {
    type Error = BookingRejection;

    fn try_from(value: RawBookingParams) -> Result<Self, Self::Error> {
        let RawBookingParams {
            house,
            check_in,
            check_out,
            guests,
        } = value;
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let (Some(house), Some(check_in), Some(check_out), Some(guests)) = (
            non_empty(house),
            non_empty(check_in),
            non_empty(check_out),
            non_empty(guests),
        ) else {
            return Err(BookingRejection::MissingParameters);
        };

        let house_id = house
            .trim()
            .parse::<HouseId>()
            .map_err(|_| BookingRejection::InvalidHouse)?;
        let guests = guests
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|g| *g > 0)
            .ok_or(BookingRejection::InvalidGuests)?;

        Ok(Self {
            house_id,
            check_in: parse_date(&check_in)?,
            check_out: parse_date(&check_out)?,
            guests,
        })
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, BookingRejection> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| BookingRejection::InvalidDate(value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingQuote {
    pub nights: i64,
    pub total_cost: Decimal,
}

// 予約可否の判定と料金計算。副作用はなく、today は呼び出し側が渡す
pub fn validate_and_price(
    house: &House,
    params: &BookingParams,
    today: NaiveDate,
) -> Result<BookingQuote, BookingRejection> {
    if !house.is_active {
        return Err(BookingRejection::HouseUnavailable);
    }
    if params.check_in < today {
        return Err(BookingRejection::CheckInInPast);
    }
    if params.check_out <= params.check_in {
        return Err(BookingRejection::CheckOutNotAfterCheckIn);
    }
    if params.guests > house.capacity {
        return Err(BookingRejection::CapacityExceeded {
            capacity: house.capacity,
        });
    }

    let nights = (params.check_out - params.check_in).num_days();
    if nights > MAX_NIGHTS {
        return Err(BookingRejection::StayTooLong {
            max_nights: MAX_NIGHTS,
        });
    }
    let total_cost = house
        .price_per_night
        .checked_mul(Decimal::from(nights))
        .filter(|total| *total <= MAX_TOTAL_COST)
        .ok_or(BookingRejection::TotalCostTooLarge)?;

    Ok(BookingQuote { nights, total_cost })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn house(price: i64, capacity: i32) -> House {
        House {
            house_id: HouseId::new(),
            name: "Lakeside".into(),
            description: String::new(),
            capacity,
            price_per_night: Decimal::from(price),
            is_active: true,
            amenities: String::new(),
        }
    }

    fn params(house: &House, check_in: &str, check_out: &str, guests: i32) -> BookingParams {
        BookingParams {
            house_id: house.house_id,
            check_in: date(check_in),
            check_out: date(check_out),
            guests,
        }
    }

    #[test]
    fn three_nights_cost_three_times_the_nightly_price() {
        let h = house(5000, 4);
        let quote = validate_and_price(
            &h,
            &params(&h, "2025-06-01", "2025-06-04", 2),
            date("2025-05-20"),
        )
        .unwrap();
        assert_eq!(quote.nights, 3);
        assert_eq!(quote.total_cost, Decimal::from(15000));
    }

    #[test]
    fn fractional_prices_are_kept_exact() {
        let mut h = house(0, 4);
        h.price_per_night = Decimal::new(333333, 2);
        let quote = validate_and_price(
            &h,
            &params(&h, "2025-06-01", "2025-06-08", 1),
            date("2025-06-01"),
        )
        .unwrap();
        assert_eq!(quote.nights, 7);
        assert_eq!(quote.total_cost, Decimal::new(2333331, 2));
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let h = house(5000, 4);
        let err = validate_and_price(
            &h,
            &params(&h, "2025-06-04", "2025-06-01", 2),
            date("2025-05-20"),
        )
        .unwrap_err();
        assert_eq!(err, BookingRejection::CheckOutNotAfterCheckIn);
        assert_eq!(err.to_string(), "check-out date must be after check-in date");
    }

    #[test]
    fn same_day_checkout_is_rejected() {
        let h = house(5000, 4);
        let err = validate_and_price(
            &h,
            &params(&h, "2025-06-04", "2025-06-04", 2),
            date("2025-05-20"),
        )
        .unwrap_err();
        assert_eq!(err, BookingRejection::CheckOutNotAfterCheckIn);
    }

    #[test]
    fn check_in_before_today_is_rejected() {
        let h = house(5000, 4);
        let err = validate_and_price(
            &h,
            &params(&h, "2025-06-01", "2025-06-04", 2),
            date("2025-06-02"),
        )
        .unwrap_err();
        assert_eq!(err, BookingRejection::CheckInInPast);
    }

    #[test]
    fn check_in_today_is_accepted() {
        let h = house(100, 4);
        let quote = validate_and_price(
            &h,
            &params(&h, "2025-06-01", "2025-06-02", 4),
            date("2025-06-01"),
        );
        assert!(quote.is_ok());
    }

    #[test]
    fn guests_above_capacity_are_rejected() {
        let h = house(5000, 4);
        let err = validate_and_price(
            &h,
            &params(&h, "2025-06-01", "2025-06-04", 5),
            date("2025-05-20"),
        )
        .unwrap_err();
        assert_eq!(err, BookingRejection::CapacityExceeded { capacity: 4 });
    }

    #[test]
    fn stays_longer_than_a_year_are_rejected() {
        let h = house(5000, 4);
        let today = date("2025-05-20");

        let quote = validate_and_price(&h, &params(&h, "2025-06-01", "2026-06-01", 2), today)
            .unwrap();
        assert_eq!(quote.nights, MAX_NIGHTS);

        let err = validate_and_price(&h, &params(&h, "2025-06-01", "9999-12-31", 2), today)
            .unwrap_err();
        assert_eq!(err, BookingRejection::StayTooLong { max_nights: 365 });
    }

    #[test]
    fn totals_beyond_the_stored_precision_are_rejected() {
        let mut h = house(0, 4);
        h.price_per_night = Decimal::new(999_999_999_999, 2);
        let today = date("2025-05-20");

        let quote = validate_and_price(&h, &params(&h, "2025-06-01", "2025-06-02", 2), today)
            .unwrap();
        assert_eq!(quote.total_cost, Decimal::new(999_999_999_999, 2));

        let err = validate_and_price(&h, &params(&h, "2025-06-01", "2025-06-03", 2), today)
            .unwrap_err();
        assert_eq!(err, BookingRejection::TotalCostTooLarge);
    }

    #[test]
    fn inactive_house_is_rejected() {
        let mut h = house(5000, 4);
        h.is_active = false;
        let err = validate_and_price(
            &h,
            &params(&h, "2025-06-01", "2025-06-04", 2),
            date("2025-05-20"),
        )
        .unwrap_err();
        assert_eq!(err, BookingRejection::HouseUnavailable);
    }

    #[test]
    fn missing_parameters_are_reported_before_parsing() {
        let raw = RawBookingParams {
            house: Some(HouseId::new().to_string()),
            check_in: Some("2025-06-01".into()),
            check_out: None,
            guests: Some("2".into()),
        };
        assert_eq!(
            BookingParams::try_from(raw),
            Err(BookingRejection::MissingParameters)
        );

        let blank = RawBookingParams {
            house: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(
            BookingParams::try_from(blank),
            Err(BookingRejection::MissingParameters)
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        let house_id = HouseId::new().to_string();
        let raw = |check_in: &str, guests: &str| RawBookingParams {
            house: Some(house_id.clone()),
            check_in: Some(check_in.into()),
            check_out: Some("2025-06-04".into()),
            guests: Some(guests.into()),
        };

        assert_eq!(
            BookingParams::try_from(raw("06/01/2025", "2")),
            Err(BookingRejection::InvalidDate("06/01/2025".into()))
        );
        assert_eq!(
            BookingParams::try_from(raw("2025-06-01", "0")),
            Err(BookingRejection::InvalidGuests)
        );
        assert_eq!(
            BookingParams::try_from(raw("2025-06-01", "two")),
            Err(BookingRejection::InvalidGuests)
        );

        let parsed = BookingParams::try_from(raw("2025-06-01", "3")).unwrap();
        assert_eq!(parsed.guests, 3);
        assert_eq!(parsed.check_in, date("2025-06-01"));
    }
}
