use derive_new::new;
use garde::Validate;
use kernel::model::{
    house::{
        event::{CreateHouse, UpdateHouse},
        House, HouseListOptions,
    },
    id::{HouseId, UserId},
    review::RatingStats,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{list::PaginatedResponse, review::RatingStatsResponse};

fn non_negative(value: &Decimal, _: &()) -> garde::Result {
    if value.is_sign_negative() {
        return Err(garde::Error::new("must not be negative"));
    }
    Ok(())
}

fn non_negative_opt(value: &Option<Decimal>, ctx: &()) -> garde::Result {
    value.as_ref().map_or(Ok(()), |v| non_negative(v, ctx))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HouseListQuery {
    #[garde(range(min = 1))]
    pub guests: Option<i32>,
    #[garde(length(max = 255))]
    pub name: Option<String>,
    #[garde(custom(non_negative_opt))]
    pub min_price: Option<Decimal>,
    #[garde(custom(non_negative_opt))]
    pub max_price: Option<Decimal>,
    #[garde(range(min = 1, max = 100))]
    #[serde(default = "super::list::default_limit")]
    pub limit: i64,
    #[garde(range(min = 0))]
    #[serde(default)]
    pub offset: i64,
}

impl From<HouseListQuery> for HouseListOptions {
    fn from(value: HouseListQuery) -> Self {
        let HouseListQuery {
            guests,
            name,
            min_price,
            max_price,
            limit,
            offset,
        } = value;
        // 一般向けの一覧には稼働中の物件だけを出す
        Self {
            guests,
            name,
            min_price,
            max_price,
            only_active: true,
            limit,
            offset,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateHouseRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(skip)]
    #[serde(default)]
    pub description: String,
    #[garde(range(min = 1))]
    pub capacity: i32,
    #[garde(custom(non_negative))]
    pub price_per_night: Decimal,
    #[garde(skip)]
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[garde(skip)]
    #[serde(default)]
    pub amenities: Vec<String>,
}

const fn default_active() -> bool {
    true
}

fn join_amenities(amenities: Vec<String>) -> String {
    amenities
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<CreateHouseRequest> for CreateHouse {
    fn from(value: CreateHouseRequest) -> Self {
        let CreateHouseRequest {
            name,
            description,
            capacity,
            price_per_night,
            is_active,
            amenities,
        } = value;
        Self {
            name,
            description,
            capacity,
            price_per_night,
            is_active,
            amenities: join_amenities(amenities),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHouseRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(range(min = 1))]
    pub capacity: Option<i32>,
    #[garde(custom(non_negative_opt))]
    pub price_per_night: Option<Decimal>,
    #[garde(skip)]
    pub is_active: Option<bool>,
    #[garde(skip)]
    pub amenities: Option<Vec<String>>,
}

#[derive(new)]
pub struct UpdateHouseRequestWithIds(HouseId, UserId, UpdateHouseRequest);

impl From<UpdateHouseRequestWithIds> for UpdateHouse {
    fn from(value: UpdateHouseRequestWithIds) -> Self {
        let UpdateHouseRequestWithIds(house_id, requested_user, req) = value;
        let UpdateHouseRequest {
            name,
            description,
            capacity,
            price_per_night,
            is_active,
            amenities,
        } = req;
        Self {
            house_id,
            name,
            description,
            capacity,
            price_per_night,
            is_active,
            amenities: amenities.map(join_amenities),
            requested_user,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseResponse {
    pub house_id: HouseId,
    pub name: String,
    pub description: String,
    pub capacity: i32,
    pub price_per_night: Decimal,
    pub is_active: bool,
    pub amenities: Vec<String>,
}

impl From<House> for HouseResponse {
    fn from(value: House) -> Self {
        let amenities = value.amenities_list().into_iter().map(String::from).collect();
        let House {
            house_id,
            name,
            description,
            capacity,
            price_per_night,
            is_active,
            amenities: _,
        } = value;
        Self {
            house_id,
            name,
            description,
            capacity,
            price_per_night,
            is_active,
            amenities,
        }
    }
}

pub type PaginatedHouseResponse = PaginatedResponse<HouseResponse>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseDetailResponse {
    #[serde(flatten)]
    pub house: HouseResponse,
    pub rating: RatingStatsResponse,
    pub similar_houses: Vec<HouseResponse>,
}

impl HouseDetailResponse {
    pub fn new(house: House, rating: RatingStats, similar: Vec<House>) -> Self {
        Self {
            house: house.into(),
            rating: rating.into(),
            similar_houses: similar.into_iter().map(HouseResponse::from).collect(),
        }
    }
}
