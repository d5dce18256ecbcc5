use crate::model::id::HouseId;
use rust_decimal::Decimal;

pub mod event;

#[derive(Debug, Clone)]
pub struct House {
    pub house_id: HouseId,
    pub name: String,
    pub description: String,
    pub capacity: i32,
    pub price_per_night: Decimal,
    pub is_active: bool,
    pub amenities: String,
}

impl House {
    // amenities は改行区切りで保存されている
    pub fn amenities_list(&self) -> Vec<&str> {
        self.amenities
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }

    // 類似物件として扱う一泊料金の範囲（±20%）
    pub fn similar_price_range(&self) -> (Decimal, Decimal) {
        (
            self.price_per_night * Decimal::new(8, 1),
            self.price_per_night * Decimal::new(12, 1),
        )
    }
}

#[derive(Debug, Default)]
pub struct HouseListOptions {
    pub guests: Option<i32>,
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub only_active: bool,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house(price: i64, amenities: &str) -> House {
        House {
            house_id: HouseId::new(),
            name: "Pine".into(),
            description: String::new(),
            capacity: 4,
            price_per_night: Decimal::from(price),
            is_active: true,
            amenities: amenities.into(),
        }
    }

    #[test]
    fn amenities_are_split_by_line() {
        let h = house(5000, "Sauna\n\n  Wi-Fi \nFireplace");
        assert_eq!(h.amenities_list(), vec!["Sauna", "Wi-Fi", "Fireplace"]);
    }

    #[test]
    fn similar_range_is_twenty_percent_either_way() {
        let (lo, hi) = house(5000, "").similar_price_range();
        assert_eq!(lo, Decimal::from(4000));
        assert_eq!(hi, Decimal::from(6000));
    }
}
