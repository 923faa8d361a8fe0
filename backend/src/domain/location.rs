//! Cities and postal addresses.

use super::{AddressId, CityId};

/// City from the reference list. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub id: CityId,
    pub name: String,
}

/// Street address inside a known city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub id: AddressId,
    pub city_id: CityId,
    pub street: String,
}

/// Address supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInput {
    pub city_id: CityId,
    pub street: String,
}

/// Built-in city list seeded at startup.
pub const REFERENCE_CITY_NAMES: [&str; 22] = [
    "基隆市", "嘉義市", "台北市", "嘉義縣", "新北市", "台南市", "桃園縣", "高雄市", "新竹市",
    "屏東縣", "新竹縣", "台東縣", "苗栗縣", "花蓮縣", "台中市", "宜蘭縣", "彰化縣", "澎湖縣",
    "南投縣", "金門縣", "雲林縣", "連江縣",
];
