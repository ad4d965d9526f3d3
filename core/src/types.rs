//! Response DTOs for the yd4b API.
//!
//! # Design
//! These types mirror the JSON the service returns. Fields the provider may
//! send as `null` are `Option` so "absent" stays distinct from an empty
//! string. Every other field reads a missing key or a `null` as its zero
//! value.

use serde::{Deserialize, Deserializer, Serialize};

/// Read `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Result of an address-to-zip lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressZipResponse {
    /// Granularity of the returned items (prefecture, city or town).
    #[serde(deserialize_with = "null_as_default")]
    pub level: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub page: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub limit: u32,
    /// Total number of matches across all pages.
    #[serde(deserialize_with = "null_as_default")]
    pub count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub addresses: Vec<AddressItem>,
}

/// One address matched by an address-to-zip lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressItem {
    #[serde(deserialize_with = "null_as_default")]
    pub zip_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pref_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pref_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pref_kana: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pref_roma: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city_kana: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city_roma: String,
    #[serde(deserialize_with = "null_as_default")]
    pub town_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub town_kana: String,
    #[serde(deserialize_with = "null_as_default")]
    pub town_roma: String,
}

/// Which code family a code search matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Digital address code.
    Dgacode,
    Zipcode,
    /// Business-specific zip code.
    Bizzipcode,
    /// A value this client does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Result of a search by zip code, business zip code or digital address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCodeResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub page: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub limit: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub searchtype: SearchKind,
    #[serde(deserialize_with = "null_as_default")]
    pub addresses: Vec<SearchCodeAddressItem>,
}

/// One address matched by a code search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCodeAddressItem {
    pub dgacode: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub zip_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pref_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pref_name: String,
    pub pref_kana: Option<String>,
    pub pref_roma: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub city_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city_name: String,
    pub city_kana: Option<String>,
    pub city_roma: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub town_name: String,
    pub town_kana: Option<String>,
    pub town_roma: Option<String>,
    pub biz_name: Option<String>,
    pub biz_kana: Option<String>,
    pub biz_roma: Option<String>,
    pub block_name: Option<String>,
    pub other_name: Option<String>,
    pub address: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// Token issued by `POST /api/{version}/j/token`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub scope: String,
    #[serde(deserialize_with = "null_as_default")]
    pub token_type: String,
    /// Lifetime of the token in seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub expires_in: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub token: String,
}
