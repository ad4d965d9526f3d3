//! Request values for the three yd4b endpoints.
//!
//! # Design
//! Each request starts from an empty value and is shaped by chained setters.
//! Setters are applied in call order, so a later call on the same field wins.
//! Unset fields are left out of the JSON body or query string entirely, and
//! empty strings or zero numbers passed to a setter count as unset, matching
//! what the API treats as "not given".

use serde::{Deserialize, Serialize};

fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    (!value.is_empty()).then_some(value)
}

fn positive(value: u32) -> Option<u32> {
    (value > 0).then_some(value)
}

fn flag(enabled: bool) -> Option<u8> {
    enabled.then_some(1)
}

macro_rules! text_setters {
    ($($(#[$doc:meta])* $field:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.$field = non_empty(value);
                self
            }
        )*
    };
}

/// Body of `POST /api/{version}/addresszip`: look up zip codes from address parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressZipRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref_kana: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref_roma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_kana: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_roma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town_kana: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town_roma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeword: Option<String>,
    /// `1` asks for the list of cities instead of individual towns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flg_getcity: Option<u8>,
    /// `1` asks for the list of prefectures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flg_getpref: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl AddressZipRequest {
    pub fn new() -> Self {
        Self::default()
    }

    text_setters! {
        /// Two-digit prefecture code, e.g. `"13"`.
        pref_code,
        pref_name,
        /// Prefecture name in katakana.
        pref_kana,
        /// Prefecture name in romaji.
        pref_roma,
        /// Five-digit local government code, e.g. `"13101"`.
        city_code,
        city_name,
        city_kana,
        city_roma,
        town_name,
        town_kana,
        town_roma,
        /// Free text matched against any part of the address.
        freeword,
    }

    #[must_use]
    pub fn flg_getcity(mut self, enabled: bool) -> Self {
        self.flg_getcity = flag(enabled);
        self
    }

    #[must_use]
    pub fn flg_getpref(mut self, enabled: bool) -> Self {
        self.flg_getpref = flag(enabled);
        self
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = positive(page);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = positive(limit);
        self
    }
}

/// How the town field is rendered in code search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoikiType {
    /// Bracketed notes are dropped from the town name.
    WithoutBrackets = 1,
    /// Bracketed notes are kept in the town name.
    WithBrackets = 2,
}

/// Which code families a code search looks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Zip codes, business zip codes and digital address codes.
    All = 1,
    /// Everything except business zip codes.
    ExcludeBusiness = 2,
}

/// Parameters of `GET /api/{version}/searchcode/{code}`.
///
/// `code` may be a zip code, a business zip code, or a digital address code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCodeRequest {
    pub code: String,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub choikitype: Option<ChoikiType>,
    pub searchtype: Option<SearchScope>,
}

impl SearchCodeRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            page: None,
            limit: None,
            choikitype: None,
            searchtype: None,
        }
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = positive(page);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = positive(limit);
        self
    }

    #[must_use]
    pub fn choikitype(mut self, choikitype: ChoikiType) -> Self {
        self.choikitype = Some(choikitype);
        self
    }

    #[must_use]
    pub fn searchtype(mut self, searchtype: SearchScope) -> Self {
        self.searchtype = Some(searchtype);
        self
    }

    /// Query parameters carried by this request, in wire order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(choikitype) = self.choikitype {
            pairs.push(("choikitype", (choikitype as u8).to_string()));
        }
        if let Some(searchtype) = self.searchtype {
            pairs.push(("searchtype", (searchtype as u8).to_string()));
        }
        pairs
    }
}

/// Grant type the token endpoint accepts.
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// Body of `POST /api/{version}/j/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: String,
    pub secret_key: String,
}

impl TokenRequest {
    pub fn client_credentials(client_id: &str, secret_key: &str) -> Self {
        Self {
            grant_type: CLIENT_CREDENTIALS_GRANT.to_string(),
            client_id: client_id.to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}
