use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Lifetime advertised for issued tokens, in seconds.
pub const TOKEN_TTL_SECS: i64 = 600;

/// Client credentials the token endpoint accepts.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub client_id: String,
    pub secret_key: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            client_id: "mock-client".to_string(),
            secret_key: "mock-secret".to_string(),
        }
    }
}

/// One address row, shaped like a code search result item.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub dgacode: Option<String>,
    pub zip_code: String,
    pub pref_code: String,
    pub pref_name: String,
    pub pref_kana: Option<String>,
    pub pref_roma: Option<String>,
    pub city_code: String,
    pub city_name: String,
    pub city_kana: Option<String>,
    pub city_roma: Option<String>,
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

/// Address row as returned by the address lookup endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressRow {
    pub zip_code: String,
    pub pref_code: String,
    pub pref_name: String,
    pub pref_kana: String,
    pub pref_roma: String,
    pub city_code: String,
    pub city_name: String,
    pub city_kana: String,
    pub city_roma: String,
    pub town_name: String,
    pub town_kana: String,
    pub town_roma: String,
}

#[derive(Deserialize)]
pub struct TokenGrant {
    pub grant_type: String,
    pub client_id: String,
    pub secret_key: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct IssuedToken {
    pub scope: String,
    pub token_type: String,
    pub expires_in: i64,
    pub token: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AddressQuery {
    pub pref_code: Option<String>,
    pub pref_name: Option<String>,
    pub pref_kana: Option<String>,
    pub pref_roma: Option<String>,
    pub city_code: Option<String>,
    pub city_name: Option<String>,
    pub city_kana: Option<String>,
    pub city_roma: Option<String>,
    pub town_name: Option<String>,
    pub town_kana: Option<String>,
    pub town_roma: Option<String>,
    pub freeword: Option<String>,
    pub flg_getcity: Option<u8>,
    pub flg_getpref: Option<u8>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AddressPage {
    pub level: u32,
    pub page: u32,
    pub limit: u32,
    pub count: u32,
    pub addresses: Vec<AddressRow>,
}

#[derive(Deserialize)]
pub struct PartnerParams {
    pub ec_uid: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub ec_uid: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub choikitype: Option<u8>,
    pub searchtype: Option<u8>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CodePage {
    pub page: u32,
    pub limit: u32,
    pub count: u32,
    pub searchtype: String,
    pub addresses: Vec<Record>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub message: String,
}

type Failure = (StatusCode, Json<ErrorBody>);

fn failure(status: StatusCode, message: &str) -> Failure {
    (
        status,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
}

pub struct MockState {
    credentials: Credentials,
    tokens: RwLock<HashSet<String>>,
    records: Vec<Record>,
}

pub type Db = Arc<MockState>;

pub fn app() -> Router {
    app_with_credentials(Credentials::default())
}

pub fn app_with_credentials(credentials: Credentials) -> Router {
    let db: Db = Arc::new(MockState {
        credentials,
        tokens: RwLock::new(HashSet::new()),
        records: seed_records(),
    });
    Router::new()
        .route("/api/v1/j/token", post(issue_token))
        .route("/api/v1/addresszip", post(address_zip))
        .route("/api/v1/searchcode/{code}", get(search_code))
        .with_state(db)
}

pub async fn run(listener: TcpListener, credentials: Credentials) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_credentials(credentials)).await
}

async fn issue_token(
    State(db): State<Db>,
    Json(input): Json<TokenGrant>,
) -> Result<Json<IssuedToken>, Failure> {
    if input.grant_type != "client_credentials" {
        return Err(failure(StatusCode::BAD_REQUEST, "unsupported grant_type"));
    }
    if input.client_id != db.credentials.client_id || input.secret_key != db.credentials.secret_key {
        tracing::info!(client_id = %input.client_id, "rejected token request");
        return Err(failure(StatusCode::UNAUTHORIZED, "invalid client credentials"));
    }
    let token = Uuid::new_v4().simple().to_string();
    db.tokens.write().await.insert(token.clone());
    Ok(Json(IssuedToken {
        scope: "J1".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: TOKEN_TTL_SECS,
        token: format!("Token: {token}"),
    }))
}

/// Require a caller IP and a bearer token this server issued.
async fn authorize(db: &Db, headers: &HeaderMap) -> Result<(), Failure> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if forwarded.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "x-forwarded-for is required"));
    }
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let Some(token) = token else {
        return Err(failure(StatusCode::UNAUTHORIZED, "missing bearer token"));
    };
    if db.tokens.read().await.contains(token) {
        Ok(())
    } else {
        Err(failure(StatusCode::UNAUTHORIZED, "invalid token"))
    }
}

fn matches(filter: Option<&String>, value: &str) -> bool {
    filter.map_or(true, |f| f.is_empty() || f == value)
}

fn matches_opt(filter: Option<&String>, value: Option<&String>) -> bool {
    filter.map_or(true, |f| f.is_empty() || Some(f) == value)
}

fn to_row(record: &Record) -> AddressRow {
    AddressRow {
        zip_code: record.zip_code.clone(),
        pref_code: record.pref_code.clone(),
        pref_name: record.pref_name.clone(),
        pref_kana: record.pref_kana.clone().unwrap_or_default(),
        pref_roma: record.pref_roma.clone().unwrap_or_default(),
        city_code: record.city_code.clone(),
        city_name: record.city_name.clone(),
        city_kana: record.city_kana.clone().unwrap_or_default(),
        city_roma: record.city_roma.clone().unwrap_or_default(),
        town_name: record.town_name.clone(),
        town_kana: record.town_kana.clone().unwrap_or_default(),
        town_roma: record.town_roma.clone().unwrap_or_default(),
    }
}

/// Slice `items` for a 1-based `page` of `limit` rows.
fn paginate<T>(items: Vec<T>, page: u32, limit: u32) -> Vec<T> {
    let skip = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
    items.into_iter().skip(skip).take(limit as usize).collect()
}

async fn address_zip(
    State(db): State<Db>,
    Query(partner): Query<PartnerParams>,
    headers: HeaderMap,
    Json(input): Json<AddressQuery>,
) -> Result<Json<AddressPage>, Failure> {
    authorize(&db, &headers).await?;
    tracing::debug!(ec_uid = ?partner.ec_uid, "address lookup");

    let found: Vec<&Record> = db
        .records
        .iter()
        .filter(|r| {
            matches(input.pref_code.as_ref(), &r.pref_code)
                && matches(input.pref_name.as_ref(), &r.pref_name)
                && matches_opt(input.pref_kana.as_ref(), r.pref_kana.as_ref())
                && matches_opt(input.pref_roma.as_ref(), r.pref_roma.as_ref())
                && matches(input.city_code.as_ref(), &r.city_code)
                && matches(input.city_name.as_ref(), &r.city_name)
                && matches_opt(input.city_kana.as_ref(), r.city_kana.as_ref())
                && matches_opt(input.city_roma.as_ref(), r.city_roma.as_ref())
                && matches(input.town_name.as_ref(), &r.town_name)
                && matches_opt(input.town_kana.as_ref(), r.town_kana.as_ref())
                && matches_opt(input.town_roma.as_ref(), r.town_roma.as_ref())
                && input.freeword.as_ref().map_or(true, |word| {
                    format!("{}{}{}", r.pref_name, r.city_name, r.town_name).contains(word.as_str())
                })
        })
        .collect();

    let (level, rows) = if input.flg_getpref == Some(1) {
        let mut seen = HashSet::new();
        let rows = found
            .into_iter()
            .filter(|r| seen.insert(r.pref_code.clone()))
            .map(|r| AddressRow {
                pref_code: r.pref_code.clone(),
                pref_name: r.pref_name.clone(),
                pref_kana: r.pref_kana.clone().unwrap_or_default(),
                pref_roma: r.pref_roma.clone().unwrap_or_default(),
                ..AddressRow::default()
            })
            .collect::<Vec<_>>();
        (1, rows)
    } else if input.flg_getcity == Some(1) {
        let mut seen = HashSet::new();
        let rows = found
            .into_iter()
            .filter(|r| seen.insert(r.city_code.clone()))
            .map(|r| AddressRow {
                zip_code: String::new(),
                town_name: String::new(),
                town_kana: String::new(),
                town_roma: String::new(),
                ..to_row(r)
            })
            .collect::<Vec<_>>();
        (2, rows)
    } else {
        (3, found.into_iter().map(to_row).collect::<Vec<_>>())
    };

    let page = input.page.filter(|p| *p > 0).unwrap_or(1);
    let limit = input.limit.filter(|l| *l > 0).unwrap_or(100);
    let count = u32::try_from(rows.len()).unwrap_or(u32::MAX);
    Ok(Json(AddressPage {
        level,
        page,
        limit,
        count,
        addresses: paginate(rows, page, limit),
    }))
}

/// Drop bracketed notes such as `（次のビルを除く）` from a town field.
fn strip_brackets(value: &str) -> String {
    value
        .split(['（', '('])
        .next()
        .unwrap_or_default()
        .to_string()
}

async fn search_code(
    State(db): State<Db>,
    Path(code): Path<String>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> Result<Json<CodePage>, Failure> {
    authorize(&db, &headers).await?;
    tracing::debug!(code = %code, ec_uid = ?params.ec_uid, "code search");

    let exclude_business = params.searchtype == Some(2);
    let by_dgacode: Vec<&Record> = db
        .records
        .iter()
        .filter(|r| r.dgacode.as_deref() == Some(code.as_str()))
        .collect();
    let (kind, found) = if by_dgacode.is_empty() {
        let found: Vec<&Record> = db
            .records
            .iter()
            .filter(|r| r.zip_code == code)
            .filter(|r| !(exclude_business && r.biz_name.is_some()))
            .collect();
        let kind = if found.iter().any(|r| r.biz_name.is_some()) {
            "bizzipcode"
        } else {
            "zipcode"
        };
        (kind, found)
    } else {
        ("dgacode", by_dgacode)
    };

    if found.is_empty() {
        return Err(failure(StatusCode::NOT_FOUND, "no address for code"));
    }

    let keep_brackets = params.choikitype == Some(2);
    let records: Vec<Record> = found
        .into_iter()
        .cloned()
        .map(|mut r| {
            if !keep_brackets {
                r.town_name = strip_brackets(&r.town_name);
                r.town_kana = r.town_kana.as_deref().map(strip_brackets);
                r.town_roma = r.town_roma.as_deref().map(strip_brackets);
            }
            r
        })
        .collect();

    let page = params.page.filter(|p| *p > 0).unwrap_or(1);
    let limit = params.limit.filter(|l| *l > 0).unwrap_or(1000);
    let count = u32::try_from(records.len()).unwrap_or(u32::MAX);
    Ok(Json(CodePage {
        page,
        limit,
        count,
        searchtype: kind.to_string(),
        addresses: paginate(records, page, limit),
    }))
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn tokyo(zip_code: &str, town: [&str; 3]) -> Record {
    Record {
        zip_code: zip_code.to_string(),
        pref_code: "13".to_string(),
        pref_name: "東京都".to_string(),
        pref_kana: text("トウキョウト"),
        pref_roma: text("TOKYO"),
        city_code: "13101".to_string(),
        city_name: "千代田区".to_string(),
        city_kana: text("チヨダク"),
        city_roma: text("CHIYODA-KU"),
        town_name: town[0].to_string(),
        town_kana: text(town[1]),
        town_roma: text(town[2]),
        ..Record::default()
    }
}

/// Fixed data set served by the mock.
pub fn seed_records() -> Vec<Record> {
    vec![
        Record {
            dgacode: text("A7E2FK8"),
            address: text("東京都千代田区千代田1-1"),
            longitude: Some(139.7528),
            latitude: Some(35.6852),
            ..tokyo("1000001", ["千代田", "チヨダ", "CHIYODA"])
        },
        tokyo(
            "1000004",
            [
                "大手町（次のビルを除く）",
                "オオテマチ（ツギノビルヲノゾク）",
                "OTEMACHI(TSUGINOBIRUONOZOKU)",
            ],
        ),
        Record {
            biz_name: text("宮内庁"),
            biz_kana: text("クナイチヨウ"),
            biz_roma: text("KUNAICHO"),
            block_name: text("1-1"),
            town_kana: None,
            town_roma: None,
            ..tokyo("1008111", ["千代田", "", ""])
        },
        Record {
            zip_code: "0600042".to_string(),
            pref_code: "01".to_string(),
            pref_name: "北海道".to_string(),
            pref_kana: text("ホッカイドウ"),
            pref_roma: text("HOKKAIDO"),
            city_code: "01101".to_string(),
            city_name: "札幌市中央区".to_string(),
            city_kana: text("サッポロシチュウオウク"),
            city_roma: text("SAPPORO-SHI CHUO-KU"),
            town_name: "大通西（１～１９丁目）".to_string(),
            town_kana: text("オオドオリニシ（１－１９チョウメ）"),
            town_roma: text("ODORINISHI(1-19-CHOME)"),
            ..Record::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_brackets_handles_both_widths() {
        assert_eq!(strip_brackets("大手町（次のビルを除く）"), "大手町");
        assert_eq!(strip_brackets("OTEMACHI(TSUGINOBIRUONOZOKU)"), "OTEMACHI");
        assert_eq!(strip_brackets("千代田"), "千代田");
    }

    #[test]
    fn paginate_is_one_based() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(paginate(items.clone(), 1, 2), vec![1, 2]);
        assert_eq!(paginate(items.clone(), 3, 2), vec![5]);
        assert!(paginate(items, 4, 2).is_empty());
    }

    #[test]
    fn record_serializes_nulls() {
        let json = serde_json::to_value(&seed_records()[1]).unwrap();
        assert_eq!(json["zip_code"], "1000004");
        assert!(json["dgacode"].is_null());
        assert!(json["latitude"].is_null());
    }

    #[test]
    fn address_query_fields_are_optional() {
        let input: AddressQuery = serde_json::from_str("{}").unwrap();
        assert!(input.pref_code.is_none());
        assert!(input.page.is_none());
    }

    #[test]
    fn seed_records_have_unique_zip_codes() {
        let records = seed_records();
        let zips: HashSet<_> = records.iter().map(|r| r.zip_code.as_str()).collect();
        assert_eq!(zips.len(), records.len());
    }
}
