//! Blocking client for the yd4b postal code and digital address API.
//!
//! # Overview
//! Three endpoints are wrapped: address-to-zip lookup (`address_zip`), search
//! by zip / business zip / digital address code (`search_code`), and the
//! client-credentials token exchange (`get_token`). Each call builds one
//! request, dispatches it through a pluggable `Transport`, checks for a 200,
//! and decodes the JSON body. Every failure comes back as an `ApiError`.
//!
//! # Design
//! - `Yd4bClient` holds configuration only; request and response values are
//!   created per call.
//! - Every endpoint has a pure `build_*` / `parse_*` pair, so the I/O
//!   boundary is explicit and the default `UreqTransport` can be swapped for
//!   a closure in tests.
//! - Nothing is retried, cached, or refreshed in the background.
//!
//! ```no_run
//! use yd4b::{AddressZipRequest, SearchCodeRequest, Yd4bClient};
//!
//! # fn main() -> Result<(), yd4b::ApiError> {
//! let mut client = Yd4bClient::new("https://api.example.jp", "client-id", "secret", "203.0.113.7");
//! client.authenticate()?;
//!
//! let found = client.address_zip(&AddressZipRequest::new().pref_code("13").city_code("13101"))?;
//! println!("{} matches", found.count);
//!
//! let by_code = client.search_code(&SearchCodeRequest::new("1000001"))?;
//! println!("{:?}", by_code.searchtype);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod types;

pub use client::Yd4bClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind};
pub use http::{BoxError, HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use request::{AddressZipRequest, ChoikiType, SearchCodeRequest, SearchScope, TokenRequest};
pub use types::{
    AddressItem, AddressZipResponse, SearchCodeAddressItem, SearchCodeResponse, SearchKind,
    TokenResponse,
};
