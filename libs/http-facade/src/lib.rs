//! Minimal HTTP client facade
//!
//! A [`Config`] describes the remote API (base URI, API version, timeout and
//! the package name sent with every call). A [`Request`] built from it
//! collects method, path, headers and parameters, sends them through a
//! `reqwest` client and hands back the response body as a JSON map.
//!
//! - Parameters are sent as JSON ([`Request::json`]) or as URL-encoded form
//!   fields ([`Request::form`])
//! - Every request carries `X-Package-Name` and `X-Package-Version` headers
//! - Extra transport options (`query`, `headers`, `http_errors`, ...) are
//!   merged recursively into the derived options
//! - Failed exchanges surface as [`RequestError`] with the status code and
//!   the parsed error body; status 0 means no response was received
//!
//! # Examples
//!
//! ## Async Usage
//!
//! ```no_run
//! use http_facade::{Config, Request};
//! use serde_json::{Map, Value, json};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::new(Some("https://api.example.com"));
//! config.set_package_name("billing-sdk");
//!
//! let mut request = Request::json(config)?;
//! let params: Map<String, Value> = serde_json::from_value(json!({"amount": 100}))?;
//! request.set_method("post").set_path("/v1/charges").set_params(params);
//!
//! let charge = request.make().await?;
//! println!("{}", charge["id"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Blocking Usage
//!
//! ```no_run
//! use http_facade::{ClientError, Config, Request};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let mut request = Request::form(config)?;
//! request.set_path("/v1/status");
//!
//! match request.make_blocking() {
//!     Ok(body) => println!("{body:?}"),
//!     Err(ClientError::Request(err)) => {
//!         eprintln!("status {}: {:?}", err.status_code(), err.response());
//!     }
//!     Err(other) => return Err(other.into()),
//! }
//! # Ok(())
//! # }
//! ```

mod body;
mod config;
mod error;
pub mod merge;
mod request;
mod response;
mod transport;

// Re-export public API
pub use body::BodyMode;
pub use config::{
    Config, DEFAULT_TIMEOUT_SECS, DEFAULT_VERSION, PACKAGE_NAME_HEADER, PACKAGE_VERSION_HEADER,
    VERSIONS,
};
pub use error::{ClientError, ConfigError, RequestError};
pub use request::Request;
pub use response::{RAW_BODY_KEY, normalize_body};
pub use transport::{OPTION_BODY, OPTION_HEADERS, OPTION_HTTP_ERRORS, OPTION_QUERY};
