//! Blocking usage example: form-encoded requests
//!
//! Suitable for build scripts and other sync contexts; no async runtime is
//! needed.
//!
//! To run this example:
//! ```bash
//! RUST_LOG=debug cargo run --example form_usage -- http://localhost:8080
//! ```

use http_facade::{Config, Request};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let base_uri = std::env::args().nth(1);
    let mut config = Config::new(base_uri);
    config.set_package_name("form-usage-example");
    config.set_timeout(10);

    let mut request = Request::form(config)?;

    let params: Map<String, Value> = serde_json::from_value(json!({
        "username": "ada",
        "remember": true,
        "scopes": ["read", "write"]
    }))?;
    request
        .set_method("post")
        .set_path("/login")
        .set_params(params);

    // Blocking call - no tokio runtime needed!
    match request.make_blocking() {
        Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
        Err(err) => match err.as_request_error() {
            Some(failure) if failure.has_response() => {
                println!("Server answered {}", failure.status_code());
                println!("{}", Value::Object(failure.response().clone()));
            }
            Some(failure) => println!("No response: {}", failure.message()),
            None => return Err(err.into()),
        },
    }

    Ok(())
}
