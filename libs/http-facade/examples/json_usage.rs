//! Async usage example: JSON requests
//!
//! To run this example:
//! ```bash
//! export HTTP_FACADE_BASE_URI="http://localhost:8080"
//! export HTTP_FACADE_PACKAGE_NAME="json-usage-example"
//! RUST_LOG=http_facade=debug cargo run --example json_usage
//! ```

use http_facade::{ClientError, Config, Request};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    println!(
        "Using API {} at {}\n",
        config.version_path(),
        config.base_uri().unwrap_or("<no base URI>")
    );

    let mut request = Request::json(config)?;
    let version_path = request.config().version_path();

    println!("=== Example 1: POST with JSON body ===\n");

    let params: Map<String, Value> = serde_json::from_value(json!({
        "name": "Ada Lovelace",
        "roles": ["admin"]
    }))?;
    request
        .set_method("post")
        .set_path(format!("/{version_path}/users"))
        .set_params(params);

    print_outcome(request.make().await)?;

    println!("=== Example 2: GET with query options ===\n");

    let query: Map<String, Value> = serde_json::from_value(json!({
        "query": {"page": 2, "filter": {"role": "admin"}}
    }))?;
    request
        .set_method("get")
        .set_params(Map::new())
        .merge_options(query);

    print_outcome(request.make().await)?;

    Ok(())
}

fn print_outcome(outcome: Result<Map<String, Value>, ClientError>) -> anyhow::Result<()> {
    match outcome {
        Ok(body) => println!("{}\n", serde_json::to_string_pretty(&body)?),
        Err(ClientError::Request(err)) => {
            println!("{}", err.report());
            println!("Response: {}\n", Value::Object(err.response().clone()));
        }
        Err(other) => return Err(other.into()),
    }
    Ok(())
}
