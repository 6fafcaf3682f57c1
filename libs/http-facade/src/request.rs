use std::sync::Arc;
use std::thread;

use serde_json::{Map, Value};
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::body::BodyMode;
use crate::config::Config;
use crate::error::ClientError;
use crate::merge::{deep_merge, flat_merge};
use crate::transport::{OPTION_HEADERS, Transport};

const DEFAULT_METHOD: &str = "GET";
const DEFAULT_PATH: &str = "/";

/// A reusable request against the API described by a [`Config`].
///
/// The transport client is created once, in the constructor, and used for
/// every call made through this value. Setters return `&mut Self` so calls
/// can be chained:
///
/// ```no_run
/// use http_facade::{Config, Request};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), http_facade::ClientError> {
/// let mut request = Request::json(Config::new(Some("https://api.example.com")))?;
/// request
///     .set_method("post")
///     .set_path("/v1/users")
///     .set_params(json!({"name": "Ada"}).as_object().cloned().unwrap_or_default());
///
/// let user = request.make().await?;
/// println!("created {}", user["id"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Request {
    transport: Transport,
    config: Arc<Config>,
    mode: BodyMode,
    method: String,
    headers: Map<String, Value>,
    params: Map<String, Value>,
    path: Option<String>,
    options: Map<String, Value>,
}

impl Request {
    /// Build a request with the given body mode.
    ///
    /// # Errors
    /// Returns [`ClientError::BuildError`] when the transport client cannot be
    /// created or the configured base URI is not a valid URL.
    pub fn new(config: impl Into<Arc<Config>>, mode: BodyMode) -> Result<Self, ClientError> {
        let config = config.into();
        let transport = Transport::new(&config)?;
        let mut request = Self {
            transport,
            mode,
            method: DEFAULT_METHOD.to_owned(),
            headers: Map::new(),
            params: Map::new(),
            path: None,
            options: Map::new(),
            config,
        };
        let package_headers = request.config.package_headers();
        request.merge_headers(package_headers);
        Ok(request)
    }

    /// Request sending its parameters as a JSON body
    ///
    /// # Errors
    /// See [`Request::new`].
    pub fn json(config: impl Into<Arc<Config>>) -> Result<Self, ClientError> {
        Self::new(config, BodyMode::Json)
    }

    /// Request sending its parameters as URL-encoded form fields
    ///
    /// # Errors
    /// See [`Request::new`].
    pub fn form(config: impl Into<Arc<Config>>) -> Result<Self, ClientError> {
        Self::new(config, BodyMode::FormParams)
    }

    /// Set how parameters are encoded
    pub fn set_mode(&mut self, mode: BodyMode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Set the HTTP method; it is stored uppercased
    pub fn set_method(&mut self, method: &str) -> &mut Self {
        self.method = method.to_uppercase();
        self
    }

    /// Replace the request headers
    pub fn set_headers(&mut self, headers: Map<String, Value>) -> &mut Self {
        self.headers = headers;
        self
    }

    /// Replace the request parameters
    pub fn set_params(&mut self, params: Map<String, Value>) -> &mut Self {
        self.params = params;
        self
    }

    /// Set the request path
    pub fn set_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = Some(path.into());
        self
    }

    /// Add headers, overwriting existing names
    pub fn merge_headers(&mut self, headers: Map<String, Value>) -> &mut Self {
        flat_merge(&mut self.headers, headers);
        self
    }

    /// Add parameters, overwriting existing keys
    pub fn merge_params(&mut self, params: Map<String, Value>) -> &mut Self {
        flat_merge(&mut self.params, params);
        self
    }

    /// Merge extra transport options. Top-level keys overwrite earlier ones
    /// here; nested maps are combined with the derived options in
    /// [`Request::options`].
    pub fn merge_options(&mut self, options: Map<String, Value>) -> &mut Self {
        flat_merge(&mut self.options, options);
        self
    }

    /// Get the shared configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the body mode
    #[must_use]
    pub fn mode(&self) -> BodyMode {
        self.mode
    }

    /// Get the HTTP method
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the request headers
    #[must_use]
    pub fn headers(&self) -> &Map<String, Value> {
        &self.headers
    }

    /// Get the request parameters
    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Request path, `/` when none was set
    #[must_use]
    pub fn path(&self) -> &str {
        match self.path.as_deref() {
            Some(path) if !path.is_empty() => path,
            _ => DEFAULT_PATH,
        }
    }

    /// Options handed to the transport: `{<mode>: params, "headers": headers}`
    /// with the extra options merged recursively on top.
    #[must_use]
    pub fn options(&self) -> Map<String, Value> {
        let mut options = Map::new();
        options.insert(
            self.mode.option_key().to_owned(),
            Value::Object(self.params.clone()),
        );
        options.insert(OPTION_HEADERS.to_owned(), Value::Object(self.headers.clone()));
        deep_merge(&mut options, self.options.clone());
        options
    }

    /// Send the request and return the normalized response body.
    ///
    /// # Errors
    /// - [`ClientError::Request`] when the exchange fails: with the status
    ///   code and parsed body when the server answered with an error status,
    ///   with status 0 and an empty body when no response was received.
    /// - [`ClientError::BuildError`] / [`ClientError::Serialization`] when the
    ///   request cannot be assembled. These are never wrapped.
    pub async fn make(&self) -> Result<Map<String, Value>, ClientError> {
        self.transport
            .send(&self.method, self.path(), self.options())
            .await
    }

    /// Blocking version of [`Request::make`] for sync contexts.
    ///
    /// Inside a multi-threaded tokio runtime the current worker is handed
    /// over with `block_in_place`. A current-thread runtime cannot give up
    /// its only worker, so the call is driven on a scoped helper thread
    /// instead. Outside of any runtime a temporary current-thread runtime
    /// drives the call.
    ///
    /// # Errors
    /// Same as [`Request::make`], plus [`ClientError::Io`] when the temporary
    /// runtime cannot be created.
    pub fn make_blocking(&self) -> Result<Map<String, Value>, ClientError> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.make()))
            }
            Ok(_) => thread::scope(|scope| {
                scope
                    .spawn(|| self.make_on_own_runtime())
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            }),
            Err(_) => self.make_on_own_runtime(),
        }
    }

    fn make_on_own_runtime(&self) -> Result<Map<String, Value>, ClientError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(self.make())
    }
}
