use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use maileon_utils::MaileonConfig;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method, RequestBuilder,
};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::{ApiError, ApiFuture, ApiResult, TransactionApi, TransactionType, IMPORT_KEY};

/// Media type of every Maileon REST request and response body.
const MAILEON_JSON: &str = "application/vnd.maileon.api+json";

/// Largest page Maileon serves when listing transaction types.
const PAGE_SIZE: u32 = 1000;

/// Client of the Maileon REST API.
pub struct MaileonApi {
    base_url: String,
    debug: bool,
    page_size: u32,
    client: reqwest::Client,
}

impl std::fmt::Debug for MaileonApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaileonApi")
            .field("base_url", &self.base_url)
            .field("debug", &self.debug)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl MaileonApi {
    /// Creates a new [`MaileonApi`] for `api_key` with every other setting
    /// at its default. `debug` logs request and response bodies.
    pub fn new(api_key: &str, debug: bool) -> ApiResult<Self> {
        Self::from_config(&MaileonConfig {
            debug,
            ..MaileonConfig::new(api_key)
        })
    }

    /// Creates a new [`MaileonApi`] from the delivery configuration.
    pub fn from_config(config: &MaileonConfig) -> ApiResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ApiError::Configuration("API key may not be blank".to_string()));
        }
        if config.timeout == 0 {
            return Err(ApiError::Configuration(
                "Timeout must be at least 1 second".to_string(),
            ));
        }

        // The key is a credential, encoded exactly as configured
        let token = general_purpose::STANDARD.encode(&config.api_key);
        let mut authorization = HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|e| ApiError::Configuration(format!("Invalid API key: {e}")))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static(MAILEON_JSON));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ApiError::Configuration(format!("Failed to create client: {e}")))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!(base_url = %base_url, debug = config.debug, "Maileon API client initialized");

        Ok(Self {
            base_url,
            debug: config.debug,
            page_size: PAGE_SIZE,
            client,
        })
    }

    /// Sets the number of transaction types requested per page, at least 1.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.build_url(path))
    }

    /// Sends `request` and decodes the response body as JSON, an empty
    /// body decodes to [`Value::Null`].
    async fn send(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Http(format!("Request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Http(format!("Failed to read response: {e}")))?;

        if self.debug {
            debug!(status = status.as_u16(), body = %text, "Maileon API response");
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::Decode(format!("Failed to parse response: {e}")))
    }
}

/// Splits the dispatcher payload into the body of one Maileon transaction:
/// the `import` block is kept apart and every other key becomes content.
fn transaction_body(type_id: u64, payload: &Map<String, Value>) -> Value {
    let mut content = payload.clone();
    let import = content.remove(IMPORT_KEY).unwrap_or(Value::Null);
    json!([{
        "type": type_id,
        "import": import,
        "content": content,
    }])
}

impl TransactionApi for MaileonApi {
    fn transaction_types(&self) -> ApiFuture<'_, Vec<TransactionType>> {
        Box::pin(async move {
            debug!(base_url = %self.base_url, "Listing transaction types");
            let mut types = Vec::new();
            let mut page_index: u32 = 1;
            loop {
                let request = self
                    .request(Method::GET, "transactions/types")
                    .query(&[("page_index", page_index), ("page_size", self.page_size)]);
                let body = self.send(request).await?;
                if body.is_null() {
                    break;
                }
                let page: Vec<TransactionType> = serde_json::from_value(body)
                    .map_err(|e| ApiError::Decode(format!("Invalid transaction types: {e}")))?;
                let count = page.len();
                types.extend(page);

                // A short page is the last one
                if count < self.page_size as usize {
                    break;
                }
                page_index += 1;
            }
            debug!(count = types.len(), pages = page_index, "Listed transaction types");
            Ok(types)
        })
    }

    fn create_transaction<'a>(
        &'a self,
        type_id: u64,
        payload: &'a Map<String, Value>,
    ) -> ApiFuture<'a, Value> {
        Box::pin(async move {
            let body = transaction_body(type_id, payload);
            if self.debug {
                debug!(type_id = type_id, body = %body, "Creating transaction");
            }
            let request = self
                .request(Method::POST, "transactions")
                .header(CONTENT_TYPE, MAILEON_JSON)
                .body(body.to_string());
            self.send(request).await
        })
    }
}
