//! Request builders for the booking endpoints.
//!
//! This is the one place that decides which requests carry credentials:
//! mutating methods (PATCH, PUT, DELETE) get pre-emptive basic auth, reads
//! and creation go out anonymously.

use bookcheck_domain::{
    AuthConfig, Booking, BookingId, BookingPatch, Credentials, HttpMethod, RequestBody,
    RequestSpec,
};

use crate::config::{ConfigError, SuiteConfig};
use crate::error::{ContractError, ContractResult};

const COLLECTION_PATH: &str = "booking";

/// Builds [`RequestSpec`]s for one configured booking service.
#[derive(Debug, Clone)]
pub struct BookingApi {
    base_url: String,
    headers: Vec<(String, String)>,
    credentials: Credentials,
    timeout_ms: u64,
}

impl BookingApi {
    /// Creates a builder from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration does not validate.
    pub fn new(config: &SuiteConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers: config
                .default_headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            credentials: config.credentials.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    /// URL of the booking collection.
    #[must_use]
    pub fn collection_url(&self) -> String {
        format!("{}/{COLLECTION_PATH}", self.base_url)
    }

    /// URL of a single booking.
    #[must_use]
    pub fn item_url(&self, id: BookingId) -> String {
        format!("{}/{COLLECTION_PATH}/{id}", self.base_url)
    }

    /// `POST /booking` with the full booking.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MalformedBody`] if the booking cannot be encoded.
    pub fn create(&self, booking: &Booking) -> ContractResult<RequestSpec> {
        Ok(self
            .request(HttpMethod::Post, self.collection_url())
            .with_body(encode(booking)?))
    }

    /// `GET /booking`.
    #[must_use]
    pub fn list(&self) -> RequestSpec {
        self.request(HttpMethod::Get, self.collection_url())
    }

    /// `GET /booking/{id}`.
    #[must_use]
    pub fn read(&self, id: BookingId) -> RequestSpec {
        self.request(HttpMethod::Get, self.item_url(id))
    }

    /// `PATCH /booking/{id}` carrying only the patched fields.
    #[must_use]
    pub fn partial_update(&self, id: BookingId, patch: &BookingPatch) -> RequestSpec {
        self.request(HttpMethod::Patch, self.item_url(id))
            .with_body(RequestBody::json_value(&patch.to_body()))
    }

    /// `PUT /booking/{id}` carrying the complete replacement.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MalformedBody`] if the booking cannot be encoded.
    pub fn full_update(&self, id: BookingId, booking: &Booking) -> ContractResult<RequestSpec> {
        Ok(self
            .request(HttpMethod::Put, self.item_url(id))
            .with_body(encode(booking)?))
    }

    /// `DELETE /booking/{id}`.
    #[must_use]
    pub fn delete(&self, id: BookingId) -> RequestSpec {
        self.request(HttpMethod::Delete, self.item_url(id))
    }

    fn request(&self, method: HttpMethod, url: String) -> RequestSpec {
        let mut spec = RequestSpec::new(method, url).with_timeout_ms(self.timeout_ms);
        for (name, value) in &self.headers {
            spec = spec.with_header(name, value);
        }
        if method.is_mutating() {
            spec = spec.with_auth(AuthConfig::from(&self.credentials));
        }
        spec
    }
}

fn encode(booking: &Booking) -> ContractResult<RequestBody> {
    serde_json::to_value(booking)
        .map(|value| RequestBody::json_value(&value))
        .map_err(|e| ContractError::MalformedBody(e.to_string()))
}
