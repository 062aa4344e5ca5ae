//! Ad Manager API SOAP client
//!
//! Each service has one endpoint, `{base}/{api_version}/{service}`, that
//! accepts SOAP envelopes naming the operation in their body.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use super::AccessTokenProvider;
use super::soap::{self, RequestHeader};
use crate::models::NetworkCode;

/// Error returned when the API does not answer with a result
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{operation} was rejected as unauthorized (HTTP {status})")]
    Unauthorized { operation: String, status: u16 },
    #[error("{operation} failed with HTTP {status}: {message}")]
    Fault {
        operation: String,
        status: u16,
        message: String,
    },
    #[error("{operation} failed with HTTP {status}")]
    Status { operation: String, status: u16 },
}

/// Ad Manager API client bound to one network and API version
pub struct AdManagerClient {
    auth: Arc<dyn AccessTokenProvider>,
    application_name: String,
    network_code: NetworkCode,
    api_version: String,
    base_url: Url,
}

impl AdManagerClient {
    /// Ad Manager API base URL
    const BASE_URL: &'static str = "https://ads.google.com/apis/ads/publisher/";

    /// Create a new client
    ///
    /// # Arguments
    /// * `auth` - Access token provider
    /// * `application_name` - Sent with every request to identify the caller
    /// * `network_code` - Network the requests operate on
    /// * `api_version` - API version path segment, e.g. `v202405`
    pub fn new(
        auth: Arc<dyn AccessTokenProvider>,
        application_name: impl Into<String>,
        network_code: NetworkCode,
        api_version: impl Into<String>,
    ) -> Result<Self> {
        let base_url = Url::parse(Self::BASE_URL).context("Invalid Ad Manager base URL")?;
        Ok(Self {
            auth,
            application_name: application_name.into(),
            network_code,
            api_version: api_version.into().trim().to_string(),
            base_url,
        })
    }

    /// Send requests to a different host (e.g. a local stub server)
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        self.base_url = Url::parse(&normalized)
            .with_context(|| format!("Invalid Ad Manager base URL: {}", base_url))?;
        Ok(self)
    }

    pub fn network_code(&self) -> &NetworkCode {
        &self.network_code
    }

    /// Get a handle for one API service, e.g. `UserService`
    pub fn get_service(&self, service_name: &str) -> Result<AdManagerService> {
        let endpoint = self
            .base_url
            .join(&format!("{}/{}", self.api_version, service_name))
            .with_context(|| format!("Failed to build endpoint for {}", service_name))?;

        Ok(AdManagerService {
            auth: Arc::clone(&self.auth),
            application_name: self.application_name.clone(),
            network_code: self.network_code.clone(),
            service_name: service_name.to_string(),
            namespace: soap::namespace(&self.api_version),
            endpoint,
        })
    }
}

/// A single Ad Manager service (UserService, OrderService, ...)
pub struct AdManagerService {
    auth: Arc<dyn AccessTokenProvider>,
    application_name: String,
    network_code: NetworkCode,
    service_name: String,
    namespace: String,
    endpoint: Url,
}

impl AdManagerService {
    pub fn network_code(&self) -> &NetworkCode {
        &self.network_code
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// URL every operation of this service is posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Perform one operation and decode its `rval`
    ///
    /// Returns `Ok(None)` when the response carries no value.
    ///
    /// # Errors
    /// Returns [`ApiError`] for non-success HTTP statuses, carrying the SOAP
    /// fault message when there is one; transport and decoding failures are
    /// reported with context.
    pub fn perform_operation<B, T>(&self, operation: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let qualified = format!("{}.{}", self.service_name, operation);
        let envelope = soap::request_envelope(
            &self.namespace,
            RequestHeader {
                network_code: self.network_code.as_str(),
                application_name: &self.application_name,
            },
            operation,
            body,
        )?;
        let access_token = self.auth.access_token()?;

        let mut response = ureq::post(self.endpoint.as_str())
            .config()
            .http_status_as_error(false)
            .build()
            .header("Authorization", &format!("Bearer {}", access_token))
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", "\"\"")
            .send(envelope.as_str())
            .map_err(|e| anyhow::anyhow!("Failed to send {} request: {}", qualified, e))?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("Failed to read {} response", qualified))?;

        match status {
            200..=299 => soap::response_value(&text)
                .with_context(|| format!("Failed to parse {} response", qualified)),
            401 | 403 => Err(ApiError::Unauthorized {
                operation: qualified,
                status,
            }
            .into()),
            _ => match soap::fault_string(&text) {
                Some(message) => Err(ApiError::Fault {
                    operation: qualified,
                    status,
                    message,
                }
                .into()),
                None => Err(ApiError::Status {
                    operation: qualified,
                    status,
                }
                .into()),
            },
        }
    }
}
