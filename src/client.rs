//! Kubernetes REST client implementing [`ServiceApi`] over blocking HTTP.
//!
//! Only compiled with the `remote` feature. The client is rebuilt from the
//! connection parameters of each call, since those arrive with the validated
//! input rather than at process start.

use std::time::Duration;

use serde_json::{json, Value};

use crate::service::{ApiError, Connection, Service, ServiceApi};

/// Timeout applied to every API request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Creates services through the Kubernetes core/v1 REST API.
#[derive(Debug, Clone, Copy, Default)]
pub struct KubeClient;

impl KubeClient {
    pub fn new() -> Self {
        Self
    }
}

impl ServiceApi for KubeClient {
    fn create_service(
        &self,
        connection: &Connection,
        service: &Service,
    ) -> Result<String, ApiError> {
        let http = build_http_client(connection)?;
        let url = service_url(connection, &service.metadata.namespace);

        let manifest = json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": service.metadata,
            "spec": service.spec,
        });

        let mut request = http.post(&url).json(&manifest);
        if let Some(token) = &connection.bearer_token {
            request = request.bearer_auth(token);
        } else if let (Some(username), Some(password)) =
            (&connection.username, &connection.password)
        {
            request = request.basic_auth(username, Some(password));
        }

        let response = request
            .send()
            .map_err(|err| ApiError(format!("request to {url} failed ({err})")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|err| ApiError(format!("invalid response from {url} ({err})")))?;

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            return Err(ApiError(format!("server returned {status}: {message}")));
        }

        body.get("metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError("response is missing metadata.name".to_string()))
    }
}

fn build_http_client(connection: &Connection) -> Result<reqwest::blocking::Client, ApiError> {
    let mut builder = reqwest::blocking::Client::builder().timeout(REQUEST_TIMEOUT);

    if let Some(cacert) = &connection.cacert {
        let certificate = reqwest::Certificate::from_pem(cacert.as_bytes())
            .map_err(|err| ApiError(format!("invalid CA certificate ({err})")))?;
        builder = builder.add_root_certificate(certificate);
    }

    // Input validation guarantees cert and key arrive together.
    if let (Some(cert), Some(key)) = (&connection.cert, &connection.key) {
        let identity = reqwest::Identity::from_pem(format!("{key}\n{cert}").as_bytes())
            .map_err(|err| ApiError(format!("invalid client certificate or key ({err})")))?;
        builder = builder.identity(identity);
    }

    // TODO: honor connection.server_name once reqwest exposes an SNI override.

    builder
        .build()
        .map_err(|err| ApiError(format!("failed to build HTTP client ({err})")))
}

/// Builds the core/v1 services collection URL for the given namespace.
/// Hosts without a scheme default to HTTPS, matching in-cluster usage.
fn service_url(connection: &Connection, namespace: &str) -> String {
    let host = connection.host.trim_end_matches('/');
    let base = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };
    format!(
        "{base}{}/v1/namespaces/{namespace}/services",
        connection.path
    )
}
