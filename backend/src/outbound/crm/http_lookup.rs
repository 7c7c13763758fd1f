//! Reqwest-backed CRM registry adapter.
//!
//! Owns transport details only: the `x-api-key` header, timeout and status
//! mapping, and decoding the registry JSON into a [`CrmRecord`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::CrmRecordDto;
use crate::domain::crm::{CrmQuery, CrmRecord};
use crate::domain::ports::{CrmLookup, CrmLookupError};
use crate::outbound::status_message;

const API_KEY_HEADER: &str = "x-api-key";

/// CRM registry client for `GET {base}/crm/{uf}/{number}`.
pub struct CrmHttpLookup {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl CrmHttpLookup {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, query: &CrmQuery) -> Result<Url, CrmLookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CrmLookupError::transport("CRM base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["crm", query.uf.as_str(), query.number.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl CrmLookup for CrmHttpLookup {
    async fn lookup(&self, query: &CrmQuery) -> Result<CrmRecord, CrmLookupError> {
        if !query.number.is_council_format() {
            debug!(%query, "CRM number outside council format");
            return Err(CrmLookupError::not_found(query.to_string()));
        }
        let url = self.endpoint(query)?;
        debug!(%query, "querying CRM registry");
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| CrmLookupError::transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| CrmLookupError::transport(error.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(query, status, body.as_ref()));
        }
        parse_record(body.as_ref())
    }
}

fn parse_record(body: &[u8]) -> Result<CrmRecord, CrmLookupError> {
    let decoded: CrmRecordDto = serde_json::from_slice(body).map_err(|error| {
        CrmLookupError::decode(format!("invalid CRM registry JSON payload: {error}"))
    })?;
    decoded.into_domain().map_err(CrmLookupError::decode)
}

fn map_status_error(query: &CrmQuery, status: StatusCode, body: &[u8]) -> CrmLookupError {
    match status {
        StatusCode::NOT_FOUND => CrmLookupError::not_found(query.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CrmLookupError::unauthorized(status_message(status, body))
        }
        _ => CrmLookupError::transport(status_message(status, body)),
    }
}

#[cfg(test)]
mod tests {
    //! Adapter coverage against a local mock registry.

    use super::*;
    use httpmock::prelude::*;
    use rstest::rstest;

    fn query() -> CrmQuery {
        CrmQuery::try_from_parts("SP", "123456").expect("valid query")
    }

    fn adapter(server: &MockServer) -> CrmHttpLookup {
        let base = Url::parse(&server.url("/v1")).expect("mock server URL");
        CrmHttpLookup::new(base, "secret", Duration::from_secs(5)).expect("client builds")
    }

    #[tokio::test]
    async fn decodes_registry_record() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/crm/SP/123456")
                    .header("x-api-key", "secret");
                then.status(200).json_body(serde_json::json!({
                    "nome": " Dra. Ana Souza ",
                    "situacao": "Ativo",
                    "especialidades": ["Cardiologia", " "]
                }));
            })
            .await;

        let record = adapter(&server).lookup(&query()).await.expect("record");
        mock.assert_async().await;
        assert_eq!(record.name, "Dra. Ana Souza");
        assert!(record.is_active());
        assert_eq!(record.specialties, ["Cardiologia".to_owned()]);
    }

    #[rstest]
    #[case::not_found(404)]
    #[case::unauthorized(401)]
    #[case::forbidden(403)]
    #[case::server_error(502)]
    #[tokio::test]
    async fn maps_error_statuses(#[case] status: u16) {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/crm/SP/123456");
                then.status(status).body("{\"erro\":\"x\"}");
            })
            .await;

        let error = adapter(&server)
            .lookup(&query())
            .await
            .expect_err("lookup fails");
        match status {
            404 => assert_eq!(error, CrmLookupError::not_found("CRM-SP 123456")),
            401 | 403 => assert!(matches!(error, CrmLookupError::Unauthorized { .. })),
            _ => assert!(matches!(error, CrmLookupError::Transport { .. })),
        }
    }

    #[rstest]
    #[case("12ab")]
    #[case("123456789")]
    #[tokio::test]
    async fn non_council_numbers_are_not_found_without_a_request(#[case] number: &str) {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200);
            })
            .await;
        let query = CrmQuery::try_from_parts("SP", number).expect("accepted query");

        let error = adapter(&server)
            .lookup(&query)
            .await
            .expect_err("lookup fails");
        assert_eq!(error, CrmLookupError::not_found(format!("CRM-SP {number}")));
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/crm/SP/123456");
                then.status(200).body("<html>");
            })
            .await;

        let error = adapter(&server)
            .lookup(&query())
            .await
            .expect_err("decode fails");
        assert!(matches!(error, CrmLookupError::Decode { .. }));
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let lookup = CrmHttpLookup::new(
            Url::parse("https://api.example/registry/").expect("url"),
            "k",
            Duration::from_secs(1),
        )
        .expect("client builds");
        let url = lookup.endpoint(&query()).expect("endpoint");
        assert_eq!(url.as_str(), "https://api.example/registry/crm/SP/123456");
    }
}
