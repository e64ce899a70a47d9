use adf_domain::{AdfConnectionConfig, ExtractionError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{
    fmt::{Debug, Formatter},
    time::Duration,
};
use tracing::debug;

const GRANT_TYPE: &str = "client_credentials";
const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
const TOKEN_PATH: &str = "oauth2/v2.0/token";

#[async_trait]
pub trait FetcherExt {
    async fn get_token(
        &self,
        credentials: &ClientCredentials<'_>,
    ) -> Result<AccessToken, ExtractionError>;
}

/// Opaque bearer token. Its value never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(****)")
    }
}

#[derive(Clone, Copy)]
pub struct ClientCredentials<'a> {
    pub tenant_id: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

impl<'a> From<&'a AdfConnectionConfig> for ClientCredentials<'a> {
    fn from(config: &'a AdfConnectionConfig) -> Self {
        Self {
            tenant_id: &config.tenant_id,
            client_id: &config.client_id,
            client_secret: &config.client_secret,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AzureTokenResponse {
    access_token: String,
}

/// Client-credentials token exchange against the Microsoft identity platform.
#[derive(Debug, Clone)]
pub struct AzureTokenFetcher {
    client: Client,
    authority_url: String,
    timeout: Duration,
}

impl AzureTokenFetcher {
    pub fn new(authority_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            authority_url: authority_url.trim_end_matches('/').to_owned(),
            timeout,
        }
    }

    pub fn from_config(config: &AdfConnectionConfig) -> Self {
        Self::new(&config.authority_url, config.token_timeout())
    }

    fn token_url(&self, tenant_id: &str) -> String {
        format!("{}/{tenant_id}/{TOKEN_PATH}", self.authority_url)
    }
}

#[async_trait]
impl FetcherExt for AzureTokenFetcher {
    async fn get_token(
        &self,
        credentials: &ClientCredentials<'_>,
    ) -> Result<AccessToken, ExtractionError> {
        let url = self.token_url(credentials.tenant_id);
        debug!(tenant_id = credentials.tenant_id, "Requesting management API token");

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", GRANT_TYPE),
                ("client_id", credentials.client_id),
                ("client_secret", credentials.client_secret),
                ("scope", MANAGEMENT_SCOPE),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ExtractionError::authentication_error(
                status,
                &body,
                Some("token_endpoint"),
            ));
        }

        let res = serde_json::from_str::<AzureTokenResponse>(&body).map_err(|err| {
            ExtractionError::decode_error(
                &format!("Failed to deserialize token response: {err}"),
                Some("access_token"),
            )
        })?;

        Ok(AccessToken(res.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adf_domain::ErrorMeta;
    use mockito::{Matcher, Server};
    use std::net::TcpListener;

    const CREDENTIALS: ClientCredentials<'static> = ClientCredentials {
        tenant_id: "tenant-1",
        client_id: "client-1",
        client_secret: "secret-1",
    };

    fn form_matcher() -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
            Matcher::UrlEncoded("client_id".into(), "client-1".into()),
            Matcher::UrlEncoded("client_secret".into(), "secret-1".into()),
            Matcher::UrlEncoded(
                "scope".into(),
                "https://management.azure.com/.default".into(),
            ),
        ])
    }

    #[tokio::test]
    async fn test_get_token_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/tenant-1/oauth2/v2.0/token")
            .match_body(form_matcher())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token_type":"Bearer","expires_in":3599,"access_token":"tok"}"#)
            .expect(1)
            .create_async()
            .await;

        let fetcher = AzureTokenFetcher::new(&server.url(), Duration::from_secs(30));
        let token = fetcher.get_token(&CREDENTIALS).await.unwrap();

        mock.assert_async().await;
        assert_eq!(token.secret(), "tok");
        assert_eq!(token.bearer(), "Bearer tok");
        assert_eq!(format!("{token:?}"), "AccessToken(****)");
    }

    #[tokio::test]
    async fn test_get_token_rejected_credentials() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/tenant-1/oauth2/v2.0/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_client"}"#)
            .create_async()
            .await;

        let fetcher = AzureTokenFetcher::new(&server.url(), Duration::from_secs(30));
        let err = fetcher.get_token(&CREDENTIALS).await.unwrap_err();

        assert_eq!(
            err,
            ExtractionError::AuthenticationError {
                status: 401,
                body: r#"{"error":"invalid_client"}"#.to_string(),
                subtype: Some("token_endpoint".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_get_token_server_error_is_authentication_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/tenant-1/oauth2/v2.0/token")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let fetcher = AzureTokenFetcher::new(&server.url(), Duration::from_secs(30));
        let err = fetcher.get_token(&CREDENTIALS).await.unwrap_err();

        assert!(matches!(err, ExtractionError::AuthenticationError { .. }));
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_get_token_missing_access_token() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/tenant-1/oauth2/v2.0/token")
            .with_status(200)
            .with_body(r#"{"token_type":"Bearer"}"#)
            .create_async()
            .await;

        let fetcher = AzureTokenFetcher::new(&server.url(), Duration::from_secs(30));
        let err = fetcher.get_token(&CREDENTIALS).await.unwrap_err();

        assert!(matches!(err, ExtractionError::DecodeError { .. }));
    }

    #[tokio::test]
    async fn test_get_token_unreachable_authority() {
        let fetcher = AzureTokenFetcher::new("http://127.0.0.1:1", Duration::from_secs(30));
        let err = fetcher.get_token(&CREDENTIALS).await.unwrap_err();

        assert!(err.is_transient(), "{err}");
    }

    #[tokio::test]
    async fn test_get_token_silent_authority_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let fetcher = AzureTokenFetcher::new(&url, Duration::from_secs(1));

        let err = fetcher.get_token(&CREDENTIALS).await.unwrap_err();

        assert_eq!(
            err.key().to_string(),
            "err::extraction::transient_network_error::timeout"
        );
        drop(listener);
    }
}
