use adf_domain::ExtractionError;
use azure_token_fetcher::AccessToken;
use http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const API_VERSION: &str = "2018-06-01";

/// Authenticated session against the management API. The bearer header is
/// fixed when the session is built and reused by every call.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ManagementClient {
    pub fn new(
        base_url: &str,
        token: &AccessToken,
        timeout: Duration,
    ) -> Result<Self, ExtractionError> {
        let base_url = Url::parse(base_url).map_err(|err| {
            ExtractionError::configuration_error(
                &format!("Invalid management URL {base_url}: {err}"),
                Some("management_url"),
            )
        })?;

        let mut authorization = HeaderValue::from_str(&token.bearer()).map_err(|err| {
            ExtractionError::decode_error(
                &format!("Access token is not a valid header value: {err}"),
                Some("access_token"),
            )
        })?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Issues a GET for `path` relative to the management base URL, always
    /// pinned to [`API_VERSION`], and decodes the JSON body. An `api-version`
    /// entry in `params` is dropped.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&[(&str, &str)]>,
    ) -> Result<T, ExtractionError> {
        let url = self.base_url.join(path).map_err(|err| {
            ExtractionError::configuration_error(
                &format!("Invalid resource path {path}: {err}"),
                Some("resource_path"),
            )
        })?;

        debug!(%url, "Calling management API");

        let mut request = self
            .client
            .get(url)
            .query(&[("api-version", API_VERSION)])
            .timeout(self.timeout);

        if let Some(params) = params {
            let extra: Vec<(&str, &str)> = params
                .iter()
                .copied()
                .filter(|(key, _)| *key != "api-version")
                .collect();
            request = request.query(&extra);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ExtractionError::upstream_api_error(
                status,
                &body,
                Some("management_api"),
            ));
        }

        serde_json::from_str::<T>(&body).map_err(|err| {
            ExtractionError::decode_error(
                &format!("Failed to deserialize response: {err}"),
                Some("management_api"),
            )
        })
    }
}
