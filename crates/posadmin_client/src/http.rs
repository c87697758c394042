use crate::models::ApiResult;
use crate::Error;
use log::warn;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

const BASE_SEGMENTS: [&str; 2] = ["api", "identity"];
const USER_ID_HEADER: &str = "x-user-id";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    base_url: Url,
    client: Client,
}

impl HttpClient {
    /// `user_id`, when given, is sent as `X-User-Id` on every request.
    pub(crate) fn new(base_url: impl Into<String>, user_id: Option<&str>) -> Result<Self, Error> {
        let base_url = Url::parse(&base_url.into()).map_err(|err| Error::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(base_url.to_string()));
        }
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);
        if let Some(user_id) = user_id {
            let value = HeaderValue::from_str(user_id)
                .map_err(|err| Error::InvalidUserId(err.to_string()))?;
            let mut headers = HeaderMap::new();
            headers.insert(USER_ID_HEADER, value);
            builder = builder.default_headers(headers);
        }
        Ok(Self {
            base_url,
            client: builder.build()?,
        })
    }

    /// `/api/identity` followed by `segments`, each percent-encoded as one
    /// path segment.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(BASE_SEGMENTS)
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn get(&self, segments: &[&str]) -> Result<RequestBuilder, Error> {
        Ok(self.client.get(self.url(segments)?))
    }

    pub(crate) fn post(&self, segments: &[&str]) -> Result<RequestBuilder, Error> {
        Ok(self.client.post(self.url(segments)?))
    }

    pub(crate) fn put(&self, segments: &[&str]) -> Result<RequestBuilder, Error> {
        Ok(self.client.put(self.url(segments)?))
    }

    pub(crate) fn delete(&self, segments: &[&str]) -> Result<RequestBuilder, Error> {
        Ok(self.client.delete(self.url(segments)?))
    }

    /// Sends `request` and decodes a 2xx JSON body.
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            warn!(
                "event=http_request module=client status=error http_status={}",
                status.as_u16()
            );
            return Err(Error::Server {
                status: status.as_u16(),
                message: failure_message(&body),
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Joined envelope messages, falling back to the raw body text.
fn failure_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ApiResult<serde_json::Value>>(body) {
        Ok(envelope) if !envelope.messages.is_empty() => envelope.messages.join(" "),
        _ => String::from_utf8_lossy(body).trim().to_string(),
    }
}
