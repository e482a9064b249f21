//! HTTP gateway for the Syncplicity API.
//!
//! Every call goes through [`Gateway::execute`], which attaches the
//! credentials appropriate for the call, reads the whole response body and,
//! when the service rejects the bearer token, re-authenticates and resends the
//! request exactly once.
//!
//! Failures are logged and surface to callers only as an absent result.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::session::Session;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub const APP_KEY_HEADER: &str = "AppKey";
pub const SYNC_APP_TOKEN_HEADER: &str = "Sync-App-Token";
pub const SYNC_MACHINE_TOKEN_HEADER: &str = "Sync-Machine-Token";
pub const STORAGE_AUTHORIZATION_HEADER: &str = "Syncplicity-Storage-Authorization";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Which credentials a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    /// Token acquisition on behalf of the admin user.
    UserGrant,
    /// Token acquisition for the storage vault machine.
    MachineGrant,
    /// Regular call authorized by the user access token.
    UserBearer,
    /// Regular call authorized by the machine access token.
    MachineBearer,
}

impl Credentials {
    pub fn token_call(is_machine_auth_call: bool) -> Self {
        if is_machine_auth_call {
            Credentials::MachineGrant
        } else {
            Credentials::UserGrant
        }
    }

    pub fn bearer(use_machine_token: bool) -> Self {
        if use_machine_token {
            Credentials::MachineBearer
        } else {
            Credentials::UserBearer
        }
    }

    /// Token acquisition calls use Basic credentials and are never retried.
    pub fn is_token_call(self) -> bool {
        matches!(self, Credentials::UserGrant | Credentials::MachineGrant)
    }
}

/// Authorization headers for a call, in the order they are applied.
///
/// `bearer_token` is only used for bearer calls.
pub fn credential_headers(
    config: &Config,
    credentials: Credentials,
    bearer_token: &str,
) -> Vec<(&'static str, String)> {
    match credentials {
        Credentials::UserGrant | Credentials::MachineGrant => {
            let encoded = STANDARD.encode(format!("{}:{}", config.app_key, config.app_secret));
            let grant_header = if credentials == Credentials::MachineGrant {
                (SYNC_MACHINE_TOKEN_HEADER, config.machine_token.clone())
            } else {
                (SYNC_APP_TOKEN_HEADER, config.admin_token.clone())
            };
            vec![("Authorization", format!("Basic {}", encoded)), grant_header]
        }
        Credentials::UserBearer | Credentials::MachineBearer => vec![
            (APP_KEY_HEADER, config.app_key.clone()),
            ("Authorization", format!("Bearer {}", bearer_token)),
        ],
    }
}

/// A value in a multipart form.
#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File {
        data: Vec<u8>,
        filename: String,
        mime_type: String,
    },
    /// `Bearer <user access token>`, resolved when the request is sent.
    SessionKey,
}

/// Multipart form description that can be turned into a request body more
/// than once.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    fields: Vec<(String, FormValue)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormValue::Text(value.into())));
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        data: Vec<u8>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        self.fields.push((
            name.into(),
            FormValue::File {
                data,
                filename: filename.into(),
                mime_type: mime_type.into(),
            },
        ));
        self
    }

    pub fn session_key(mut self, name: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormValue::SessionKey));
        self
    }

    #[cfg(test)]
    pub(crate) fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    fn to_form(&self, access_token: &str) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = match value {
                FormValue::Text(text) => form.text(name.clone(), text.clone()),
                FormValue::SessionKey => form.text(name.clone(), format!("Bearer {}", access_token)),
                FormValue::File {
                    data,
                    filename,
                    mime_type,
                } => {
                    let part = Part::bytes(data.clone())
                        .file_name(filename.clone())
                        .mime_str(mime_type)?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Bytes { content_type: String, data: Vec<u8> },
    Multipart(MultipartForm),
}

/// Description of one API call. Kept around so the call can be replayed
/// after re-authentication.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: String,
    credentials: Credentials,
    extra_headers: Vec<(String, String)>,
    payload: Option<Payload>,
    suppress_errors: bool,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            credentials: Credentials::UserBearer,
            extra_headers: Vec::new(),
            payload: None,
            suppress_errors: false,
        }
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.extra_headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn body(mut self, content_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(Payload::Bytes {
            content_type: content_type.into(),
            data: data.into(),
        });
        self
    }

    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        let data = serde_json::to_vec(body)?;
        Ok(self.body(JSON_CONTENT_TYPE, data))
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.payload = Some(Payload::Multipart(form));
        self
    }

    /// Log failures at debug level instead of warning.
    pub fn suppress_errors(mut self, suppress: bool) -> Self {
        self.suppress_errors = suppress;
        self
    }
}

/// Gateway to the Syncplicity REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the session.
#[derive(Debug, Clone)]
pub struct Gateway {
    config: Arc<Config>,
    session: Session,
    http: Client,
}

impl Gateway {
    /// Create a gateway with a fresh, unauthenticated session.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_session(config, Session::new())
    }

    pub fn with_session(config: Config, session: Session) -> Result<Self> {
        let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            config: Arc::new(config),
            session,
            http,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// GET `url` and deserialize the response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        extra_headers: &[(&str, &str)],
        suppress_errors: bool,
        use_machine_token: bool,
    ) -> Option<T> {
        let request = ApiRequest::new(Method::GET, url)
            .credentials(Credentials::bearer(use_machine_token))
            .headers(extra_headers.iter().copied())
            .suppress_errors(suppress_errors);
        self.fetch(&request).await
    }

    /// POST `body` to `url` and deserialize the response.
    #[allow(clippy::too_many_arguments)]
    pub async fn post<T: DeserializeOwned>(
        &self,
        is_auth_call: bool,
        is_machine_auth_call: bool,
        use_machine_token: bool,
        url: &str,
        content_type: &str,
        body: impl Into<Vec<u8>>,
        extra_headers: &[(&str, &str)],
    ) -> Option<T> {
        let credentials = if is_auth_call {
            Credentials::token_call(is_machine_auth_call)
        } else {
            Credentials::bearer(use_machine_token)
        };
        let request = ApiRequest::new(Method::POST, url)
            .credentials(credentials)
            .headers(extra_headers.iter().copied())
            .body(content_type, body);
        self.fetch(&request).await
    }

    /// POST `entity` as JSON to `url` with the user token.
    pub async fn post_json<B, T>(&self, url: &str, entity: &B) -> Option<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.json_request(Method::POST, url, entity)?;
        self.fetch(&request).await
    }

    /// PUT `entity` as JSON to `url` with the user token.
    pub async fn put<B, T>(&self, url: &str, entity: &B) -> Option<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.json_request(Method::PUT, url, entity)?;
        self.fetch(&request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        self.fetch(&ApiRequest::new(Method::DELETE, url)).await
    }

    /// Execute `request` and deserialize a non-empty response as JSON.
    pub async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> Option<T> {
        let body = self.execute(request).await?;
        parse_body(request, &body)
    }

    /// Execute `request` and return the raw response as text.
    pub async fn fetch_text(&self, request: &ApiRequest) -> Option<String> {
        let body = self.execute(request).await?;
        Some(String::from_utf8_lossy(&body).into_owned())
    }

    /// Execute `request`, re-authenticating and retrying once if the token
    /// was rejected. Returns the response body, or `None` when the body is
    /// empty or the call failed.
    pub async fn execute(&self, request: &ApiRequest) -> Option<Vec<u8>> {
        let err = match self.send_once(request).await {
            Ok(body) => return body,
            Err(err) => err,
        };
        self.report(request, &err);

        if request.credentials.is_token_call() || !err.should_refresh_token() {
            return None;
        }

        info!("Trying to re-authenticate using the same credentials.");
        self.refresh_token().await;

        if !self.session.is_authenticated().await {
            warn!(
                "The OAuth authentication has failed, {} request can't be performed.",
                request.method
            );
            return None;
        }
        if request.credentials == Credentials::MachineBearer
            && self.session.machine_access_token().await.is_empty()
        {
            warn!(
                "The machine token authentication has failed, {} request can't be performed.",
                request.method
            );
            return None;
        }

        info!(
            "Authentication was successful. Trying to send {} request again for the last time.",
            request.method
        );

        match self.send_once(request).await {
            Ok(body) => body,
            Err(err) => {
                self.report(request, &err);
                None
            }
        }
    }

    /// Send `request` once, without any retry.
    pub(crate) async fn send_once(&self, request: &ApiRequest) -> Result<Option<Vec<u8>>> {
        debug!("Creating {} request to {}", request.method, request.url);

        let response = self.build(request).await?.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if !status.is_success() {
            let message = String::from_utf8_lossy(&body).trim().to_string();
            if requires_new_token(status, &message) {
                return Err(ApiError::Unauthorized {
                    status: status.as_u16(),
                    message,
                });
            }
            return Err(ApiError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            debug!("Received response is empty.");
            return Ok(None);
        }

        Ok(Some(body))
    }

    async fn build(&self, request: &ApiRequest) -> Result<RequestBuilder> {
        let bearer_token = match request.credentials {
            Credentials::MachineBearer => self.session.machine_access_token().await,
            Credentials::UserBearer => self.session.access_token().await,
            Credentials::UserGrant | Credentials::MachineGrant => String::new(),
        };

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        for (name, value) in &request.extra_headers {
            insert_header(&mut headers, name, value)?;
        }
        for (name, value) in credential_headers(&self.config, request.credentials, &bearer_token) {
            insert_header(&mut headers, name, &value)?;
        }

        let mut builder = self.http.request(request.method.clone(), &request.url);

        match &request.payload {
            Some(Payload::Bytes { content_type, data }) => {
                insert_header(&mut headers, CONTENT_TYPE.as_str(), content_type)?;
                builder = builder.body(data.clone());
            }
            Some(Payload::Multipart(form)) => {
                let access_token = self.session.access_token().await;
                builder = builder.multipart(form.to_form(&access_token)?);
            }
            None => {}
        }

        Ok(builder.headers(headers))
    }

    fn json_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        entity: &B,
    ) -> Option<ApiRequest> {
        match ApiRequest::new(method, url).json(entity) {
            Ok(request) => Some(request),
            Err(err) => {
                warn!(url, error = %err, "Failed to serialize request body");
                None
            }
        }
    }

    fn report(&self, request: &ApiRequest, err: &ApiError) {
        if request.suppress_errors {
            debug!(url = %request.url, error = %err, "Request failed");
        } else {
            warn!(url = %request.url, error = %err, "Error occurs during request");
        }
    }
}

/// 401, or a bare 403 from the gateway itself, means the token was rejected.
/// A 403 carrying a service error payload is a permission problem a new
/// token will not fix.
fn requires_new_token(status: StatusCode, message: &str) -> bool {
    status == StatusCode::UNAUTHORIZED
        || (status == StatusCode::FORBIDDEN
            && (message.is_empty() || message.eq_ignore_ascii_case("forbidden")))
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ApiError::InvalidHeader(name.to_string()))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| ApiError::InvalidHeader(name.as_str().to_string()))?;
    headers.insert(name, value);
    Ok(())
}

fn parse_body<T: DeserializeOwned>(request: &ApiRequest, body: &[u8]) -> Option<T> {
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                url = %request.url,
                error = %err,
                "Could not parse the response as JSON"
            );
            None
        }
    }
}
