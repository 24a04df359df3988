use crate::error::ApiError;
use crate::media::MediaFile;
use crate::models::ApiErrorBody;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "post" => Ok(Method::Post),
            "put" => Ok(Method::Put),
            "delete" => Ok(Method::Delete),
            _ => Err(anyhow::anyhow!("unknown method: {}", s)),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        write!(f, "{s}")
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Multipart(MediaFile),
}

/// A backend call, independent of credentials. Replaying a request means sending the same value
/// again; nothing about it is mutated between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Relative to the API base URL, with a leading slash
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
}

impl ApiRequest {
    pub fn new(method: Method, path: &str) -> Self {
        ApiRequest {
            method,
            path: path.to_string(),
            query: vec![],
            body: Body::Empty,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, query: Vec<(String, String)>) -> Self {
        self.query.extend(query);
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, file: MediaFile) -> Self {
        self.body = Body::Multipart(file);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        ApiResponse { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Untyped body; `None` for an empty response (eg, 204)
    pub fn json_value(&self) -> Result<Option<Value>, ApiError> {
        if self.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.json()?))
        }
    }

    /// Passes success through, converts any other status into [`ApiError::Http`]
    pub fn into_result(self) -> Result<ApiResponse, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.into_error())
        }
    }

    /// Backend message from the `{"message": ...}` envelope if there is one, otherwise the
    /// canonical reason phrase for the status.
    pub fn into_error(self) -> ApiError {
        let envelope: Option<ApiErrorBody> = serde_json::from_slice(&self.body).ok();
        let (message, code) = match envelope {
            Some(body) => (body.message, body.code),
            None => (
                reqwest::StatusCode::from_u16(self.status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("unknown")
                    .to_string(),
                None,
            ),
        };
        ApiError::Http {
            status: self.status,
            message,
            code,
        }
    }
}

/// One HTTP round trip. Implementations attach `bearer` (if any) as the authorization header and
/// must not retry on their own.
pub trait Transport: Send + Sync {
    fn send(&self, req: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::blocking::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ApiError::transport)?;

        Ok(ReqwestTransport {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_headers(bearer: Option<&str>) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = bearer {
            let mut auth_value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| {
                    ApiError::InvalidRequest("access token is not a valid header value".into())
                })?;
            auth_value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, auth_value);
        };
        Ok(headers)
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, req: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .http_client
            .request(req.method.into(), format!("{}{}", self.base_url, req.path))
            .headers(Self::auth_headers(bearer)?);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        builder = match &req.body {
            Body::Empty => builder,
            Body::Json(val) => builder.json(val),
            Body::Multipart(file) => builder.multipart(file.to_form()?),
        };
        let res = builder.send().map_err(ApiError::transport)?;
        let status = res.status().as_u16();
        let body = res.bytes().map_err(ApiError::transport)?.to_vec();
        Ok(ApiResponse { status, body })
    }
}

#[test]
fn test_method() {
    assert_eq!(Method::from_str("get").unwrap(), Method::Get);
    assert_eq!(Method::from_str("DELETE").unwrap(), Method::Delete);
    assert!(Method::from_str("patch").is_err());
    assert_eq!(Method::Put.to_string(), "PUT");
}

#[test]
fn test_response_errors() {
    let res = ApiResponse::new(
        422,
        br#"{"message": "email already registered", "code": "EMAIL_TAKEN"}"#.to_vec(),
    );
    match res.into_result() {
        Err(ApiError::Http {
            status,
            message,
            code,
        }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "email already registered");
            assert_eq!(code.as_deref(), Some("EMAIL_TAKEN"));
        }
        other => panic!("unexpected: {other:?}"),
    }

    let res = ApiResponse::new(502, b"<html>bad gateway</html>".to_vec());
    assert_eq!(res.into_error().to_string(), "HTTP 502: Bad Gateway");

    let res = ApiResponse::new(204, vec![]);
    assert!(res.is_success());
    assert_eq!(res.json_value().unwrap(), None);
}

#[test]
fn test_auth_headers() {
    let headers = ReqwestTransport::auth_headers(Some("abc.def")).unwrap();
    let value = headers.get(header::AUTHORIZATION).unwrap();
    assert_eq!(value.to_str().unwrap(), "Bearer abc.def");
    assert!(value.is_sensitive());

    assert!(ReqwestTransport::auth_headers(None).unwrap().is_empty());
    assert!(ReqwestTransport::auth_headers(Some("bad\ntoken")).is_err());
}
