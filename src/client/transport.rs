//! Blocking HTTP transport and response interpretation.
//!
//! One call to [`Client::screenshot_with`] performs exactly one GET against
//! the API. Failures never reach the caller: they are logged and the call
//! returns the best [`Screenshot`] it could assemble.

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::blocking::Response;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use std::time::Duration;
use url::Url;

use super::request::build_url;
use super::types::{Encoding, Screenshot, ScreenshotOptions, Status, Thumbnail};
use crate::config::{self, MAX_REDIRECTS};
use crate::error::{ThumbalizrError, ThumbalizrResult};

pub const HEADER_URL: &str = "X-Thumbalizr-URL";
pub const HEADER_STATUS: &str = "X-Thumbalizr-Status";
pub const HEADER_GENERATED: &str = "X-Thumbalizr-Generated";
pub const HEADER_ERROR: &str = "X-Thumbalizr-Error";

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("thumbalizr-rs ", env!("CARGO_PKG_VERSION"));

/// Client for the Thumbalizr API
#[derive(Debug, Clone)]
pub struct Client {
    key: String,
    debug: bool,
    base_url: String,
    http: reqwest::blocking::Client,
}

/// Builder for [`Client`], seeded from [`config::get`]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    key: String,
    debug: bool,
    base_url: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        let cfg = config::get();
        Self {
            key: cfg.api.key.clone(),
            debug: cfg.api.debug,
            base_url: cfg.api.base_url.clone(),
            timeout: cfg.api.timeout(),
            connect_timeout: cfg.api.connect_timeout(),
        }
    }
}

impl ClientBuilder {
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Log constructed URLs, raw status headers and swallowed errors
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Total request timeout; `None` waits indefinitely
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> ThumbalizrResult<Client> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()?;

        Ok(Client {
            key: self.key,
            debug: self.debug,
            base_url: self.base_url,
            http,
        })
    }
}

impl Client {
    /// Client with the given key and every other setting from the environment
    pub fn new(key: impl Into<String>) -> ThumbalizrResult<Self> {
        Self::builder().key(key).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request a screenshot of `url` with default options
    pub fn screenshot(&self, url: &str) -> Screenshot {
        match ScreenshotOptions::new(url) {
            Ok(options) => self.screenshot_with(&options),
            Err(e) => {
                warn!("{}", e);
                Screenshot::unrequested(url)
            }
        }
    }

    /// Request a screenshot. Never fails: errors are logged and the returned
    /// screenshot keeps whatever state was established before the failure.
    pub fn screenshot_with(&self, options: &ScreenshotOptions) -> Screenshot {
        self.fetch(options).unwrap_or_else(|e| {
            warn!("{}", e);
            Screenshot::pending(options)
        })
    }

    /// Like [`Client::screenshot_with`] but reports the failures that prevent
    /// any interpretation (unusable base URL, no response, unrecognized HTTP
    /// status). Errors met while reading headers or body still produce a
    /// partial `Ok` result.
    pub fn fetch(&self, options: &ScreenshotOptions) -> ThumbalizrResult<Screenshot> {
        let url = build_url(&self.base_url, &self.key, options)?;
        if self.debug {
            debug!("{}", url);
        }

        let response = self.send(url)?;

        let mut screenshot = Screenshot::pending(options);
        if let Err(e) = interpret(response, &mut screenshot, self.debug) {
            if self.debug {
                debug!("{}", e);
            }
        }

        Ok(screenshot)
    }

    fn send(&self, url: Url) -> ThumbalizrResult<Response> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| ThumbalizrError::TransportUnavailable(e.without_url().to_string()))?;

        match classify(response.status(), &self.base_url) {
            Ok(()) => Ok(response),
            Err(e) if e.is_interpretable() => {
                warn!("{}", e);
                Ok(response)
            }
            Err(e) => Err(e),
        }
    }
}

/// Map an HTTP status onto the error taxonomy
fn classify(status: StatusCode, url: &str) -> ThumbalizrResult<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(ThumbalizrError::NotFound(url.to_string())),
        StatusCode::FORBIDDEN => Err(ThumbalizrError::Forbidden(url.to_string())),
        StatusCode::UNAUTHORIZED => Err(ThumbalizrError::Unauthorized(url.to_string())),
        s => Err(ThumbalizrError::UnrecognizedServerError {
            status: s.as_u16(),
            url: url.to_string(),
        }),
    }
}

/// Fill `screenshot` from the response. The response is consumed and
/// released on every path; fields already set are kept on error.
fn interpret(response: Response, screenshot: &mut Screenshot, debug: bool) -> ThumbalizrResult<()> {
    interpret_headers(response.headers(), screenshot, debug)?;

    let body = response
        .bytes()
        .map_err(|e| ThumbalizrError::ResponseParsingFailure(e.without_url().to_string()))?;

    if !body.is_empty() {
        screenshot.thumbnail = Some(Thumbnail::new(body.to_vec(), screenshot.encoding));
    }

    Ok(())
}

fn interpret_headers(headers: &HeaderMap, screenshot: &mut Screenshot, debug: bool) -> ThumbalizrResult<()> {
    if let Some(url) = header(headers, HEADER_URL) {
        screenshot.url = url;
    }

    let content_type = header(headers, CONTENT_TYPE.as_str()).unwrap_or_default();
    screenshot.encoding = Encoding::from_content_type(&content_type);

    let status = header(headers, HEADER_STATUS).unwrap_or_default();
    if debug {
        debug!("{}: {}", HEADER_STATUS, status);
    }

    match Status::from_header(&status) {
        Some(Status::Finished) => {
            screenshot.status = Status::Finished;
            let generated = header(headers, HEADER_GENERATED).unwrap_or_default();
            screenshot.generated = Some(parse_generated(&generated)?);
        }
        Some(Status::Error) => {
            screenshot.status = Status::Error;
            screenshot.error = header(headers, HEADER_ERROR).unwrap_or_default();
        }
        Some(Status::Processing) => screenshot.status = Status::Processing,
        None => {}
    }

    Ok(())
}

/// Header value as text. UTF-8 is taken as is, anything else is read as
/// ISO-8859-1, so a value is never rejected.
fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).map(|value| {
        let bytes = value.as_bytes();
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    })
}

/// Parse the `X-Thumbalizr-Generated` timestamp.
///
/// Accepts RFC 3339, RFC 2822 and `YYYY-MM-DD HH:MM:SS` (taken as UTC).
pub fn parse_generated(value: &str) -> ThumbalizrResult<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            ThumbalizrError::ResponseParsingFailure(format!(
                "invalid {} '{}': {}",
                HEADER_GENERATED, value, e
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::header::{HeaderName, HeaderValue};

    fn set(headers: &mut HeaderMap, name: &str, value: &'static str) {
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_static(value),
        );
    }

    fn pending() -> Screenshot {
        Screenshot::pending(&ScreenshotOptions::new("http://a.com/").unwrap())
    }

    #[test]
    fn test_parse_generated_formats() {
        let expected = Utc.with_ymd_and_hms(2017, 3, 23, 14, 5, 9).unwrap();
        assert_eq!(parse_generated("2017-03-23T14:05:09Z").unwrap(), expected);
        assert_eq!(parse_generated("Thu, 23 Mar 2017 14:05:09 +0000").unwrap(), expected);
        assert_eq!(parse_generated("2017-03-23 14:05:09").unwrap(), expected);
        assert!(parse_generated("yesterday").is_err());
        assert!(parse_generated("").is_err());
    }

    #[test]
    fn test_classify() {
        assert!(classify(StatusCode::OK, "u").is_ok());
        assert!(matches!(classify(StatusCode::NOT_FOUND, "u"), Err(ThumbalizrError::NotFound(_))));
        assert!(matches!(classify(StatusCode::FORBIDDEN, "u"), Err(ThumbalizrError::Forbidden(_))));
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, "u"),
            Err(ThumbalizrError::Unauthorized(_))
        ));
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, "u"),
            Err(ThumbalizrError::UnrecognizedServerError { status: 500, .. })
        ));
    }

    #[test]
    fn test_headers_finished() {
        let mut headers = HeaderMap::new();
        set(&mut headers, HEADER_URL, "http://a.com/canonical");
        set(&mut headers, CONTENT_TYPE.as_str(), "image/jpeg");
        set(&mut headers, HEADER_STATUS, "OK");
        set(&mut headers, HEADER_GENERATED, "2020-01-02 03:04:05");

        let mut shot = pending();
        interpret_headers(&headers, &mut shot, true).unwrap();
        assert_eq!(shot.status(), Status::Finished);
        assert_eq!(shot.url(), "http://a.com/canonical");
        assert_eq!(shot.encoding(), Encoding::Jpeg);
        assert_eq!(
            shot.generated(),
            Some(Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap())
        );
    }

    #[test]
    fn test_headers_bad_timestamp_keeps_partial_state() {
        let mut headers = HeaderMap::new();
        set(&mut headers, CONTENT_TYPE.as_str(), "image/png");
        set(&mut headers, HEADER_STATUS, "ok");
        set(&mut headers, HEADER_GENERATED, "not a date");

        let mut shot = pending();
        let err = interpret_headers(&headers, &mut shot, false).unwrap_err();
        assert!(matches!(err, ThumbalizrError::ResponseParsingFailure(_)));
        assert_eq!(shot.status(), Status::Finished);
        assert_eq!(shot.encoding(), Encoding::Png);
        assert!(shot.generated().is_none());
    }

    #[test]
    fn test_headers_non_ascii_error_and_url() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-thumbalizr-url"),
            HeaderValue::from_bytes("http://exemple.fr/café".as_bytes()).unwrap(),
        );
        set(&mut headers, HEADER_STATUS, "failed");
        headers.insert(
            HeaderName::from_static("x-thumbalizr-error"),
            HeaderValue::from_bytes("Page introuvable: délai dépassé".as_bytes()).unwrap(),
        );

        let mut shot = pending();
        interpret_headers(&headers, &mut shot, true).unwrap();
        assert_eq!(shot.status(), Status::Error);
        assert_eq!(shot.url(), "http://exemple.fr/café");
        assert_eq!(shot.error(), "Page introuvable: délai dépassé");
    }

    #[test]
    fn test_headers_latin1_error() {
        let mut headers = HeaderMap::new();
        set(&mut headers, HEADER_STATUS, "FAILED");
        headers.insert(
            HeaderName::from_static("x-thumbalizr-error"),
            HeaderValue::from_bytes(b"d\xe9lai d\xe9pass\xe9").unwrap(),
        );

        let mut shot = pending();
        interpret_headers(&headers, &mut shot, false).unwrap();
        assert_eq!(shot.status(), Status::Error);
        assert_eq!(shot.error(), "délai dépassé");
    }

    #[test]
    fn test_headers_unknown_status_keeps_default() {
        let mut headers = HeaderMap::new();
        set(&mut headers, HEADER_STATUS, "rendering");

        let mut shot = pending();
        interpret_headers(&headers, &mut shot, false).unwrap();
        assert_eq!(shot.status(), Status::Processing);
        assert_eq!(shot.url(), "http://a.com/");
        assert_eq!(shot.encoding(), Encoding::Png);
    }

    #[test]
    fn test_builder_overrides() {
        let client = Client::builder()
            .key("abc")
            .debug(true)
            .base_url("http://localhost:1/")
            .timeout(None)
            .build()
            .unwrap();
        assert_eq!(client.key(), "abc");
        assert!(client.is_debug());
        assert_eq!(client.base_url(), "http://localhost:1/");
    }

    #[test]
    fn test_empty_target_url_returns_default() {
        let client = Client::builder().base_url("http://localhost:1/").build().unwrap();
        let shot = client.screenshot("");
        assert_eq!(shot.status(), Status::Processing);
        assert!(shot.thumbnail().is_none());
        assert!(shot.error().is_empty());
    }
}
