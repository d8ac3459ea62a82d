// Core types shared by the request builder, the transport and callers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::error::{ThumbalizrError, ThumbalizrResult};

/// Image format of a thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Jpeg,
    Png,
}

impl Encoding {
    /// Value of the `encoding` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            Encoding::Jpeg => "jpg",
            Encoding::Png => "png",
        }
    }

    /// File extension used when saving
    pub fn extension(&self) -> &'static str {
        self.as_param()
    }

    /// Derive the encoding from a `Content-Type` header value.
    /// Anything that is not JPEG is treated as PNG.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.contains("/jpeg") {
            Encoding::Jpeg
        } else {
            Encoding::Png
        }
    }
}

/// What part of the page is captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Visible viewport only
    #[default]
    Screen,
    /// Entire scrollable page
    Page,
}

impl Mode {
    /// Value of the `mode` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            Mode::Screen => "screen",
            Mode::Page => "page",
        }
    }
}

/// State of a screenshot job on the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Queued or rendering; poll again later
    #[default]
    Processing,
    Finished,
    Error,
}

impl Status {
    /// Map an `X-Thumbalizr-Status` header value. Unknown values yield `None`.
    pub fn from_header(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "queued" => Some(Status::Processing),
            "ok" => Some(Status::Finished),
            "failed" => Some(Status::Error),
            _ => None,
        }
    }
}

/// Rendering options for one screenshot request.
///
/// Only the target URL is required. Numeric setters treat `0` as "not set",
/// so a zero is never sent to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotOptions {
    url: String,
    width: Option<u32>,
    quality: Option<u32>,
    encoding: Encoding,
    mode: Mode,
    generate: bool,
    delay: Option<u32>,
    bwidth: Option<u32>,
    bheight: Option<u32>,
}

impl ScreenshotOptions {
    /// Create options for `url` with every other field at its default
    pub fn new(url: impl Into<String>) -> ThumbalizrResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(ThumbalizrError::InvalidOptions(
                "target URL must not be empty".to_string(),
            ));
        }

        Ok(Self {
            url,
            width: None,
            quality: None,
            encoding: Encoding::default(),
            mode: Mode::default(),
            generate: false,
            delay: None,
            bwidth: None,
            bheight: None,
        })
    }

    /// Thumbnail width in pixels
    pub fn width(mut self, width: u32) -> Self {
        self.width = positive(width);
        self
    }

    /// JPEG quality, clamped to 100
    pub fn quality(mut self, quality: u32) -> Self {
        self.quality = positive(quality.min(100));
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Force the service to render a fresh screenshot
    pub fn generate(mut self, generate: bool) -> Self {
        self.generate = generate;
        self
    }

    /// Delay after the page load event (milliseconds)
    pub fn delay(mut self, delay: u32) -> Self {
        self.delay = positive(delay);
        self
    }

    /// Browser viewport width
    pub fn browser_width(mut self, bwidth: u32) -> Self {
        self.bwidth = positive(bwidth);
        self
    }

    /// Browser viewport height
    pub fn browser_height(mut self, bheight: u32) -> Self {
        self.bheight = positive(bheight);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requested_encoding(&self) -> Encoding {
        self.encoding
    }

    /// Query parameters in wire order, absent values omitted.
    ///
    /// `bheight` is only sent when a delay is set as well; the service has
    /// always received it under that condition.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("url", self.url.clone())];

        if let Some(width) = self.width {
            pairs.push(("width", width.to_string()));
        }
        if let Some(quality) = self.quality {
            pairs.push(("quality", quality.to_string()));
        }

        pairs.push(("encoding", self.encoding.as_param().to_string()));
        pairs.push(("mode", self.mode.as_param().to_string()));
        pairs.push(("generate", if self.generate { "1" } else { "0" }.to_string()));

        if let Some(delay) = self.delay {
            pairs.push(("delay", delay.to_string()));
        }
        if let Some(bwidth) = self.bwidth {
            pairs.push(("bwidth", bwidth.to_string()));
        }
        if let (Some(_), Some(bheight)) = (self.delay, self.bheight) {
            pairs.push(("bheight", bheight.to_string()));
        }

        pairs
    }
}

fn positive(value: u32) -> Option<u32> {
    (value > 0).then_some(value)
}

/// Image bytes returned by the API, tagged with their format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    bytes: Vec<u8>,
    encoding: Encoding,
}

impl Thumbnail {
    pub fn new(bytes: Vec<u8>, encoding: Encoding) -> Self {
        Self { bytes, encoding }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Width and height read from the image header; pixels are not decoded
    pub fn dimensions(&self) -> ThumbalizrResult<(u32, u32)> {
        let reader = image::io::Reader::new(Cursor::new(&self.bytes)).with_guessed_format()?;
        Ok(reader.into_dimensions()?)
    }

    pub fn width(&self) -> ThumbalizrResult<u32> {
        self.dimensions().map(|(w, _)| w)
    }

    pub fn height(&self) -> ThumbalizrResult<u32> {
        self.dimensions().map(|(_, h)| h)
    }
}

/// Outcome of one screenshot request
#[derive(Debug, Clone, PartialEq)]
pub struct Screenshot {
    pub(crate) status: Status,
    pub(crate) url: String,
    pub(crate) encoding: Encoding,
    pub(crate) error: String,
    pub(crate) generated: Option<DateTime<Utc>>,
    pub(crate) thumbnail: Option<Thumbnail>,
}

impl Screenshot {
    /// The state before any response has been interpreted
    pub fn pending(options: &ScreenshotOptions) -> Self {
        Self {
            status: Status::Processing,
            url: options.url().to_string(),
            encoding: options.requested_encoding(),
            error: String::new(),
            generated: None,
            thumbnail: None,
        }
    }

    /// Pending screenshot for a target that never became a valid request
    pub(crate) fn unrequested(url: &str) -> Self {
        Self {
            status: Status::Processing,
            url: url.to_string(),
            encoding: Encoding::default(),
            error: String::new(),
            generated: None,
            thumbnail: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }

    pub fn is_processing(&self) -> bool {
        self.status == Status::Processing
    }

    /// Canonical URL reported by the service (or the requested one)
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Actual encoding of the returned image
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Error reported by the service, empty unless status is `Error`
    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn generated(&self) -> Option<DateTime<Utc>> {
        self.generated
    }

    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }

    /// Serializable view used for JSON output
    pub fn summary(&self) -> ScreenshotSummary {
        let dimensions = self.thumbnail.as_ref().and_then(|t| t.dimensions().ok());
        ScreenshotSummary {
            status: self.status,
            url: self.url.clone(),
            encoding: self.encoding,
            error: (!self.error.is_empty()).then(|| self.error.clone()),
            generated: self.generated,
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
            size: self.thumbnail.as_ref().map(|t| t.bytes().len()),
            saved_to: None,
        }
    }
}

/// JSON-friendly summary of a [`Screenshot`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotSummary {
    pub status: Status,
    pub url: String,
    pub encoding: Encoding,
    pub error: Option<String>,
    pub generated: Option<DateTime<Utc>>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Image size in bytes
    pub size: Option<usize>,
    pub saved_to: Option<std::path::PathBuf>,
}
