//! Request URL construction.

use url::Url;

use super::types::ScreenshotOptions;
use crate::error::{ThumbalizrError, ThumbalizrResult};

/// Build the GET URL for a screenshot request.
///
/// The query string of `base_url` is replaced by the form-encoded options,
/// followed by `key` when `api_key` is not empty.
pub fn build_url(base_url: &str, api_key: &str, options: &ScreenshotOptions) -> ThumbalizrResult<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ThumbalizrError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;

    if url.cannot_be_a_base() {
        return Err(ThumbalizrError::InvalidBaseUrl(base_url.to_string()));
    }

    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        for (name, value) in options.query_pairs() {
            query.append_pair(name, &value);
        }
        if !api_key.is_empty() {
            query.append_pair("key", api_key);
        }
    }

    Ok(url)
}
