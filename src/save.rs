//! Writing thumbnails to disk.

use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::client::types::{Encoding, Screenshot};
use crate::error::ThumbalizrResult;

/// Filename derived from the host of `url`, e.g. `www.google.com.jpg`.
/// Returns `None` when the URL does not parse or has no host.
pub fn default_filename(url: &str, encoding: Encoding) -> Option<String> {
    let host = Url::parse(url).ok()?.host_str()?.to_string();
    if host.is_empty() {
        return None;
    }
    Some(format!("{}.{}", sanitize_name(&host), encoding.extension()))
}

/// Sanitize a name for use in filenames
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect()
}

impl Screenshot {
    /// Save the thumbnail.
    ///
    /// - no `path`: `<host>.<ext>` in the current directory
    /// - `path` is an existing directory: `<path>/<host>.<ext>`
    /// - otherwise `path` is the file to write
    ///
    /// Returns `Ok(None)` when there is no image, or when a filename is
    /// needed but cannot be derived from the screenshot URL.
    pub fn save(&self, path: Option<&Path>) -> ThumbalizrResult<Option<PathBuf>> {
        let Some(thumbnail) = self.thumbnail() else {
            return Ok(None);
        };

        let derived = || default_filename(self.url(), thumbnail.encoding());

        let target = match path {
            None => match derived() {
                Some(name) => PathBuf::from(name),
                None => return Ok(None),
            },
            Some(dir) if dir.is_dir() => match derived() {
                Some(name) => dir.join(name),
                None => return Ok(None),
            },
            Some(file) => file.to_path_buf(),
        };

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, thumbnail.bytes())?;

        Ok(Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::{ScreenshotOptions, Status, Thumbnail};

    fn finished(url: &str, encoding: Encoding) -> Screenshot {
        let mut shot = Screenshot::pending(&ScreenshotOptions::new(url).unwrap());
        shot.status = Status::Finished;
        shot.encoding = encoding;
        shot.thumbnail = Some(Thumbnail::new(vec![1, 2, 3], encoding));
        shot
    }

    #[test]
    fn test_default_filename() {
        assert_eq!(
            default_filename("http://www.google.com/search?q=1", Encoding::Jpeg),
            Some("www.google.com.jpg".to_string())
        );
        assert_eq!(
            default_filename("https://example.org:8443/", Encoding::Png),
            Some("example.org.png".to_string())
        );
        assert_eq!(default_filename("", Encoding::Jpeg), None);
        assert_eq!(default_filename("file:///tmp/x", Encoding::Jpeg), None);
    }

    #[test]
    fn test_save_without_thumbnail() {
        let shot = Screenshot::pending(&ScreenshotOptions::new("http://a.com/").unwrap());
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(shot.save(Some(dir.path())).unwrap(), None);
    }

    #[test]
    fn test_save_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let shot = finished("http://www.google.com/", Encoding::Png);

        let path = shot.save(Some(dir.path())).unwrap().unwrap();
        assert_eq!(path, dir.path().join("www.google.com.png"));
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_save_to_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("shot.bin");
        let shot = finished("http://www.google.com/", Encoding::Jpeg);

        let path = shot.save(Some(&target)).unwrap().unwrap();
        assert_eq!(path, target);
        assert!(target.exists());
    }

    #[test]
    fn test_save_hostless_url_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let shot = finished("urn:isbn:0451450523", Encoding::Jpeg);
        assert_eq!(shot.save(Some(dir.path())).unwrap(), None);
    }
}
