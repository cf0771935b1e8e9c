use std::fs;
use std::path::PathBuf;

use url::Url;

use crate::http::{self, FetchError, RetryPolicy};
use crate::playlist::{Playlist, parse_m3u};

use super::error::{CollectionError, Result};

/// Fetches and decodes a playlist from a location.
pub(crate) trait PlaylistSource {
    fn fetch_and_parse(&self, location: &str) -> Result<Playlist>;
}

/// HTTP(S) URLs go over the network; `file://` URLs and plain paths are read from disk.
#[derive(Debug, Default)]
pub(crate) struct LocationSource {
    policy: RetryPolicy,
}

impl LocationSource {
    fn fetch_text(&self, location: &str) -> Result<String> {
        let lowered = location.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return http::get_text(location, &self.policy).map_err(|err| match err {
                FetchError::Decode(detail) => CollectionError::malformed(location, detail),
                other => CollectionError::location(location, other),
            });
        }

        let path = if lowered.starts_with("file://") {
            Url::parse(location)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| CollectionError::location(location, "invalid file URL"))?
        } else {
            PathBuf::from(location)
        };
        let bytes = fs::read(&path).map_err(|err| CollectionError::location(location, err))?;
        String::from_utf8(bytes).map_err(|err| CollectionError::malformed(location, err))
    }
}

impl PlaylistSource for LocationSource {
    fn fetch_and_parse(&self, location: &str) -> Result<Playlist> {
        let raw = self.fetch_text(location)?;
        parse_m3u(&raw).map_err(|err| CollectionError::malformed(location, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_local_paths_and_file_urls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("list.m3u");
        fs::write(&path, "#EXTM3U\n#EXTINF:-1,One\nhttp://s/1\n").expect("write list");

        let source = LocationSource::default();
        let playlist = source
            .fetch_and_parse(path.to_str().expect("utf-8 path"))
            .expect("path should load");
        assert_eq!(playlist.len(), 1);

        let url = Url::from_file_path(&path).expect("file url");
        let playlist = source.fetch_and_parse(url.as_str()).expect("file URL should load");
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn missing_file_is_a_location_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.m3u");
        let err = LocationSource::default()
            .fetch_and_parse(path.to_str().expect("utf-8 path"))
            .expect_err("file does not exist");
        assert!(matches!(err, CollectionError::Location { .. }));
    }

    #[test]
    fn undecodable_content_is_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("list.m3u");
        fs::write(&path, "<html>not a playlist</html>").expect("write file");
        let err = LocationSource::default()
            .fetch_and_parse(path.to_str().expect("utf-8 path"))
            .expect_err("not M3U");
        assert!(matches!(err, CollectionError::MalformedData { .. }));
    }
}
