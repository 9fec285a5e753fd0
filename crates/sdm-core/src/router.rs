//! Catalog reference parsing for entry dispatch.

use url::Url;

/// A parsed catalog reference: the entry type plus its catalog id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRef {
    Track(String),
    Playlist(String),
    Album(String),
    Artist(String),
}

impl CatalogRef {
    /// Parses `https://open.spotify.com/{type}/{id}[?...]`. Unknown types or
    /// malformed references yield `None` and are ignored by dispatch; any
    /// query string after the id is discarded.
    pub fn parse(input: &str) -> Option<CatalogRef> {
        let url = Url::parse(input).ok()?;
        if url.scheme() != "https" || url.host_str() != Some("open.spotify.com") {
            return None;
        }
        let mut segments = url.path_segments()?;
        let kind = segments.next()?;
        let id = segments.next().filter(|id| !id.is_empty())?.to_string();
        match kind {
            "track" => Some(CatalogRef::Track(id)),
            "playlist" => Some(CatalogRef::Playlist(id)),
            "album" => Some(CatalogRef::Album(id)),
            "artist" => Some(CatalogRef::Artist(id)),
            _ => None,
        }
    }

}
