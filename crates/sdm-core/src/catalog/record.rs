//! Catalog record types shared across the pipeline and expanders.

/// Release date components. Spotify reports year, year-month, or full dates
/// depending on release-date precision, so month and day are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDate {
    pub year: i32,
    pub month: Option<u8>,
    pub day: Option<u8>,
}

impl ReleaseDate {
    /// Tolerant parse of `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`.
    pub fn parse(text: &str) -> Self {
        let mut parts = text.splitn(3, '-');
        let year = parts
            .next()
            .and_then(|y| y.parse().ok())
            .unwrap_or_default();
        let month = parts.next().and_then(|m| m.parse().ok());
        let day = parts.next().and_then(|d| d.parse().ok());
        Self { year, month, day }
    }

    /// Four-digit `MMDD` string when both components are known.
    pub fn month_day(&self) -> Option<String> {
        match (self.month, self.day) {
            (Some(m), Some(d)) => Some(format!("{:02}{:02}", m, d)),
            _ => None,
        }
    }
}

/// Album substructure attached to every track record. A track fetched
/// directly carries the catalog's inline album object; album and artist
/// expansion synthesize the same structure per track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumContext {
    pub name: String,
    /// Album-artist display name.
    pub artist: String,
    pub release_date: ReleaseDate,
    /// Cover-art image URL.
    pub cover_url: String,
}

/// One track, immutable once fetched except for the display-name fields the
/// pipeline sanitizes before deriving file paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub id: String,
    pub title: String,
    /// Contributing artists in catalog order; the first is the primary.
    pub artists: Vec<String>,
    pub track_number: u32,
    pub disc_number: u32,
    pub duration_ms: u64,
    /// Canonical web link for the track.
    pub track_url: String,
    /// Canonical web link for the primary artist.
    pub artist_url: String,
    pub album: AlbumContext,
}

impl TrackRecord {
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or_default()
    }

    /// `{primary artist} - {title}`, the basis for search queries and all
    /// derived file names.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.primary_artist(), self.title)
    }
}

/// One track inside an album payload (no album substructure of its own).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumTrack {
    pub id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub track_number: u32,
    pub disc_number: u32,
    pub duration_ms: u64,
    pub track_url: String,
    pub artist_url: String,
}

impl AlbumTrack {
    /// Attaches a synthesized album context, producing a full track record.
    pub fn into_track(self, album: AlbumContext) -> TrackRecord {
        TrackRecord {
            id: self.id,
            title: self.title,
            artists: self.artists,
            track_number: self.track_number,
            disc_number: self.disc_number,
            duration_ms: self.duration_ms,
            track_url: self.track_url,
            artist_url: self.artist_url,
            album,
        }
    }
}

/// A full album payload: its context fields plus the raw track list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumRecord {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub release_date: ReleaseDate,
    pub cover_url: String,
    pub tracks: Vec<AlbumTrack>,
}

impl AlbumRecord {
    /// Copies every album field except the track list.
    pub fn context(&self) -> AlbumContext {
        AlbumContext {
            name: self.name.clone(),
            artist: self.artist.clone(),
            release_date: self.release_date.clone(),
            cover_url: self.cover_url.clone(),
        }
    }
}

/// A reference to one album in an artist's discography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumRef {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_release_date() {
        let date = ReleaseDate::parse("2020-01-02");
        assert_eq!(date.year, 2020);
        assert_eq!(date.month, Some(1));
        assert_eq!(date.day, Some(2));
        assert_eq!(date.month_day(), Some("0102".to_string()));
    }

    #[test]
    fn parses_year_only_release_date() {
        let date = ReleaseDate::parse("1999");
        assert_eq!(date.year, 1999);
        assert_eq!(date.month, None);
        assert_eq!(date.day, None);
        assert_eq!(date.month_day(), None);
    }

    #[test]
    fn parses_year_month_release_date() {
        let date = ReleaseDate::parse("2005-07");
        assert_eq!(date.year, 2005);
        assert_eq!(date.month, Some(7));
        assert_eq!(date.month_day(), None);
    }

    #[test]
    fn display_name_uses_primary_artist() {
        let track = TrackRecord {
            id: "t".into(),
            title: "X".into(),
            artists: vec!["Y".into(), "Z".into()],
            track_number: 1,
            disc_number: 1,
            duration_ms: 1000,
            track_url: String::new(),
            artist_url: String::new(),
            album: AlbumContext {
                name: "A".into(),
                artist: "Y".into(),
                release_date: ReleaseDate::parse("2020"),
                cover_url: String::new(),
            },
        };
        assert_eq!(track.display_name(), "Y - X");
    }
}
