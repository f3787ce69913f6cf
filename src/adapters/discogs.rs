//! Discogs wire shapes and their mapping onto [`ReleaseMetadata`].
//!
//! Everything here is pure: locators are built from a base URL and the
//! response shapes are converted without further I/O.

use crate::domain::model::{LabelInfo, OriginalRelease, ReleaseMetadata, ResolutionQuery, TrackInfo};
use crate::utils::error::{ResolverError, Result};
use serde::Deserialize;
use url::Url;

pub const SERVICE_NAME: &str = "discogs";

/// Builds request locators against one catalog base URL.
#[derive(Debug, Clone)]
pub struct DiscogsApi {
    search_endpoint: Url,
    releases_endpoint: Url,
}

impl DiscogsApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let invalid = |e: url::ParseError| ResolverError::InvalidConfigValueError {
            field: "catalog.base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        };
        let base = Url::parse(&base).map_err(invalid)?;
        Ok(Self {
            search_endpoint: base.join("database/search").map_err(invalid)?,
            releases_endpoint: base.join("releases/").map_err(invalid)?,
        })
    }

    /// Search locator carrying only the populated query fields.
    pub fn search_locator(&self, query: &ResolutionQuery) -> String {
        let mut url = self.search_endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("type", "release");
            if let Some(title) = query.title() {
                pairs.append_pair("release_title", title);
            }
            for performer in query.performers() {
                pairs.append_pair("artist", performer);
            }
            if let Some(label) = query.label() {
                pairs.append_pair("label", label);
            }
            if let Some(catno) = query.catno() {
                pairs.append_pair("catno", catno);
            }
            if let Some(year) = query.year() {
                pairs.append_pair("year", &year.to_string());
            }
        }
        url.to_string()
    }

    pub fn release_locator(&self, id: &str) -> String {
        let mut url = self.releases_endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }
        url.to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<serde_json::Value>,
    #[serde(default)]
    pub label: Vec<String>,
    #[serde(default)]
    pub catno: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub style: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistDoc {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelDoc {
    pub name: String,
    #[serde(default)]
    pub catno: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackDoc {
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, rename = "type_")]
    pub kind: Option<String>,
    #[serde(default)]
    pub sub_tracks: Vec<TrackDoc>,
}

/// Full release record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseInfo {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub artists: Vec<ArtistDoc>,
    #[serde(default)]
    pub labels: Vec<LabelDoc>,
    #[serde(default)]
    pub tracklist: Vec<TrackDoc>,
    #[serde(default)]
    pub master_id: Option<u64>,
    #[serde(default)]
    pub master_url: Option<String>,
}

/// Master ("original") record linked from a release.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MasterInfo {
    pub id: u64,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SearchResponse {
    /// Summary metadata for each result, in the order the catalog returned them.
    pub fn releases(self) -> Vec<ReleaseMetadata> {
        self.results.into_iter().map(SearchResult::into_metadata).collect()
    }
}

impl SearchResult {
    pub fn into_metadata(self) -> ReleaseMetadata {
        // Search titles come as "Artist - Title".
        let (performers, title) = match self.title.split_once(" - ") {
            Some((artist, title)) => (
                vec![strip_disambiguation(artist.trim()).to_string()],
                title.trim().to_string(),
            ),
            None => (Vec::new(), self.title.trim().to_string()),
        };

        let catno = self.catno.filter(|c| !c.trim().is_empty());
        let labels = self
            .label
            .into_iter()
            .map(|name| LabelInfo {
                name,
                catno: catno.clone(),
                id: None,
            })
            .collect();

        ReleaseMetadata {
            id: Some(self.id.to_string()),
            title,
            performers,
            year: self.year.as_ref().and_then(lenient_year),
            country: self.country.filter(|c| !c.is_empty()),
            genres: self.genre.into_iter().chain(self.style).collect(),
            labels,
            ..ReleaseMetadata::default()
        }
    }
}

impl ReleaseInfo {
    pub fn into_metadata(self) -> ReleaseMetadata {
        let performers = self
            .artists
            .iter()
            .filter(|a| a.role.trim().is_empty())
            .map(|a| strip_disambiguation(a.name.trim()).to_string())
            .collect();

        let mut labels: Vec<LabelInfo> = Vec::new();
        for label in self.labels {
            let entry = LabelInfo {
                name: label.name,
                catno: label.catno.filter(|c| !c.trim().is_empty()),
                id: label.id.map(|id| id.to_string()),
            };
            if !labels.contains(&entry) {
                labels.push(entry);
            }
        }

        let mut tracks = Vec::new();
        for track in self.tracklist {
            flatten_track(track, &mut tracks);
        }

        let original = self.master_id.filter(|id| *id != 0).map(|id| OriginalRelease {
            id: Some(id.to_string()),
            ..OriginalRelease::default()
        });

        ReleaseMetadata {
            id: Some(self.id.to_string()),
            title: self.title.trim().to_string(),
            performers,
            year: self.year.filter(|y| *y > 0),
            country: self.country.filter(|c| !c.is_empty()),
            notes: self.notes.filter(|n| !n.is_empty()),
            genres: self.genres.into_iter().chain(self.styles).collect(),
            labels,
            tracks,
            original,
            master_locator: self.master_url.filter(|u| !u.is_empty()),
        }
    }
}

impl MasterInfo {
    pub fn merge_into(self, release: &mut ReleaseMetadata) {
        let original = release.original.get_or_insert_with(OriginalRelease::default);
        original.id = Some(self.id.to_string());
        original.year = self.year.filter(|y| *y > 0);
        original.notes = self.notes.filter(|n| !n.is_empty());
    }
}

fn flatten_track(track: TrackDoc, out: &mut Vec<TrackInfo>) {
    if track.kind.as_deref() == Some("heading") {
        return;
    }
    if track.sub_tracks.is_empty() {
        out.push(TrackInfo {
            position: track.position,
            title: track.title,
            duration_secs: parse_duration(&track.duration),
        });
        return;
    }
    for sub in track.sub_tracks {
        let position = if track.position.is_empty() {
            sub.position
        } else {
            format!("{}.{}", track.position, sub.position)
        };
        out.push(TrackInfo {
            position,
            title: format!("{} / {}", track.title, sub.title),
            duration_secs: parse_duration(&sub.duration),
        });
    }
}

/// Parses "m:ss" or "h:mm:ss" into seconds.
fn parse_duration(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let mut total: u32 = 0;
    for part in text.split(':') {
        let value: u32 = part.trim().parse().ok()?;
        total = total.checked_mul(60)?.checked_add(value)?;
    }
    Some(total)
}

fn lenient_year(value: &serde_json::Value) -> Option<i32> {
    let year = match value {
        serde_json::Value::Number(n) => i32::try_from(n.as_i64()?).ok()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (year > 0).then_some(year)
}

/// Drops the catalog's numeric suffix used to tell namesakes apart: "Yes (2)" -> "Yes".
fn strip_disambiguation(name: &str) -> &str {
    if let Some(stripped) = name.strip_suffix(')') {
        if let Some(open) = stripped.rfind(" (") {
            let inner = &stripped[open + 2..];
            if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
                return &name[..open];
            }
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_locator_only_sends_populated_fields() {
        let api = DiscogsApi::new("https://api.discogs.com").unwrap();
        let query = ResolutionQuery::new()
            .with_title("The Dark Side Of The Moon")
            .with_performer("Pink Floyd")
            .with_catno("SHVL 804");

        let locator = api.search_locator(&query);
        let url = Url::parse(&locator).unwrap();
        assert_eq!(url.path(), "/database/search");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("type".to_string(), "release".to_string()),
                ("release_title".to_string(), "The Dark Side Of The Moon".to_string()),
                ("artist".to_string(), "Pink Floyd".to_string()),
                ("catno".to_string(), "SHVL 804".to_string()),
            ]
        );
    }

    #[test]
    fn test_release_locator() {
        let api = DiscogsApi::new("http://127.0.0.1:8080/").unwrap();
        assert_eq!(
            api.release_locator("4139588"),
            "http://127.0.0.1:8080/releases/4139588"
        );
    }

    #[test]
    fn test_search_result_splits_artist_and_title() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "results": [{
                "id": 1873013,
                "title": "Pink Floyd - The Dark Side Of The Moon",
                "year": "1977",
                "label": ["Harvest", "EMI"],
                "catno": "SHVL 804",
                "country": "UK",
                "genre": ["Rock"],
                "style": ["Prog Rock"]
            }, {
                "id": 2,
                "title": "Untitled",
                "year": "unknown"
            }]
        }))
        .unwrap();

        let releases = response.releases();
        assert_eq!(releases.len(), 2);

        let first = &releases[0];
        assert_eq!(first.id.as_deref(), Some("1873013"));
        assert_eq!(first.title, "The Dark Side Of The Moon");
        assert_eq!(first.performers, vec!["Pink Floyd"]);
        assert_eq!(first.year, Some(1977));
        assert_eq!(first.labels.len(), 2);
        assert_eq!(first.labels[1].catno.as_deref(), Some("SHVL 804"));
        assert_eq!(first.genres, vec!["Rock", "Prog Rock"]);

        assert_eq!(releases[1].title, "Untitled");
        assert!(releases[1].performers.is_empty());
        assert_eq!(releases[1].year, None);
    }

    #[test]
    fn test_release_info_normalization() {
        let info: ReleaseInfo = serde_json::from_value(serde_json::json!({
            "id": 1873013,
            "title": "The Dark Side Of The Moon",
            "year": 1977,
            "country": "UK",
            "genres": ["Rock"],
            "styles": ["Psychedelic Rock"],
            "artists": [
                {"id": 45467, "name": "Pink Floyd", "role": ""},
                {"id": 1, "name": "Hipgnosis (2)", "role": "Design"}
            ],
            "labels": [
                {"id": 2, "name": "Harvest", "catno": "SHVL 804"},
                {"id": 2, "name": "Harvest", "catno": "SHVL 804"}
            ],
            "tracklist": [
                {"position": "", "title": "Side One", "duration": "", "type_": "heading"},
                {"position": "A1", "title": "Speak To Me", "duration": "1:30", "type_": "track"},
                {"position": "A2", "title": "Breathe", "duration": "2:43", "type_": "track"},
                {"position": "B1", "title": "Medley", "duration": "", "type_": "index",
                 "sub_tracks": [
                    {"position": "a", "title": "Us", "duration": "7:49"},
                    {"position": "b", "title": "Them", "duration": ""}
                 ]}
            ],
            "master_id": 10362,
            "master_url": "https://api.discogs.com/masters/10362"
        }))
        .unwrap();

        let release = info.into_metadata();
        assert_eq!(release.title, "The Dark Side Of The Moon");
        assert_eq!(release.performers, vec!["Pink Floyd"]);
        assert_eq!(release.labels.len(), 1);
        assert_eq!(release.genres, vec!["Rock", "Psychedelic Rock"]);
        assert_eq!(release.tracks.len(), 4);
        assert_eq!(release.tracks[0].duration_secs, Some(90));
        assert_eq!(release.tracks[2].position, "B1.a");
        assert_eq!(release.tracks[2].title, "Medley / Us");
        assert_eq!(release.tracks[3].duration_secs, None);
        assert_eq!(
            release.master_locator.as_deref(),
            Some("https://api.discogs.com/masters/10362")
        );
        assert_eq!(
            release.original.as_ref().and_then(|o| o.id.as_deref()),
            Some("10362")
        );
    }

    #[test]
    fn test_master_merge_sets_original_year() {
        let mut release = ReleaseMetadata {
            title: "The Dark Side Of The Moon".to_string(),
            year: Some(1977),
            ..ReleaseMetadata::default()
        };
        let master = MasterInfo {
            id: 10362,
            year: Some(1973),
            notes: Some("Original pressing".to_string()),
        };
        master.merge_into(&mut release);

        let original = release.original.unwrap();
        assert_eq!(original.year, Some(1973));
        assert_eq!(original.notes.as_deref(), Some("Original pressing"));
        assert_eq!(release.year, Some(1977));
    }

    #[test]
    fn test_parse_duration_and_disambiguation() {
        assert_eq!(parse_duration("3:05"), Some(185));
        assert_eq!(parse_duration("1:02:03"), Some(3723));
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(strip_disambiguation("Yes (2)"), "Yes");
        assert_eq!(strip_disambiguation("Pink Floyd"), "Pink Floyd");
        assert_eq!(strip_disambiguation("Live (Remastered)"), "Live (Remastered)");
    }

    #[test]
    fn test_lenient_year_rejects_out_of_range() {
        assert_eq!(lenient_year(&serde_json::json!("1977")), Some(1977));
        assert_eq!(lenient_year(&serde_json::json!(1977)), Some(1977));
        assert_eq!(lenient_year(&serde_json::json!(4294969273u64)), None);
        assert_eq!(lenient_year(&serde_json::json!("unknown")), None);
        assert_eq!(lenient_year(&serde_json::json!(0)), None);
    }
}
