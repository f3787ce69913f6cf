use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What the caller knows about the release it is looking for.
///
/// Built once through the `with_*` methods and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionQuery {
    title: Option<String>,
    performers: BTreeSet<String>,
    year: Option<i32>,
    label: Option<String>,
    catno: Option<String>,
    release_id: Option<String>,
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl ResolutionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_release_id(id: impl Into<String>) -> Self {
        Self::new().with_release_id(id)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_blank(title);
        self
    }

    pub fn with_performer(mut self, name: impl Into<String>) -> Self {
        if let Some(name) = non_blank(name) {
            self.performers.insert(name);
        }
        self
    }

    /// A year of 0 means "unknown".
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = if year > 0 { Some(year) } else { None };
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = non_blank(label);
        self
    }

    pub fn with_catno(mut self, catno: impl Into<String>) -> Self {
        self.catno = non_blank(catno);
        self
    }

    pub fn with_release_id(mut self, id: impl Into<String>) -> Self {
        self.release_id = non_blank(id);
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn performers(&self) -> impl Iterator<Item = &str> {
        self.performers.iter().map(String::as_str)
    }

    pub fn has_performers(&self) -> bool {
        !self.performers.is_empty()
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn catno(&self) -> Option<&str> {
        self.catno.as_deref()
    }

    pub fn release_id(&self) -> Option<&str> {
        self.release_id.as_deref()
    }

    /// True when at least one searchable field is populated.
    pub fn has_search_fields(&self) -> bool {
        self.title.is_some()
            || !self.performers.is_empty()
            || self.year.is_some()
            || self.label.is_some()
            || self.catno.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catno: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub position: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
}

/// Data from the "master" record a release was pressed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalRelease {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Normalized release metadata, either summary-level (from search) or full.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<TrackInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<OriginalRelease>,
    /// Locator of the linked master record, if the detail response had one.
    #[serde(skip)]
    pub master_locator: Option<String>,
}

/// A scored catalog entry. The score is clamped to [0.0, 1.0].
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub metadata: ReleaseMetadata,
    score: f64,
}

impl Candidate {
    pub fn new(id: impl Into<String>, metadata: ReleaseMetadata, score: f64) -> Self {
        Self {
            id: id.into(),
            metadata,
            score: clamp_score(score),
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn rescore(&mut self, score: f64) {
        self.score = clamp_score(score);
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    IdentifierLookup,
    FuzzyMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub release: ReleaseMetadata,
    pub service_name: String,
    pub online: bool,
    pub provenance: Provenance,
    pub score: f64,
}

/// Final ranked output of one resolution, best match first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuggestionSet {
    pub suggestions: Vec<Suggestion>,
}

impl SuggestionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    pub fn best(&self) -> Option<&Suggestion> {
        self.suggestions.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.suggestions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_drops_blank_fields_and_zero_year() {
        let query = ResolutionQuery::new()
            .with_title("  ")
            .with_performer("")
            .with_year(0)
            .with_label("Harvest");

        assert_eq!(query.title(), None);
        assert!(!query.has_performers());
        assert_eq!(query.year(), None);
        assert_eq!(query.label(), Some("Harvest"));
        assert!(query.has_search_fields());
    }

    #[test]
    fn test_identifier_only_query_has_no_search_fields() {
        let query = ResolutionQuery::by_release_id("4139588");
        assert_eq!(query.release_id(), Some("4139588"));
        assert!(!query.has_search_fields());
    }

    #[test]
    fn test_performers_are_a_set() {
        let query = ResolutionQuery::new()
            .with_performer("Pink Floyd")
            .with_performer("Pink Floyd");
        assert_eq!(query.performers().count(), 1);
    }

    #[test]
    fn test_candidate_score_is_clamped() {
        let mut candidate = Candidate::new("1", ReleaseMetadata::default(), 1.7);
        assert_eq!(candidate.score(), 1.0);
        candidate.rescore(-0.2);
        assert_eq!(candidate.score(), 0.0);
        candidate.rescore(f64::NAN);
        assert_eq!(candidate.score(), 0.0);
    }

    #[test]
    fn test_provenance_serializes_snake_case() {
        let json = serde_json::to_string(&Provenance::IdentifierLookup).unwrap();
        assert_eq!(json, "\"identifier_lookup\"");
    }
}
