use crate::domain::model::ResolutionQuery;
use crate::utils::error::{ResolverError, Result};
use serde::Deserialize;

/// Release id as sent by clients: either `"4139588"` or `4139588`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReleaseId {
    Text(String),
    Number(u64),
}

impl ReleaseId {
    fn into_string(self) -> String {
        match self {
            ReleaseId::Text(s) => s,
            ReleaseId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishingDoc {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub catno: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActorDoc {
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordingDoc {
    #[serde(default)]
    pub actors: Vec<ActorDoc>,
}

/// Partial release description carried by a search request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseDoc {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub performers: Vec<String>,
    #[serde(default)]
    pub publishing: Vec<PublishingDoc>,
    #[serde(default)]
    pub recording: Option<RecordingDoc>,
}

/// JSON search request: `{"release_id": ..}` or `{"release": {..}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub release_id: Option<ReleaseId>,
    #[serde(default)]
    pub release: Option<ReleaseDoc>,
}

impl SearchRequest {
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn into_query(self) -> Result<ResolutionQuery> {
        if let Some(id) = self.release_id {
            let query = ResolutionQuery::by_release_id(id.into_string());
            if query.release_id().is_some() {
                return Ok(query);
            }
        }

        let release = self.release.ok_or_else(|| ResolverError::InvalidQuery {
            message: "request carries neither 'release_id' nor 'release'".to_string(),
        })?;

        let mut query = ResolutionQuery::new();
        if let Some(title) = release.title {
            query = query.with_title(title);
        }
        if let Some(year) = release.year {
            query = query.with_year(year);
        }
        for name in release.performers {
            query = query.with_performer(name);
        }
        if let Some(recording) = release.recording {
            for actor in recording.actors {
                if actor.roles.iter().any(|role| role == "performer") {
                    query = query.with_performer(actor.name);
                }
            }
        }
        // Only the first publishing entry is searchable.
        if let Some(publishing) = release.publishing.into_iter().next() {
            if let Some(name) = publishing.name {
                query = query.with_label(name);
            }
            if let Some(catno) = publishing.catno {
                query = query.with_catno(catno);
            }
        }

        if !query.has_search_fields() {
            return Err(ResolverError::InvalidQuery {
                message: "release description has no searchable field".to_string(),
            });
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_release_id() {
        let request = SearchRequest::from_json(br#"{"release_id": 4139588}"#).unwrap();
        let query = request.into_query().unwrap();
        assert_eq!(query.release_id(), Some("4139588"));
    }

    #[test]
    fn test_incomplete_release_document() {
        let doc = br#"{
            "release": {
                "year": 1977,
                "publishing": [{"name": "Harvest", "catno": "SHVL 804"}],
                "title": "The Dark Side Of The Moon",
                "recording": {
                    "actors": [
                        {"name": "Pink Floyd", "roles": ["performer"]},
                        {"name": "Alan Parsons", "roles": ["engineer"]}
                    ]
                }
            }
        }"#;
        let query = SearchRequest::from_json(doc).unwrap().into_query().unwrap();

        assert_eq!(query.title(), Some("The Dark Side Of The Moon"));
        assert_eq!(query.year(), Some(1977));
        assert_eq!(query.label(), Some("Harvest"));
        assert_eq!(query.catno(), Some("SHVL 804"));
        assert_eq!(query.performers().collect::<Vec<_>>(), vec!["Pink Floyd"]);
        assert_eq!(query.release_id(), None);
    }

    #[test]
    fn test_empty_request_is_invalid() {
        let err = SearchRequest::from_json(b"{}").unwrap().into_query().unwrap_err();
        assert!(matches!(err, ResolverError::InvalidQuery { .. }));

        let err = SearchRequest::from_json(br#"{"release": {"year": 0}}"#)
            .unwrap()
            .into_query()
            .unwrap_err();
        assert!(matches!(err, ResolverError::InvalidQuery { .. }));
    }
}
