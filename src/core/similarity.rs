use crate::domain::model::{ReleaseMetadata, ResolutionQuery};
use crate::domain::ports::Similarity;
use std::collections::HashSet;
use strsim::normalized_levenshtein;

const TITLE_WEIGHT: f64 = 3.0;
const PERFORMER_WEIGHT: f64 = 2.0;
const CATNO_WEIGHT: f64 = 2.0;
const LABEL_WEIGHT: f64 = 1.0;
const YEAR_WEIGHT: f64 = 1.0;

/// Weighted field agreement between a query and a candidate.
///
/// Only fields the query populates take part; the score is the matched
/// weight over the populated weight. Text comparison ignores case and
/// punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldSimilarity;

impl Similarity for FieldSimilarity {
    fn compare(&self, query: &ResolutionQuery, candidate: &ReleaseMetadata) -> f64 {
        let mut possible = 0.0;
        let mut matched = 0.0;

        if let Some(title) = query.title() {
            possible += TITLE_WEIGHT;
            matched += TITLE_WEIGHT * title_agreement(title, &candidate.title);
        }

        if query.has_performers() {
            possible += PERFORMER_WEIGHT;
            let wanted: HashSet<String> = query.performers().map(normalize).collect();
            if candidate.performers.iter().any(|p| wanted.contains(&normalize(p))) {
                matched += PERFORMER_WEIGHT;
            }
        }

        if let Some(catno) = query.catno() {
            possible += CATNO_WEIGHT;
            let wanted = compact(catno);
            let found = candidate
                .labels
                .iter()
                .filter_map(|l| l.catno.as_deref())
                .any(|c| compact(c) == wanted);
            if found {
                matched += CATNO_WEIGHT;
            }
        }

        if let Some(label) = query.label() {
            possible += LABEL_WEIGHT;
            let wanted = normalize(label);
            if candidate.labels.iter().any(|l| normalize(&l.name) == wanted) {
                matched += LABEL_WEIGHT;
            }
        }

        if let Some(year) = query.year() {
            possible += YEAR_WEIGHT;
            let original_year = candidate.original.as_ref().and_then(|o| o.year);
            if candidate.year == Some(year) || original_year == Some(year) {
                matched += YEAR_WEIGHT;
            }
        }

        if possible == 0.0 {
            return 0.0;
        }
        (matched / possible).clamp(0.0, 1.0)
    }
}

/// 1.0 for equal titles, otherwise the normalized edit similarity.
fn title_agreement(wanted: &str, found: &str) -> f64 {
    let wanted = normalize(wanted);
    let found = normalize(found);
    if wanted.is_empty() || found.is_empty() {
        return 0.0;
    }
    if wanted == found {
        return 1.0;
    }
    normalized_levenshtein(&wanted, &found)
}

fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn compact(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{LabelInfo, OriginalRelease};

    fn dsotm_query() -> ResolutionQuery {
        ResolutionQuery::new()
            .with_title("The Dark Side Of The Moon")
            .with_performer("Pink Floyd")
            .with_year(1977)
            .with_label("Harvest")
            .with_catno("SHVL 804")
    }

    fn release(title: &str, performer: &str, year: i32, label: &str, catno: &str) -> ReleaseMetadata {
        ReleaseMetadata {
            title: title.to_string(),
            performers: vec![performer.to_string()],
            year: Some(year),
            labels: vec![LabelInfo {
                name: label.to_string(),
                catno: Some(catno.to_string()),
                id: None,
            }],
            ..ReleaseMetadata::default()
        }
    }

    #[test]
    fn test_exact_match_scores_one() {
        let candidate = release("The Dark Side of the Moon", "PINK FLOYD", 1977, "Harvest", "SHVL-804");
        assert_eq!(FieldSimilarity.compare(&dsotm_query(), &candidate), 1.0);
    }

    #[test]
    fn test_unrelated_release_scores_low() {
        let candidate = release("Kind Of Blue", "Miles Davis", 1959, "Columbia", "CL 1355");
        let score = FieldSimilarity.compare(&dsotm_query(), &candidate);
        // Only the title edit distance contributes.
        assert!(score < 0.2, "score {}", score);
    }

    #[test]
    fn test_non_ascii_names_ignore_case() {
        let query = ResolutionQuery::new().with_title("DEBUT").with_performer("BJÖRK");
        let candidate = ReleaseMetadata {
            title: "Debut".to_string(),
            performers: vec!["Björk".to_string()],
            ..ReleaseMetadata::default()
        };
        assert_eq!(FieldSimilarity.compare(&query, &candidate), 1.0);

        let query = ResolutionQuery::new().with_label("MOTÖRHEAD MUSIC").with_catno("ÉMI-12");
        let candidate = release("Ace Of Spades", "Motörhead", 1980, "Motörhead Music", "émi 12");
        assert_eq!(FieldSimilarity.compare(&query, &candidate), 1.0);
    }

    #[test]
    fn test_near_title_gets_partial_credit() {
        let query = ResolutionQuery::new().with_title("The Dark Side Of The Moon");
        let near = ReleaseMetadata {
            title: "Dark Side Of The Moon".to_string(),
            ..ReleaseMetadata::default()
        };
        let far = ReleaseMetadata {
            title: "Animals".to_string(),
            ..ReleaseMetadata::default()
        };
        let near_score = FieldSimilarity.compare(&query, &near);
        let far_score = FieldSimilarity.compare(&query, &far);
        assert!(near_score > 0.75 && near_score < 1.0);
        assert!(far_score < near_score);
    }

    #[test]
    fn test_more_matching_fields_never_score_lower() {
        let query = dsotm_query();
        let partial = release("Wish You Were Here", "Pink Floyd", 1975, "Harvest", "SHVL 814");
        let closer = release("Wish You Were Here", "Pink Floyd", 1977, "Harvest", "SHVL 804");
        let a = FieldSimilarity.compare(&query, &partial);
        let b = FieldSimilarity.compare(&query, &closer);
        assert!(a < b);
        // Performer and label match; the title only partially.
        assert!(a >= 3.0 / 9.0 && a < 6.0 / 9.0);
    }

    #[test]
    fn test_original_year_counts() {
        let query = ResolutionQuery::new().with_title("Meddle").with_year(1971);
        let mut candidate = release("Meddle", "Pink Floyd", 1983, "Harvest", "SHVL 795");
        assert!(FieldSimilarity.compare(&query, &candidate) < 1.0);

        candidate.original = Some(OriginalRelease {
            year: Some(1971),
            ..OriginalRelease::default()
        });
        assert_eq!(FieldSimilarity.compare(&query, &candidate), 1.0);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let candidate = release("Meddle", "Pink Floyd", 1971, "Harvest", "SHVL 795");
        assert_eq!(FieldSimilarity.compare(&ResolutionQuery::new(), &candidate), 0.0);
    }
}
