use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Everything extracted from one patent page.
///
/// Absent fields are `None` or empty and are left out of the JSON output.
/// Key order in the output follows the declaration order below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatentRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inventors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub current_assignees: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub original_assignees: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<PatentDates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_status: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cited_by: Vec<Citation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub legal_events: Vec<LegalEvent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other_languages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatentDates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant: Option<String>,
}

impl PatentDates {
    pub fn is_empty(&self) -> bool {
        self.priority.is_none()
            && self.filing.is_none()
            && self.publication.is_none()
            && self.grant.is_none()
    }
}

/// A row of the "Cited By" or "Patent Citations" tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Citation {
    pub publication_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub examiner_cited: bool,
}

/// An entry of the application timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

/// One language version of a patent, as emitted by `--all-languages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedRecord {
    pub language: String,
    pub record: PatentRecord,
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{Citation, LegalEvent, PatentDates, PatentRecord};

    fn sample_record() -> PatentRecord {
        let mut attributes = serde_json::Map::new();
        attributes.insert("Owner name".to_string(), json!("ACME CORP"));
        attributes.insert("Effective date".to_string(), json!("2002-03-26"));

        PatentRecord {
            publication_number: Some("US6360693B1".to_string()),
            title: Some("Animal feeding station".to_string()),
            abstract_text: Some("A feeding station for livestock.".to_string()),
            dates: Some(PatentDates {
                priority: Some("1999-03-17".to_string()),
                ..Default::default()
            }),
            claims: vec!["1. A station.".to_string(), "2. The station of claim 1.".to_string()],
            citations: vec![Citation {
                publication_number: "US4003349A".to_string(),
                examiner_cited: true,
                ..Default::default()
            }],
            legal_events: vec![LegalEvent {
                code: Some("AS".to_string()),
                attributes,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn absent_fields_are_omitted() {
        let value = serde_json::to_value(PatentRecord {
            title: Some("Only a title".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(value, json!({ "title": "Only a title" }));
    }

    #[test]
    fn keys_follow_declaration_order() {
        let value = serde_json::to_value(sample_record()).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();

        assert_eq!(
            keys,
            ["publication_number", "title", "abstract", "dates", "claims", "citations", "legal_events"]
        );
    }

    #[test]
    fn json_round_trip_preserves_structure() {
        let record = sample_record();
        let text = serde_json::to_string_pretty(&record).unwrap();

        let parsed: PatentRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, record);

        let original: Value = serde_json::to_value(&record).unwrap();
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, original);
        assert!(original
            .as_object()
            .unwrap()
            .keys()
            .eq(reparsed.as_object().unwrap().keys()));

        let attributes = &reparsed["legal_events"][0]["attributes"];
        let labels: Vec<&String> = attributes.as_object().unwrap().keys().collect();
        assert_eq!(labels, ["Owner name", "Effective date"]);
    }

    #[test]
    fn examiner_cited_only_emitted_when_true() {
        let citation = Citation {
            publication_number: "US1A".to_string(),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(citation).unwrap(),
            json!({ "publication_number": "US1A" })
        );
    }
}
