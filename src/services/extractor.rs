use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

use crate::domain::{
    html_tag::{attribute, element_text, has_class, selector},
    Citation, Event, LegalEvent, PatentDates, PatentRecord,
};

use super::NotFoundError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    PublicationNumber,
    Title,
    Abstract,
    Language,
    Inventors,
    CurrentAssignees,
    OriginalAssignees,
    PriorityDate,
    FilingDate,
    PublicationDate,
    GrantDate,
    LegalStatus,
    Classifications,
    Description,
    OtherLanguages,
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    Article,
    Document,
}

#[derive(Debug, Clone, Copy)]
enum Cardinality {
    First,
    All,
    /// All matches, minus those nested inside another match.
    Outermost,
}

struct FieldRule {
    field: Field,
    scope: Scope,
    selector: &'static str,
    cardinality: Cardinality,
    normalize: fn(ElementRef) -> Option<String>,
}

// Scalar fields keep the first rule that yields a value, so later rules for
// the same field act as fallbacks.
const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::PublicationNumber,
        scope: Scope::Article,
        selector: "dd[itemprop='publicationNumber']",
        cardinality: Cardinality::First,
        normalize: element_text,
    },
    FieldRule {
        field: Field::Title,
        scope: Scope::Article,
        selector: "[itemprop='title']",
        cardinality: Cardinality::First,
        normalize: element_text,
    },
    FieldRule {
        field: Field::Title,
        scope: Scope::Document,
        selector: "meta[name='DC.title']",
        cardinality: Cardinality::First,
        normalize: content_value,
    },
    FieldRule {
        field: Field::Abstract,
        scope: Scope::Article,
        selector: "section[itemprop='abstract'] abstract, section[itemprop='abstract'] .abstract",
        cardinality: Cardinality::First,
        normalize: element_text,
    },
    FieldRule {
        field: Field::Abstract,
        scope: Scope::Document,
        selector: "meta[name='DC.description']",
        cardinality: Cardinality::First,
        normalize: content_value,
    },
    FieldRule {
        field: Field::Language,
        scope: Scope::Article,
        selector: "section[itemprop='abstract'] [lang]",
        cardinality: Cardinality::First,
        normalize: language_value,
    },
    FieldRule {
        field: Field::Inventors,
        scope: Scope::Article,
        selector: "dd[itemprop='inventor']",
        cardinality: Cardinality::All,
        normalize: element_text,
    },
    FieldRule {
        field: Field::CurrentAssignees,
        scope: Scope::Article,
        selector: "dd[itemprop='assigneeCurrent']",
        cardinality: Cardinality::All,
        normalize: element_text,
    },
    FieldRule {
        field: Field::OriginalAssignees,
        scope: Scope::Article,
        selector: "dd[itemprop='assigneeOriginal']",
        cardinality: Cardinality::All,
        normalize: element_text,
    },
    FieldRule {
        field: Field::PriorityDate,
        scope: Scope::Article,
        selector: "dl [itemprop='priorityDate']",
        cardinality: Cardinality::First,
        normalize: date_value,
    },
    FieldRule {
        field: Field::FilingDate,
        scope: Scope::Article,
        selector: "dl [itemprop='filingDate']",
        cardinality: Cardinality::First,
        normalize: date_value,
    },
    FieldRule {
        field: Field::PublicationDate,
        scope: Scope::Article,
        selector: "dl [itemprop='publicationDate']",
        cardinality: Cardinality::First,
        normalize: date_value,
    },
    FieldRule {
        field: Field::GrantDate,
        scope: Scope::Article,
        selector: "dl [itemprop='grantDate']",
        cardinality: Cardinality::First,
        normalize: date_value,
    },
    FieldRule {
        field: Field::LegalStatus,
        scope: Scope::Article,
        selector: "[itemprop='legalStatusIfi'] [itemprop='status']",
        cardinality: Cardinality::First,
        normalize: element_text,
    },
    FieldRule {
        field: Field::Classifications,
        scope: Scope::Article,
        selector: "[itemprop='classifications'] [itemprop='Code']",
        cardinality: Cardinality::All,
        normalize: element_text,
    },
    FieldRule {
        field: Field::Description,
        scope: Scope::Article,
        selector: "section[itemprop='description'] heading, \
                   section[itemprop='description'] .description-paragraph, \
                   section[itemprop='description'] .description-line",
        cardinality: Cardinality::Outermost,
        normalize: element_text,
    },
    FieldRule {
        field: Field::OtherLanguages,
        scope: Scope::Article,
        selector: "[itemprop='otherLanguages'] [itemprop='code']",
        cardinality: Cardinality::All,
        normalize: code_value,
    },
];

fn content_value(element: ElementRef) -> Option<String> {
    attribute(element, "content")
}

fn date_value(element: ElementRef) -> Option<String> {
    attribute(element, "datetime").or_else(|| element_text(element))
}

fn language_value(element: ElementRef) -> Option<String> {
    attribute(element, "lang").map(|lang| lang.to_lowercase())
}

fn code_value(element: ElementRef) -> Option<String> {
    content_value(element).or_else(|| element_text(element))
}

fn first_value(
    scope: ElementRef,
    selector: &Selector,
    normalize: fn(ElementRef) -> Option<String>,
) -> Option<String> {
    scope.select(selector).find_map(normalize)
}

/// Builds a record from a rendered patent page.
///
/// Only a page without an `<article>` is an error. Any other missing
/// fragment just leaves its field empty.
pub fn extract(html: &str) -> Result<PatentRecord, NotFoundError> {
    let document = Html::parse_document(html);
    let article = document
        .select(&selector("article"))
        .next()
        .ok_or(NotFoundError::NoArticle)?;

    let mut record = PatentRecord::default();
    let mut dates = PatentDates::default();

    for rule in FIELD_RULES {
        let scope = match rule.scope {
            Scope::Article => article,
            Scope::Document => document.root_element(),
        };
        let values = apply_rule(scope, rule);
        if !values.is_empty() {
            assign(&mut record, &mut dates, rule.field, values);
        }
    }

    if !dates.is_empty() {
        record.dates = Some(dates);
    }
    record.claims = extract_claims(article);
    record.citations = extract_citations(article, "backwardReferences");
    record.cited_by = extract_citations(article, "forwardReferences");
    record.events = extract_events(article);
    record.legal_events = extract_legal_events(article);

    log::info!(
        "Extracted {:?}: {} claims, {} citations, {} legal events",
        record.publication_number,
        record.claims.len(),
        record.citations.len(),
        record.legal_events.len()
    );

    Ok(record)
}

fn apply_rule(scope: ElementRef, rule: &FieldRule) -> Vec<String> {
    let selector = selector(rule.selector);
    let matches = scope.select(&selector);

    match rule.cardinality {
        Cardinality::First => matches.filter_map(rule.normalize).take(1).collect(),
        Cardinality::All => matches.filter_map(rule.normalize).collect(),
        Cardinality::Outermost => {
            let elements: Vec<ElementRef> = matches.collect();
            elements
                .iter()
                .filter(|element| {
                    !element
                        .ancestors()
                        .filter_map(ElementRef::wrap)
                        .any(|ancestor| elements.contains(&ancestor))
                })
                .filter_map(|element| (rule.normalize)(*element))
                .collect()
        }
    }
}

fn assign(record: &mut PatentRecord, dates: &mut PatentDates, field: Field, values: Vec<String>) {
    let first = values.first().cloned();

    match field {
        Field::PublicationNumber => set_once(&mut record.publication_number, first),
        Field::Title => set_once(&mut record.title, first),
        Field::Abstract => set_once(&mut record.abstract_text, first),
        Field::Language => set_once(&mut record.language, first),
        Field::LegalStatus => set_once(&mut record.legal_status, first),
        Field::PriorityDate => set_once(&mut dates.priority, first),
        Field::FilingDate => set_once(&mut dates.filing, first),
        Field::PublicationDate => set_once(&mut dates.publication, first),
        Field::GrantDate => set_once(&mut dates.grant, first),
        Field::Inventors => record.inventors = values,
        Field::CurrentAssignees => record.current_assignees = values,
        Field::OriginalAssignees => record.original_assignees = values,
        Field::Classifications => record.classifications = values.into_iter().unique().collect(),
        Field::Description => record.description = values,
        Field::OtherLanguages => record.other_languages = values.into_iter().unique().collect(),
    }
}

fn set_once(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}

fn is_claim(element: &ElementRef) -> bool {
    has_class(*element, "claim") || element.value().name() == "claim"
}

// Claim markup nests differently between pages, so claims are found through
// their text blocks: every distinct nearest "claim" ancestor of a
// "claim-text" element is one claim.
fn extract_claims(article: ElementRef) -> Vec<String> {
    let Some(section) = article
        .select(&selector("section[itemprop='claims']"))
        .next()
    else {
        return vec![];
    };

    section
        .select(&selector(".claim-text, claim-text"))
        .filter_map(|text| text.ancestors().filter_map(ElementRef::wrap).find(is_claim))
        .unique_by(|claim| claim.id())
        .filter_map(element_text)
        .collect()
}

fn extract_citations(article: ElementRef, itemprop_prefix: &str) -> Vec<Citation> {
    let rows = selector(&format!("tr[itemprop^='{itemprop_prefix}']"));
    let publication_number = selector("[itemprop='publicationNumber']");
    let examiner_cited = selector("[itemprop='examinerCited']");
    let priority_date = selector("[itemprop='priorityDate']");
    let publication_date = selector("[itemprop='publicationDate']");
    let assignee = selector("[itemprop='assigneeOriginal']");
    let title = selector("[itemprop='title']");

    article
        .select(&rows)
        .filter_map(|row| {
            Some(Citation {
                publication_number: first_value(row, &publication_number, element_text)?,
                priority_date: first_value(row, &priority_date, date_value),
                publication_date: first_value(row, &publication_date, date_value),
                assignee: first_value(row, &assignee, element_text),
                title: first_value(row, &title, element_text),
                examiner_cited: first_value(row, &examiner_cited, element_text)
                    .is_some_and(|mark| mark.contains('*')),
            })
        })
        .collect()
}

fn extract_events(article: ElementRef) -> Vec<Event> {
    let date = selector("[itemprop='date']");
    let title = selector("[itemprop='title']");
    let kind = selector("[itemprop='type']");

    article
        .select(&selector("dd[itemprop='events']"))
        .map(|event| Event {
            date: first_value(event, &date, date_value),
            title: first_value(event, &title, element_text),
            kind: first_value(event, &kind, element_text),
        })
        .filter(|event| event.date.is_some() || event.title.is_some())
        .collect()
}

fn extract_legal_events(article: ElementRef) -> Vec<LegalEvent> {
    let date = selector("[itemprop='date']");
    let code = selector("[itemprop='code']");
    let title = selector("[itemprop='title']");
    let attributes = selector("[itemprop='attributes']");
    let label_selector = selector("[itemprop='label']");
    let value_selector = selector("[itemprop='value']");

    article
        .select(&selector("tr[itemprop='legalEvents']"))
        .map(|row| {
            let mut fields = Map::new();
            for attribute in row.select(&attributes) {
                let label = first_value(attribute, &label_selector, element_text);
                let value = first_value(attribute, &value_selector, element_text);
                if let (Some(label), Some(value)) = (label, value) {
                    fields.insert(label, Value::String(value));
                }
            }

            LegalEvent {
                date: first_value(row, &date, date_value),
                code: first_value(row, &code, element_text),
                title: first_value(row, &title, element_text),
                attributes: fields,
            }
        })
        .collect()
}
