use scraper::{ElementRef, Html};
use serde_json::{Map, Value};

use crate::domain::html_tag::{
    attribute, collapse_whitespace, element_text, label_to_camel, own_string, selector,
};

use super::NotFoundError;

pub type Node = Map<String, Value>;

/// Dumps every `itemprop` on the page's `<article>` as a nested mapping.
///
/// A `dt` or `h2` element opens a sub-mapping, keyed by its camelCased text,
/// that holds the properties of its following siblings up to the next label.
/// The `application` and `family` sections are lifted to the top level.
/// `abstract`, `description` and `claims` are left to the record extractor.
pub fn parse_microdata(html: &str) -> Result<Node, NotFoundError> {
    let document = Html::parse_document(html);
    let article = document
        .select(&selector("article"))
        .next()
        .ok_or(NotFoundError::NoArticle)?;

    let mut data = Node::new();
    parse_properties(article, &mut data);
    parse_sections(article, &mut data);
    Ok(data)
}

const SPECIAL_SECTIONS: &[&str] = &["abstract", "description", "claims", "application", "family"];

fn is_label(element: &ElementRef) -> bool {
    matches!(element.value().name(), "dt" | "h2")
}

fn is_special_section(element: &ElementRef) -> bool {
    element.value().name() == "section"
        && element.value().attr("itemscope").is_some()
        && element
            .value()
            .attr("itemprop")
            .is_some_and(|property| SPECIAL_SECTIONS.contains(&property))
}

fn label_key(label: ElementRef) -> String {
    match own_string(label) {
        Some(text) => label_to_camel(&text),
        None => {
            log::warn!("Label <{}> has no text of its own", label.value().name());
            String::new()
        }
    }
}

fn parse_properties(element: ElementRef, node: &mut Node) {
    let Some(property) = element.value().attr("itemprop") else {
        parse_children(element, node);
        return;
    };
    if is_special_section(&element) {
        return;
    }

    let value = property_value(element);
    if element.value().attr("repeat").is_none() {
        node.insert(property.to_string(), value);
        return;
    }

    match node.entry(property).or_insert_with(|| Value::Array(vec![])) {
        Value::Array(values) => values.push(value),
        scalar => {
            let previous = scalar.take();
            *scalar = Value::Array(vec![previous, value]);
        }
    }
}

fn property_value(element: ElementRef) -> Value {
    if element.value().attr("itemscope").is_some() {
        let mut child = Node::new();
        parse_children(element, &mut child);
        return Value::Object(child);
    }

    let value = attribute(element, "content")
        .or_else(|| attribute(element, "href"))
        .or_else(|| attribute(element, "src"))
        .or_else(|| own_string(element).and_then(|text| collapse_whitespace(&text)));

    match value {
        Some(value) => Value::String(value),
        None => {
            log::warn!(
                "Omitting value of <{}> {:?}: nested content",
                element.value().name(),
                element.value().attr("itemprop")
            );
            Value::Null
        }
    }
}

fn parse_children(element: ElementRef, node: &mut Node) {
    parse_elements(element.children().filter_map(ElementRef::wrap), node);
}

fn parse_elements<'a>(elements: impl Iterator<Item = ElementRef<'a>>, node: &mut Node) {
    let mut elements = elements.peekable();

    while let Some(element) = elements.next() {
        if !is_label(&element) {
            parse_properties(element, node);
            continue;
        }

        let mut labelled = Node::new();
        while let Some(sibling) = elements.next_if(|sibling| !is_label(sibling)) {
            parse_properties(sibling, &mut labelled);
        }
        node.insert(label_key(element), Value::Object(labelled));
    }
}

fn parse_sections(article: ElementRef, data: &mut Node) {
    let section_selector = selector("section");
    let sections = article.select(&section_selector).filter(is_special_section);

    for section in sections {
        let property = section.value().attr("itemprop").unwrap_or_default();
        let value = match property {
            "application" => {
                let mut application = Node::new();
                parse_children(section, &mut application);
                application
            }
            "family" => parse_family(section),
            _ => continue,
        };
        data.insert(property.to_string(), Value::Object(value));
    }
}

// The family id sits in the first `<h2>` as "ID=..."; the family's
// properties start at the next `<h2>`.
fn parse_family(section: ElementRef) -> Node {
    let mut family = Node::new();
    let Some(id_label) = section.select(&selector("h2")).next() else {
        log::warn!("Family section has no id heading");
        return family;
    };

    if let Some(text) = element_text(id_label) {
        let id = text.rsplit('=').next().unwrap_or(&text).trim();
        family.insert("id".to_string(), Value::String(id.to_string()));
    }

    let content = id_label
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .skip_while(|element| element.value().name() != "h2");
    parse_elements(content, &mut family);
    family
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::parse_microdata;
    use crate::services::NotFoundError;

    #[test]
    fn labels_group_following_siblings() {
        let html = r#"
            <article>
              <span itemprop="title">Feeder</span>
              <dl>
                <dt>Inventor</dt>
                <dd itemprop="inventor" repeat>Jane Doe</dd>
                <dd itemprop="inventor" repeat>John Roe</dd>
                <dt>Priority date (assumed)</dt>
                <dd><time itemprop="priorityDate" datetime="1999-03-17">1999-03-17</time></dd>
              </dl>
            </article>"#;

        let data = parse_microdata(html).unwrap();

        assert_eq!(
            Value::Object(data),
            json!({
                "title": "Feeder",
                "inventor": { "inventor": ["Jane Doe", "John Roe"] },
                "priorityDate": { "priorityDate": "1999-03-17" },
            })
        );
    }

    #[test]
    fn itemscope_nests_and_attributes_win_over_text() {
        let html = r#"
            <article>
              <a itemprop="pdfLink" href="/US1.pdf">Download PDF</a>
              <ul>
                <li itemprop="classifications" itemscope repeat>
                  <span itemprop="Code">A01K5/01</span>
                  <meta itemprop="Leaf" content="true">
                </li>
                <li itemprop="classifications" itemscope repeat>
                  <span itemprop="Code">A01K5/02</span>
                </li>
              </ul>
              <p itemprop="note">mixed <b>markup</b></p>
              <section itemprop="claims" itemscope><span itemprop="count">3</span></section>
            </article>"#;

        let data = parse_microdata(html).unwrap();

        assert_eq!(data["pdfLink"], "/US1.pdf");
        assert_eq!(
            data["classifications"],
            json!([{ "Code": "A01K5/01", "Leaf": "true" }, { "Code": "A01K5/02" }])
        );
        assert!(data["note"].is_null());
        assert!(!data.contains_key("claims"));
    }

    #[test]
    fn fixture_dump_has_info_labels() {
        let data = parse_microdata(include_str!("../../tests/fixtures/US6360693B1.html")).unwrap();

        assert_eq!(data["title"], "Livestock feeding station with metered dispensing");

        let info = &data["info"];
        assert_eq!(info["publicationNumber"]["publicationNumber"], "US6360693B1");
        assert_eq!(info["publicationNumber"]["kindCode"], "B1");
        assert_eq!(info["otherLanguages"]["otherLanguages"][0]["code"], "de");
        assert_eq!(info["inventor"]["inventor"], json!(["Jane Doe", "John Roe"]));

        let legal_events = data["legalEvents"]["legalEvents"].as_array().unwrap();
        assert_eq!(legal_events.len(), 3);
        assert_eq!(legal_events[0]["code"], "AS");
    }

    #[test]
    fn application_and_family_sections_are_lifted() {
        let html = r#"
            <article>
              <span itemprop="title">T</span>
              <h2>Legal Events</h2>
              <section itemprop="application" itemscope>
                <span itemprop="applicationNumber">US09/526,204</span>
              </section>
              <section itemprop="family" itemscope>
                <h2>ID=12345</h2>
                <span itemprop="ignored">before content</span>
                <h2>Priority Applications</h2>
                <ul>
                  <li itemprop="priorityApps" itemscope repeat>
                    <span itemprop="applicationNumber">US09/526,204</span>
                  </li>
                </ul>
              </section>
            </article>"#;

        let data = parse_microdata(html).unwrap();

        assert_eq!(
            Value::Object(data),
            json!({
                "title": "T",
                "legalEvents": {},
                "application": { "applicationNumber": "US09/526,204" },
                "family": {
                    "id": "12345",
                    "priorityApplications": {
                        "priorityApps": [{ "applicationNumber": "US09/526,204" }]
                    }
                },
            })
        );
    }

    #[test]
    fn fixture_dump_has_application_and_family() {
        let data = parse_microdata(include_str!("../../tests/fixtures/US6360693B1.html")).unwrap();

        assert_eq!(data["application"]["metadata"]["applicationNumber"], "US09/526,204");
        assert_eq!(data["application"]["metadata"]["countryCode"], "US");

        let family = &data["family"];
        assert_eq!(family["id"], "25446236");
        assert_eq!(
            family["priorityApplications"]["priorityApps"][0]["representativePublication"],
            "US6360693B1"
        );
        assert!(!data["legalEvents"].as_object().unwrap().contains_key("application"));
    }

    #[test]
    fn page_without_article_is_not_found() {
        assert!(matches!(
            parse_microdata("<html><body></body></html>"),
            Err(NotFoundError::NoArticle)
        ));
    }
}
