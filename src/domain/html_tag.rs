use itertools::Itertools;
use scraper::{ElementRef, Node, Selector};

/// Parses a selector known at compile time. Panics on invalid CSS.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Collapses runs of whitespace to single spaces. Blank input yields `None`.
pub fn collapse_whitespace(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().join(" ");
    match collapsed.is_empty() {
        true => None,
        false => Some(collapsed),
    }
}

/// All text below `element`, whitespace-collapsed.
pub fn element_text(element: ElementRef) -> Option<String> {
    collapse_whitespace(&element.text().collect::<String>())
}

pub fn attribute(element: ElementRef, name: &str) -> Option<String> {
    element.value().attr(name).and_then(collapse_whitespace)
}

pub fn has_class(element: ElementRef, class_name: &str) -> bool {
    element.value().classes().any(|class| class == class_name)
}

/// The text of an element whose only descendant chain ends in a single text
/// node, e.g. `<dd><span>x</span></dd>`. Elements with mixed or nested markup
/// have no own string.
pub fn own_string(element: ElementRef) -> Option<String> {
    let mut children = element.children();
    let (Some(only), None) = (children.next(), children.next()) else {
        return None;
    };

    match only.value() {
        Node::Text(text) => Some(text.trim().to_string()),
        Node::Element(_) => ElementRef::wrap(only).and_then(own_string),
        _ => None,
    }
}

/// Turns a section label such as "Cited By (12)" into `citedBy`.
///
/// Words are taken until the first one that starts with a non-alphanumeric
/// character.
pub fn label_to_camel(label: &str) -> String {
    label
        .split_whitespace()
        .take_while(|word| word.chars().next().is_some_and(char::is_alphanumeric))
        .enumerate()
        .map(|(i, word)| match i {
            0 => word.to_lowercase(),
            _ => capitalize(word),
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
