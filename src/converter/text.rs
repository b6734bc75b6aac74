//! Plain-text extraction from DOM elements
//!
//! Every `<br>` (in any spelling the parser accepts) becomes `\n`, other tags are
//! dropped and their text kept in document order.

use scraper::ElementRef;
use scraper::Node;

/// Fallback language label of code blocks without a `language-*` class.
pub(crate) const DEFAULT_CODE_LANGUAGE: &str = "text";

/// Extracts the trimmed text of an element with line breaks preserved.
pub(crate) fn extract_text(element: ElementRef<'_>) -> String {
    extract_text_skipping(element, &[])
}

/// Extracts the trimmed text of an element, ignoring the subtrees of the given tags.
pub(crate) fn extract_text_skipping(element: ElementRef<'_>, skipped: &[&str]) -> String {
    let mut buffer = String::new();
    collect_text(element, skipped, &mut buffer);
    buffer.trim().to_owned()
}

/// Extracts code block text: line breaks kept, indentation of the first line kept,
/// blank leading lines and trailing whitespace removed.
pub(crate) fn extract_code(element: ElementRef<'_>) -> String {
    let mut buffer = String::new();
    collect_text(element, &[], &mut buffer);
    buffer.trim_start_matches(['\n', '\r']).trim_end().to_owned()
}

fn collect_text(element: ElementRef<'_>, skipped: &[&str], buffer: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => buffer.push_str(text),
            Node::Element(child_element) if child_element.name() == "br" => buffer.push('\n'),
            Node::Element(child_element) if skipped.contains(&child_element.name()) => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, skipped, buffer);
                }
            }
            _ => {}
        }
    }
}

/// Returns the language named by the first `language-*` class of an element.
pub(crate) fn code_language(element: ElementRef<'_>) -> Option<String> {
    element.value()
        .classes()
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|language| !language.is_empty())
        .map(str::to_owned)
}

/// Returns the direct child elements with one of the given tag names.
pub(crate) fn child_elements<'a>(element: ElementRef<'a>, names: &'a [&'a str]) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element.children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| names.contains(&child.value().name()))
}
