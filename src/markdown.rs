//! Markdown front end: renders CommonMark to the HTML the converter consumes.

use pulldown_cmark::html;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Renders Markdown to an HTML fragment.
///
/// Raw HTML is passed through and fenced code blocks carry their info string
/// as a `language-*` class.
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}
