use crate::converter::text::child_elements;
use crate::converter::text::code_language;
use crate::converter::text::extract_code;
use crate::converter::text::extract_text;
use crate::converter::text::extract_text_skipping;
use crate::converter::text::DEFAULT_CODE_LANGUAGE;
use crate::converter::writer::BlockKind;
use crate::converter::ConversionState;
use crate::error::RustyExcelError;
use scraper::ElementRef;

const LIST_TAGS: [&str; 2] = ["ul", "ol"];
const LIST_ITEM_TAGS: [&str; 1] = ["li"];
const CODE_TAGS: [&str; 1] = ["code"];

/// Elements whose content never reaches the worksheet.
const IGNORED_TAGS: [&str; 4] = ["script", "style", "template", "noscript"];

/// Visits the child elements of `element` in document order.
///
/// # Arguments
/// * `element` - Container whose children are dispatched
/// * `level` - List nesting depth of the container, 0 outside lists
/// * `state` - Conversion state receiving the rows
pub(crate) fn walk_children(element: ElementRef<'_>, level: u8, state: &mut ConversionState<'_>) -> Result<(), RustyExcelError> {
    for child in element.children().filter_map(ElementRef::wrap) {
        visit(child, level, state)?;
    }
    Ok(())
}

/// Dispatches one element by tag name.
fn visit(element: ElementRef<'_>, level: u8, state: &mut ConversionState<'_>) -> Result<(), RustyExcelError> {
    match element.value().name() {
        name @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
            let heading_level = name[1..].parse::<u8>().unwrap_or(1);
            write_text_block(element, BlockKind::Heading, heading_level, state)
        }
        "p" => write_text_block(element, BlockKind::Paragraph, 0, state),
        "ul" | "ol" => visit_list(element, level.saturating_add(1), state),
        "li" => visit_list_item(element, level.max(1), state),
        "pre" | "code" => visit_code(element, state),
        "blockquote" => {
            let text = extract_text(element);
            if !text.is_empty() {
                state.write_block(BlockKind::Blockquote, 0, &format!("> {text}"))?;
            }
            Ok(())
        }
        "table" => state.write_table(element),
        "div" => walk_children(element, level, state),
        name if IGNORED_TAGS.contains(&name) => Ok(()),
        _ => write_text_block(element, BlockKind::Text, 0, state),
    }
}

/// Writes an element's text as one row, skipping elements without text.
fn write_text_block(element: ElementRef<'_>, kind: BlockKind, level: u8, state: &mut ConversionState<'_>) -> Result<(), RustyExcelError> {
    let text = extract_text(element);
    if !text.is_empty() {
        state.write_block(kind, level, &text)?;
    }
    Ok(())
}

/// Writes the `<li>` children of a list at `level`.
fn visit_list(list: ElementRef<'_>, level: u8, state: &mut ConversionState<'_>) -> Result<(), RustyExcelError> {
    for item in child_elements(list, &LIST_ITEM_TAGS) {
        visit_list_item(item, level, state)?;
    }
    Ok(())
}

/// Writes a list item as `<indent>• text`, then its nested lists one level deeper.
fn visit_list_item(item: ElementRef<'_>, level: u8, state: &mut ConversionState<'_>) -> Result<(), RustyExcelError> {
    let text = extract_text_skipping(item, &LIST_TAGS);
    if !text.is_empty() {
        state.write_block(BlockKind::ListItem, level, &format!("{}{}", list_prefix(level), text))?;
    }
    for nested in child_elements(item, &LIST_TAGS) {
        visit_list(nested, level.saturating_add(1), state)?;
    }
    Ok(())
}

/// Bullet marker of a list item: two spaces per level below the first, then `• `.
pub(crate) fn list_prefix(level: u8) -> String {
    format!("{}• ", "  ".repeat(usize::from(level.saturating_sub(1))))
}

/// Writes a code block as `[language]\ncode`.
fn visit_code(element: ElementRef<'_>, state: &mut ConversionState<'_>) -> Result<(), RustyExcelError> {
    let code = match element.value().name() {
        "code" => element,
        _ => child_elements(element, &CODE_TAGS).next().unwrap_or(element),
    };
    let text = extract_code(code);
    if text.trim().is_empty() {
        return Ok(());
    }
    let language = code_language(code).unwrap_or_else(|| DEFAULT_CODE_LANGUAGE.to_owned());
    state.write_block(BlockKind::CodeBlock, 0, &format!("[{language}]\n{text}"))?;
    Ok(())
}
