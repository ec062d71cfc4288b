use scraper::{ElementRef, Html, Selector};

use crate::error::{OrlyError, Result};

/// Site chrome that is stripped from saved chapters.
const CHROME: &str =
    r#"[class*="nav"], [class*="header"], [class*="footer"], [class*="sidebar"]"#;

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| OrlyError::Parse(format!("bad selector {}: {:?}", css, err)))
}

/// Text of an element with whitespace collapsed.
pub(crate) fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes navigation, headers, footers and sidebars, then serializes what
/// is left of the document. Best effort, anything not marked by its class
/// attribute stays.
pub fn strip_chrome(html: &str) -> Result<String> {
    let mut document = Html::parse_document(html);
    let chrome = selector(CHROME)?;

    let nodes: Vec<_> = document.select(&chrome).map(|element| element.id()).collect();
    for id in nodes {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    Ok(document.html())
}
