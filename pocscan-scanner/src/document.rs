// Static HTML querying shared by sessions that hold raw markup

use crate::error::{Result, ScanError};
use crate::session::ElementSnapshot;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| ScanError::InvalidSelector(selector.to_string()))
}

/// Run a CSS selector over an HTML document and snapshot every match in
/// document order.
///
/// With a `base`, `href` values are resolved against it the way a browser
/// reports the `href` property.
pub fn select_snapshots(
    html: &str,
    selector: &str,
    base: Option<&Url>,
) -> Result<Vec<ElementSnapshot>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .map(|element| snapshot(element, base))
        .collect())
}

pub fn select_first(
    html: &str,
    selector: &str,
    base: Option<&Url>,
) -> Result<Option<ElementSnapshot>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .next()
        .map(|element| snapshot(element, base)))
}

fn snapshot(element: ElementRef<'_>, base: Option<&Url>) -> ElementSnapshot {
    let attributes = element
        .value()
        .attrs()
        .map(|(name, value)| {
            let value = match (name, base) {
                ("href", Some(base)) => resolve_href(base, value),
                _ => value.to_string(),
            };
            (name.to_string(), value)
        })
        .collect();

    let mut text = String::new();
    push_rendered_text(element, &mut text);
    ElementSnapshot::new(collapse_whitespace(std::iter::once(text.as_str())), attributes)
}

/// Elements whose boundaries break the line in rendered text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

fn push_rendered_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(child_element) => {
                let block = BLOCK_ELEMENTS.contains(&child_element.name());
                if block {
                    out.push(' ');
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    push_rendered_text(child_ref, out);
                }
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn resolve_href(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|resolved| resolved.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Join text and collapse every whitespace run, line breaks included, to a
/// single space.
pub fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = r#"<html><body>
        <div role="grid">
            <div role="gridcell">Attack Vector</div>
            <div role="gridcell">  Network </div>
            <div role="gridcell">Exploit Code
                Maturity</div>
            <div role="gridcell">Functional</div>
        </div>
        <a href="/vulnerability/CVE-2025-0001">one</a>
    </body></html>"#;

    #[test]
    fn test_select_snapshots_document_order() {
        let cells = select_snapshots(GRID, "div[role='gridcell']", None).unwrap();
        let texts: Vec<&str> = cells.iter().map(|c| c.text()).collect();
        assert_eq!(
            texts,
            vec!["Attack Vector", "Network", "Exploit Code Maturity", "Functional"]
        );
    }

    #[test]
    fn test_select_first_reads_attributes() {
        let link = select_first(GRID, "a[href*='/vulnerability/CVE-']", None)
            .unwrap()
            .expect("anchor should match");
        assert_eq!(link.attribute("href"), Some("/vulnerability/CVE-2025-0001"));
        assert_eq!(link.attribute("title"), None);
    }

    #[test]
    fn test_select_first_no_match() {
        assert!(select_first(GRID, "#exploitability dd", None).unwrap().is_none());
    }

    #[test]
    fn test_invalid_selector() {
        let err = select_snapshots(GRID, "div[[", None).unwrap_err();
        assert!(matches!(err, ScanError::InvalidSelector(_)));
    }

    #[test]
    fn test_href_resolved_against_base() {
        let base = Url::parse("https://msrc.microsoft.com/update-guide/releaseNote/2025-Jan").unwrap();
        let html = r#"<a href="/update-guide/vulnerability/CVE-2025-21298">a</a>
            <a href="https://example.org/vulnerability/CVE-2025-0002">b</a>"#;

        let links = select_snapshots(html, "a", Some(&base)).unwrap();
        assert_eq!(
            links[0].attribute("href"),
            Some("https://msrc.microsoft.com/update-guide/vulnerability/CVE-2025-21298")
        );
        assert_eq!(
            links[1].attribute("href"),
            Some("https://example.org/vulnerability/CVE-2025-0002")
        );
    }

    #[test]
    fn test_attribute_match_is_case_sensitive() {
        let html = r#"<a href="/Vulnerability/cve-1">x</a><a href="/vulnerability/CVE-2">y</a>"#;
        let links = select_snapshots(html, "a[href*='/vulnerability/CVE-']", None).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text(), "y");
    }

    #[test]
    fn test_block_children_do_not_run_together() {
        let html = r#"<div role="gridcell"><div>Exploit Code</div><div>Maturity</div></div>
            <div role="gridcell"><span>Func</span><b>tional</b></div>"#;

        let cells = select_snapshots(html, "div[role='gridcell']", None).unwrap();
        assert_eq!(cells[0].text(), "Exploit Code Maturity");
        assert_eq!(cells[1].text(), "Functional");
    }
}
