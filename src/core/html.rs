// src/core/html.rs
// Small helpers over `scraper` for the two text views the pipeline needs.

use scraper::{ElementRef, Html};

use super::sanitize::{normalize_entities, normalize_ws};

/// All descendant text of `el`, joined with single spaces.
pub fn flatten_text(el: ElementRef<'_>) -> String {
    let joined = el.text().collect::<Vec<_>>().join(" ");
    normalize_ws(&normalize_entities(&joined))
}

/// Text of an inner-markup snippet, one line per text node.
/// `<a>AUTO<br>  0,0 %</a>` → `["AUTO", "0,0 %"]`. Blank lines are dropped.
pub fn text_lines(inner_markup: &str) -> Vec<String> {
    let doc = Html::parse_fragment(inner_markup);
    let joined = doc.root_element().text().collect::<Vec<_>>().join("\n");
    joined
        .replace('\r', "")
        .split('\n')
        .map(|line| normalize_entities(line).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn flatten_joins_nested_text() {
        let doc = Html::parse_fragment(r#"<div id="pos3"><a>61,9</a>  <span>°C</span></div>"#);
        let sel = Selector::parse("div").unwrap();
        let el = doc.select(&sel).next().unwrap();
        assert_eq!(flatten_text(el), "61,9 °C");
    }

    #[test]
    fn lines_split_on_elements() {
        assert_eq!(text_lines("<a>AUTO<br>  0,0 %</a>"), vec!["AUTO", "0,0 %"]);
        assert_eq!(text_lines("<a>AUTO 0.0%</a>"), vec!["AUTO 0.0%"]);
    }

    #[test]
    fn lines_skip_layout_whitespace() {
        let inner = "\n  <a>HAND</a>\r\n  <span>12,5 %</span>\n";
        assert_eq!(text_lines(inner), vec!["HAND", "12,5 %"]);
        assert!(text_lines("").is_empty());
    }
}
