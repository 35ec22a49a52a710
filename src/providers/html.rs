use html_escape::decode_html_entities;
use scraper::{Html, Selector};

/// Reduce provider HTML (Spoonacular instructions, summaries) to plain text.
///
/// List items and paragraphs become separate lines; anything else is
/// flattened to its text content.
pub(crate) fn html_to_text(html: &str) -> String {
    if !html.contains('<') {
        return decode_html_entities(html).trim().to_string();
    }

    let fragment = Html::parse_fragment(html);

    if let Ok(blocks) = Selector::parse("li, p") {
        let lines: Vec<String> = fragment
            .select(&blocks)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|line| !line.is_empty())
            .collect();
        if !lines.is_empty() {
            return lines.join("\n");
        }
    }

    collapse_whitespace(&fragment.root_element().text().collect::<Vec<_>>().join(" "))
}

/// Decode entities in a plain text field such as a title
pub(crate) fn decode_text(text: &str) -> String {
    decode_html_entities(text).trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
