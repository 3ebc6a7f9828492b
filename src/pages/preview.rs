use crate::models::{BlockType, Page};

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Live-preview HTML for a draft. `content` is already HTML and goes in
/// as-is; the title and text blocks are escaped.
pub fn render_preview(page: &Page) -> String {
    let title = if page.title.is_empty() {
        "Untitled Page"
    } else {
        page.title.as_str()
    };

    let mut html = format!(
        "<article>\n<h1>{}</h1>\n<div class=\"content\">{}</div>\n",
        escape_html(title),
        page.content
    );

    if !page.blocks.is_empty() {
        html.push_str("<div class=\"blocks\">\n");
        for block in &page.blocks {
            match block.block_type {
                BlockType::Text => {
                    html.push_str(&format!("<p>{}</p>\n", escape_html(&block.content)));
                }
                BlockType::Image if !block.url.is_empty() => {
                    html.push_str(&format!(
                        "<img src=\"{}\" alt=\"Block content\">\n",
                        escape_html(&block.url)
                    ));
                }
                BlockType::Video if !block.url.is_empty() => {
                    html.push_str(&format!(
                        "<video src=\"{}\" controls></video>\n",
                        escape_html(&block.url)
                    ));
                }
                _ => {}
            }
        }
        html.push_str("</div>\n");
    }

    html.push_str("</article>\n");
    html
}
