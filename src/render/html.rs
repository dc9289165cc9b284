//! HTML output
//!
//! Same content as the Markdown pages, wrapped in a minimal standalone
//! document. All schema-provided text is escaped.

use chrono::{DateTime, Utc};

use super::{DocPage, PageRenderer};

/// Renders pages as standalone HTML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    fn wrap(title: &str, body: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape(title),
            body
        )
    }
}

impl PageRenderer for HtmlRenderer {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn render_page(&self, page: &DocPage) -> String {
        let mut body = String::new();
        body.push_str(&format!("<h1>{}</h1>\n", escape(&page.title)));
        body.push_str(&format!(
            "<p><strong>Path:</strong> <code>{}</code></p>\n",
            escape(&page.display_path)
        ));
        body.push_str(&format!("<p><strong>Type:</strong> {}</p>\n", escape(&page.schema_type)));
        if let Some(reference) = &page.reference {
            body.push_str(&format!(
                "<p><strong>Reference:</strong> <code>{}</code></p>\n",
                escape(reference)
            ));
        }
        body.push_str(&format!("<p>{}</p>\n", escape(&page.description)));

        if let Some(example) = &page.example {
            body.push_str("<h2>Example</h2>\n");
            body.push_str(&format!("<pre><code class=\"language-json\">{}</code></pre>\n", escape(example)));
        }

        Self::wrap(&page.title, &body)
    }

    fn render_index(&self, pages: &[DocPage], generated_at: DateTime<Utc>) -> String {
        let mut body = String::from("<h1>Schema Reference</h1>\n<ul>\n");
        for page in pages {
            body.push_str(&format!(
                "<li><a href=\"{}\"><code>{}</code></a> {}</li>\n",
                escape(&self.file_name(&page.file_stem).display().to_string()),
                escape(&page.display_path),
                escape(&page.title)
            ));
        }
        body.push_str("</ul>\n");
        body.push_str(&format!(
            "<p><em>{} paths, generated {}</em></p>\n",
            pages.len(),
            generated_at.format("%Y-%m-%d %H:%M UTC")
        ));

        Self::wrap("Schema Reference", &body)
    }
}

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
