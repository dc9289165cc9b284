//! Markdown output

use chrono::{DateTime, Utc};

use super::{DocPage, PageRenderer};

/// Renders pages as Markdown
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl PageRenderer for MarkdownRenderer {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn render_page(&self, page: &DocPage) -> String {
        let mut md = String::new();
        md.push_str(&format!("# {}\n\n", page.title));
        md.push_str(&format!("**Path:** `{}`\n\n", page.display_path));
        md.push_str(&format!("**Type:** {}\n\n", page.schema_type));
        if let Some(reference) = &page.reference {
            md.push_str(&format!("**Reference:** `{}`\n\n", reference));
        }
        md.push_str(&format!("{}\n", page.description));

        if let Some(example) = &page.example {
            md.push_str("\n## Example\n\n```json\n");
            md.push_str(example);
            md.push_str("\n```\n");
        }

        md
    }

    fn render_index(&self, pages: &[DocPage], generated_at: DateTime<Utc>) -> String {
        let mut md = String::new();
        md.push_str("# Schema Reference\n\n");

        for page in pages {
            md.push_str(&format!(
                "- [`{}`]({}) {}\n",
                page.display_path,
                self.file_name(&page.file_stem).display(),
                page.title
            ));
        }

        md.push_str(&format!(
            "\n_{} paths, generated {}_\n",
            pages.len(),
            generated_at.format("%Y-%m-%d %H:%M UTC")
        ));
        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::FlatPath;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_render_page() {
        let node = json!({ "title": "Position", "type": "object", "example": { "latitude": 52.0 } });
        let page = DocPage::from_entry(&FlatPath::parse("/vessels/*/navigation/position"), &node, "<RegExp>");

        let md = MarkdownRenderer.render_page(&page);
        assert!(md.starts_with("# Position\n"));
        assert!(md.contains("**Path:** `/vessels/<RegExp>/navigation/position`"));
        assert!(md.contains("**Type:** object"));
        assert!(md.contains("No description"));
        assert!(md.contains("```json\n{\n  \"latitude\": 52.0\n}\n```"));
    }

    #[test]
    fn test_render_index() {
        let pages = vec![
            DocPage::from_entry(&FlatPath::parse("/a"), &json!({ "title": "A" }), "<RegExp>"),
            DocPage::from_entry(&FlatPath::parse("/a/b"), &json!({}), "<RegExp>"),
        ];
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

        let md = MarkdownRenderer.render_index(&pages, at);
        assert!(md.contains("- [`/a`](a.md) A\n"));
        assert!(md.contains("- [`/a/b`](a.b.md) No title\n"));
        assert!(md.contains("_2 paths, generated 2024-05-01 12:30 UTC_"));
    }
}
