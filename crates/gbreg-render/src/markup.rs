//! Output formats for rendered registry fields.

use serde::{Deserialize, Serialize};

use crate::markdown::{escape_html, render_inline, render_markdown};

/// Page format produced by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Markdown,
    Html,
}

impl Format {
    /// File extension for pages in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }

    /// Field renderer for this format.
    pub fn markup(self) -> &'static dyn Markup {
        match self {
            Self::Markdown => &MarkdownMarkup,
            Self::Html => &HtmlMarkup,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
        })
    }
}

/// Renders registry field values into one output format.
///
/// Field values are markdown source as published in the registry.
pub trait Markup: Send + Sync {
    /// Format this markup produces
    fn format(&self) -> Format;

    /// Rich text as a block.
    fn block(&self, source: &str) -> String;

    /// Rich text without a paragraph wrapper.
    fn inline(&self, source: &str) -> String;

    /// Text shown exactly as captured.
    fn verbatim(&self, text: &str) -> String;

    /// Fixed text standing in for a missing field.
    fn placeholder(&self, text: &str) -> String;

    /// Unordered list with one inline item per entry.
    fn list(&self, items: &[String]) -> String;
}

/// HTML fragments via pulldown-cmark.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMarkup;

impl Markup for HtmlMarkup {
    fn format(&self) -> Format {
        Format::Html
    }

    fn block(&self, source: &str) -> String {
        render_markdown(source)
    }

    fn inline(&self, source: &str) -> String {
        render_inline(source)
    }

    fn verbatim(&self, text: &str) -> String {
        format!("<pre><code>{}</code></pre>", escape_html(text))
    }

    fn placeholder(&self, text: &str) -> String {
        format!(r#"<p class="placeholder">{}</p>"#, escape_html(text))
    }

    fn list(&self, items: &[String]) -> String {
        let mut html = String::from("<ul>\n");
        for item in items {
            html.push_str("<li>");
            html.push_str(&render_inline(item));
            html.push_str("</li>\n");
        }
        html.push_str("</ul>");
        html
    }
}

/// Markdown source passed through for hosts that render it themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownMarkup;

impl Markup for MarkdownMarkup {
    fn format(&self) -> Format {
        Format::Markdown
    }

    fn block(&self, source: &str) -> String {
        source.trim().to_string()
    }

    fn inline(&self, source: &str) -> String {
        fold_lines(source)
    }

    fn verbatim(&self, text: &str) -> String {
        let fence = "`".repeat(longest_backtick_run(text).max(2) + 1);
        format!("{fence}\n{}\n{fence}", text.trim_end_matches('\n'))
    }

    fn placeholder(&self, text: &str) -> String {
        format!("*{}*", text)
    }

    fn list(&self, items: &[String]) -> String {
        items
            .iter()
            .map(|item| format!("- {}", fold_lines(item)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Join non-blank lines with single spaces.
fn fold_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0)
}
