//! Markdown to HTML rendering.

use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Render markdown as block HTML.
///
/// Links open in a new browsing context.
pub fn render_markdown(content: &str) -> String {
    let parser = Parser::new_ext(content, options())
        .map(raw_html_as_text)
        .map(external_link);

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}

/// Render markdown without its top-level paragraph wrapper.
///
/// Used where the text must sit inside an existing element such as a
/// list item. Consecutive top-level paragraphs are joined by a line break.
pub fn render_inline(content: &str) -> String {
    let mut depth = 0usize;
    let mut paragraphs = 0usize;

    let events = Parser::new_ext(content, options())
        .map(raw_html_as_text)
        .map(external_link)
        .filter_map(move |event| match event {
            Event::Start(Tag::Paragraph) if depth == 0 => {
                paragraphs += 1;
                (paragraphs > 1).then_some(Event::SoftBreak)
            }
            Event::End(TagEnd::Paragraph) if depth == 0 => None,
            Event::Start(_) => {
                depth += 1;
                Some(event)
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                Some(event)
            }
            _ => Some(event),
        });

    let mut html_output = String::new();
    html::push_html(&mut html_output, events);

    html_output.trim_end().to_string()
}

/// Show HTML written in the source as text instead of markup.
fn raw_html_as_text(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        other => other,
    }
}

/// Rewrite link tags so they open in a new browsing context.
fn external_link(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            ..
        }) => {
            let href = match link_type {
                LinkType::Email => format!("mailto:{}", &*dest_url),
                _ => dest_url.to_string(),
            };

            let mut tag = format!(r#"<a href="{}""#, escape_html(&href));
            if !title.is_empty() {
                tag.push_str(&format!(r#" title="{}""#, escape_html(&title)));
            }
            tag.push_str(r#" target="_blank" rel="noopener noreferrer">"#);

            Event::InlineHtml(CowStr::from(tag))
        }
        Event::End(TagEnd::Link) => Event::InlineHtml(CowStr::Borrowed("</a>")),
        other => other,
    }
}

/// Escape text for HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
