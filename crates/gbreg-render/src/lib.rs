//! Rendering for the graph-break registry site.
//!
//! Shared by the live server and the static exporter: markdown helpers,
//! output formats, page view models and the built-in templates.

pub mod assets;
pub mod markdown;
pub mod markup;
pub mod templates;
pub mod views;

pub use assets::AssetPipeline;
pub use markdown::{escape_html, render_inline, render_markdown};
pub use markup::{Format, HtmlMarkup, MarkdownMarkup, Markup};
pub use templates::TemplateEngine;
pub use views::{
    DashboardPage, DetailPage, ListItem, ListPage, NotFoundPage, Section, SectionHeading, Site,
    NO_CONTEXT, NO_EXPLANATION, NO_HINTS, REGISTRY_TITLE, SECTIONS,
};
