//! View models for the list, detail and dashboard pages.
//!
//! Views hold field values already rendered by a [`Markup`], so templates
//! only arrange them.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;

use gbreg_registry::{normalize_id, slug, FlatRecord, Registry, RegistryEntry};

use crate::markup::{Format, Markup};

/// Bytes escaped when an id is used as one URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Heading of the listing page.
pub const REGISTRY_TITLE: &str = "Graph-Break Registry";

/// Intro line under the listing heading.
pub const REGISTRY_INTRO: &str = "Below are all known graph breaks detected by Dynamo.";

/// Shown when a search matches nothing.
pub const NO_MATCHES: &str = "No graph breaks match this search.";

pub const NO_CONTEXT: &str = "No context provided.";
pub const NO_EXPLANATION: &str = "No explanation provided.";
pub const NO_HINTS: &str = "No hints provided.";

/// Heading for the optional notes list.
pub const ADDITIONAL_INFO: &str = "Additional Information";

/// Label and caption of one detail section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeading {
    pub label: &'static str,
    pub caption: &'static str,
}

/// Detail sections, in display order.
pub const SECTIONS: [SectionHeading; 4] = [
    SectionHeading {
        label: "Graph-Break Type",
        caption: "short name describing what triggered the graph break",
    },
    SectionHeading {
        label: "Context",
        caption: "values or code snippet captured at the break point",
    },
    SectionHeading {
        label: "Explanation",
        caption: "why this specific graph break happened",
    },
    SectionHeading {
        label: "Hints",
        caption: "suggestions for fixing or working around the break",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkStyle {
    /// Live site routes (`/gb/GB0001`)
    Routes,
    /// Exported files (`gb/gb0001.html`)
    Files(Format),
}

/// Site-wide values and link targets for one page location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    /// Site title
    pub title: String,
    /// Link to the listing page
    pub home: String,
    /// Link to the dashboard page
    pub dashboard: String,
    /// Link to the stylesheet
    pub stylesheet: String,
    #[serde(skip)]
    prefix: String,
    #[serde(skip)]
    style: LinkStyle,
}

impl Site {
    /// Links for the live site.
    pub fn live(title: impl Into<String>) -> Self {
        Self::build(title.into(), String::from("/"), LinkStyle::Routes)
    }

    /// Links for a page at the root of an exported site.
    pub fn export(title: impl Into<String>, format: Format) -> Self {
        Self::build(title.into(), String::new(), LinkStyle::Files(format))
    }

    /// Links for a page one directory below this one.
    pub fn nested(&self) -> Self {
        match self.style {
            LinkStyle::Routes => self.clone(),
            LinkStyle::Files(_) => {
                Self::build(self.title.clone(), format!("../{}", self.prefix), self.style)
            }
        }
    }

    fn build(title: String, prefix: String, style: LinkStyle) -> Self {
        let (home, dashboard) = match style {
            LinkStyle::Routes => (prefix.clone(), format!("{}dashboard", prefix)),
            LinkStyle::Files(format) => (
                format!("{}index.{}", prefix, format.extension()),
                format!("{}dashboard.{}", prefix, format.extension()),
            ),
        };

        Self {
            title,
            home,
            dashboard,
            stylesheet: format!("{}assets/style.css", prefix),
            prefix,
            style,
        }
    }

    /// Link to the detail page of `id`.
    pub fn detail_href(&self, id: &str) -> String {
        match self.style {
            LinkStyle::Routes => format!(
                "{}gb/{}",
                self.prefix,
                utf8_percent_encode(id, PATH_SEGMENT)
            ),
            LinkStyle::Files(format) => {
                format!("{}gb/{}.{}", self.prefix, slug(id), format.extension())
            }
        }
    }
}

/// One listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub id: String,
    pub href: String,
    /// Rendered type label
    pub label: String,
}

/// The registry listing, optionally filtered by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListPage {
    pub title: &'static str,
    pub intro: &'static str,
    pub items: Vec<ListItem>,
    /// Current search text, when the page carries a search box
    pub query: Option<String>,
    pub searchable: bool,
    pub empty_message: &'static str,
}

impl ListPage {
    /// Build a listing of `records` in the given order.
    pub fn build<'a, I>(records: I, site: &Site, markup: &dyn Markup) -> Self
    where
        I: IntoIterator<Item = &'a FlatRecord>,
    {
        let items = records
            .into_iter()
            .map(|record| ListItem {
                id: record.id.clone(),
                href: site.detail_href(&record.id),
                label: markup.inline(&record.entry.gb_type),
            })
            .collect();

        Self {
            title: REGISTRY_TITLE,
            intro: REGISTRY_INTRO,
            items,
            query: None,
            searchable: false,
            empty_message: NO_MATCHES,
        }
    }

    /// Add a search box showing `query`.
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self.searchable = true;
        self
    }
}

/// One labeled detail section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub label: &'static str,
    pub caption: &'static str,
    /// Rendered section body
    pub body: String,
}

/// Detail page for a single GBID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailPage {
    /// Upper-cased GBID
    pub id: String,
    pub sections: Vec<Section>,
    /// Rendered notes list, absent when there are no notes
    pub additional_info: Option<String>,
    pub additional_info_label: &'static str,
}

impl DetailPage {
    /// Render an entry's fields with placeholders for missing ones.
    pub fn build(id: &str, entry: &RegistryEntry, markup: &dyn Markup) -> Self {
        let [gb_type, context, explanation, hints] = SECTIONS;

        let context_body = match entry.context_text() {
            Some(text) => markup.verbatim(text),
            None => markup.placeholder(NO_CONTEXT),
        };

        let explanation_body = match entry.explanation_text() {
            Some(text) => markup.block(text),
            None => markup.placeholder(NO_EXPLANATION),
        };

        let hints_body = if entry.hints.is_empty() {
            markup.placeholder(NO_HINTS)
        } else {
            markup.list(&entry.hints)
        };

        let additional_info = match entry.additional_info() {
            [] => None,
            notes => Some(markup.list(notes)),
        };

        Self {
            id: normalize_id(id),
            sections: vec![
                Section::new(gb_type, markup.block(&entry.gb_type)),
                Section::new(context, context_body),
                Section::new(explanation, explanation_body),
                Section::new(hints, hints_body),
            ],
            additional_info,
            additional_info_label: ADDITIONAL_INFO,
        }
    }
}

impl Section {
    fn new(heading: SectionHeading, body: String) -> Self {
        Self {
            label: heading.label,
            caption: heading.caption,
            body,
        }
    }
}

/// Page shown for an id with no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFoundPage {
    /// Upper-cased requested id
    pub id: String,
}

impl NotFoundPage {
    pub fn new(id: &str) -> Self {
        Self {
            id: normalize_id(id),
        }
    }
}

/// Registry coverage counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardPage {
    pub total: usize,
    pub with_additional_info: usize,
    pub with_missing_content: usize,
}

impl DashboardPage {
    /// Count current entries in `registry`.
    pub fn from_registry(registry: &Registry) -> Self {
        registry
            .current_entries()
            .fold(Self::default(), |mut counts, (_, entry)| {
                counts.total += 1;
                if !entry.additional_info().is_empty() {
                    counts.with_additional_info += 1;
                }
                if entry.has_missing_content() {
                    counts.with_missing_content += 1;
                }
                counts
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{HtmlMarkup, MarkdownMarkup};
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        Registry::from_json(
            r#"{
                "GB0001": [{"Gb_type": "unsupported operator", "Hints": ["rewrite using supported op"]}],
                "GB0002": [{
                    "Gb_type": "see [issue](https://example.com/1)",
                    "Context": "x = <tensor>",
                    "Explanation": "Branches on **data**.",
                    "Hints": ["a", "b"],
                    "Additional_Info": ["note"]
                }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn live_links() {
        let site = Site::live("Registry");

        assert_eq!(site.home, "/");
        assert_eq!(site.dashboard, "/dashboard");
        assert_eq!(site.stylesheet, "/assets/style.css");
        assert_eq!(site.detail_href("GB0001"), "/gb/GB0001");
        assert_eq!(site.nested(), site);
    }

    #[test]
    fn live_links_escape_id_segment() {
        let site = Site::live("Registry");

        assert_eq!(
            site.detail_href("GB 1/a#b?c%"),
            "/gb/GB%201%2Fa%23b%3Fc%25"
        );
    }

    #[test]
    fn export_links() {
        let site = Site::export("Registry", Format::Html);
        assert_eq!(site.home, "index.html");
        assert_eq!(site.detail_href("GB0001"), "gb/gb0001.html");

        let nested = site.nested();
        assert_eq!(nested.home, "../index.html");
        assert_eq!(nested.dashboard, "../dashboard.html");
        assert_eq!(nested.stylesheet, "../assets/style.css");

        let md = Site::export("Registry", Format::Markdown);
        assert_eq!(md.detail_href("GB0001"), "gb/gb0001.md");
    }

    #[test]
    fn list_has_one_item_per_record() {
        let records = registry().flatten();
        let page = ListPage::build(&records, &Site::live("R"), &HtmlMarkup);

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].href, "/gb/GB0001");
        assert_eq!(page.items[0].label, "unsupported operator");
        assert!(page.items[1]
            .label
            .contains(r#"target="_blank" rel="noopener noreferrer""#));
        assert!(!page.searchable);
    }

    #[test]
    fn list_with_search_echoes_query() {
        let page = ListPage::build(&Vec::<FlatRecord>::new(), &Site::live("R"), &HtmlMarkup)
            .with_search("op");

        assert!(page.searchable);
        assert_eq!(page.query.as_deref(), Some("op"));
        assert!(page.items.is_empty());
    }

    #[test]
    fn detail_uses_fixed_sections_in_order() {
        let registry = registry();
        let entry = registry.current("GB0002").unwrap();
        let page = DetailPage::build("gb0002", entry, &HtmlMarkup);

        assert_eq!(page.id, "GB0002");
        let labels: Vec<&str> = page.sections.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["Graph-Break Type", "Context", "Explanation", "Hints"]);
        let captions: Vec<&str> = page.sections.iter().map(|s| s.caption).collect();
        assert_eq!(
            captions,
            vec![
                "short name describing what triggered the graph break",
                "values or code snippet captured at the break point",
                "why this specific graph break happened",
                "suggestions for fixing or working around the break",
            ]
        );
    }

    #[test]
    fn detail_renders_present_fields() {
        let registry = registry();
        let page = DetailPage::build("GB0002", registry.current("GB0002").unwrap(), &HtmlMarkup);

        assert_eq!(page.sections[1].body, "<pre><code>x = &lt;tensor&gt;</code></pre>");
        assert!(page.sections[2].body.contains("<strong>data</strong>"));
        assert!(page.sections[3].body.contains("<li>a</li>"));
        assert_eq!(
            page.additional_info.as_deref(),
            Some("<ul>\n<li>note</li>\n</ul>")
        );
    }

    #[test]
    fn detail_uses_placeholders_for_missing_fields() {
        let registry = registry();
        let page = DetailPage::build("GB0001", registry.current("GB0001").unwrap(), &MarkdownMarkup);

        assert_eq!(page.sections[0].body, "unsupported operator");
        assert_eq!(page.sections[1].body, "*No context provided.*");
        assert_eq!(page.sections[2].body, "*No explanation provided.*");
        assert_eq!(page.sections[3].body, "- rewrite using supported op");
        assert_eq!(page.additional_info, None);
    }

    #[test]
    fn empty_type_has_no_placeholder() {
        let page = DetailPage::build("GB0009", &RegistryEntry::default(), &HtmlMarkup);

        assert_eq!(page.sections[0].body, "");
        assert!(page.sections[3].body.contains(NO_HINTS));
    }

    #[test]
    fn not_found_upper_cases_id() {
        assert_eq!(NotFoundPage::new("gb0042").id, "GB0042");
    }

    #[test]
    fn dashboard_counts() {
        let counts = DashboardPage::from_registry(&registry());

        assert_eq!(
            counts,
            DashboardPage {
                total: 2,
                with_additional_info: 1,
                with_missing_content: 1,
            }
        );
    }

    #[test]
    fn placeholder_pages_are_counted_as_missing_content() {
        let registry = Registry::from_json(
            r#"{"GB0003": [{"Gb_type": "t", "Context": "", "Explanation": "", "Hints": ["h"]}]}"#,
        )
        .unwrap();
        let page = DetailPage::build("GB0003", registry.current("GB0003").unwrap(), &HtmlMarkup);

        assert!(page.sections[1].body.contains(NO_CONTEXT));
        assert!(page.sections[2].body.contains(NO_EXPLANATION));
        assert_eq!(DashboardPage::from_registry(&registry).with_missing_content, 1);
    }
}
