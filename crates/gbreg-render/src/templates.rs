//! Template engine for registry pages.

use minijinja::{context, Environment, Value};
use serde::Serialize;

use crate::markdown::escape_html;
use crate::markup::Format;
use crate::views::{DashboardPage, DetailPage, ListPage, NotFoundPage, Site};

/// Template engine using minijinja.
///
/// `.html` templates autoescape; `.md` templates emit text as is.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        // Attribute escaping that leaves URL slashes readable.
        env.add_filter("attr", |value: String| {
            Value::from_safe_string(escape_html(&value))
        });

        for (name, source) in TEMPLATES {
            env.add_template_owned(name.to_string(), source.to_string())
                .expect("Failed to add built-in template");
        }

        Self { env }
    }

    /// Render the registry listing.
    pub fn render_list(
        &self,
        format: Format,
        site: &Site,
        page: &ListPage,
    ) -> Result<String, minijinja::Error> {
        self.render(&page_template("index", format), site, page)
    }

    /// Render one entry's detail page.
    pub fn render_detail(
        &self,
        format: Format,
        site: &Site,
        page: &DetailPage,
    ) -> Result<String, minijinja::Error> {
        self.render(&page_template("detail", format), site, page)
    }

    /// Render the coverage dashboard.
    pub fn render_dashboard(
        &self,
        format: Format,
        site: &Site,
        page: &DashboardPage,
    ) -> Result<String, minijinja::Error> {
        self.render(&page_template("dashboard", format), site, page)
    }

    /// Render the page for an unknown id (live site only).
    pub fn render_not_found(
        &self,
        site: &Site,
        page: &NotFoundPage,
    ) -> Result<String, minijinja::Error> {
        self.render("not_found.html", site, page)
    }

    /// Render the generic failure page (live site only).
    pub fn render_error(&self, site: &Site) -> Result<String, minijinja::Error> {
        self.render("error.html", site, &())
    }

    fn render<S: Serialize>(
        &self,
        template: &str,
        site: &Site,
        page: &S,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context! {
            site => site,
            page => page,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn page_template(name: &str, format: Format) -> String {
    format!("{}.{}", name, format.extension())
}

const TEMPLATES: [(&str, &str); 9] = [
    ("base.html", BASE_TEMPLATE),
    ("index.html", INDEX_HTML),
    ("detail.html", DETAIL_HTML),
    ("dashboard.html", DASHBOARD_HTML),
    ("not_found.html", NOT_FOUND_HTML),
    ("error.html", ERROR_HTML),
    ("index.md", INDEX_MD),
    ("detail.md", DETAIL_MD),
    ("dashboard.md", DASHBOARD_MD),
];

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% block title %}{% endblock %}{{ site.title }}</title>
  <link rel="stylesheet" href="{{ site.stylesheet|attr }}">
</head>
<body>
  <header class="site-header">
    <nav>
      <a href="{{ site.home|attr }}">Home</a>
      <a href="{{ site.dashboard|attr }}">Dashboard</a>
    </nav>
  </header>
  <main class="content">
{% block content %}{% endblock %}
  </main>
</body>
</html>
"##;

const INDEX_HTML: &str = r##"{% extends "base.html" %}
{% block content %}
<h1>{{ page.title }}</h1>
<p class="intro">{{ page.intro }}</p>
{% if page.searchable %}
<form class="search" method="get" action="{{ site.home|attr }}">
  <input type="search" name="q" placeholder="Search Graph Breaks" value="{{ page.query or "" }}">
</form>
{% endif %}
{% if page.items %}
<ul class="registry">
{% for item in page.items %}
  <li><a href="{{ item.href|attr }}">{{ item.id }}</a> — {{ item.label|safe }}</li>
{% endfor %}
</ul>
{% else %}
<p class="placeholder">{{ page.empty_message }}</p>
{% endif %}
{% endblock %}
"##;

const DETAIL_HTML: &str = r##"{% extends "base.html" %}
{% block title %}{{ page.id }} - {% endblock %}
{% block content %}
<h1>{{ page.id }}</h1>
{% for section in page.sections %}
<section>
  <p class="section-label">{{ section.label }} <span class="caption">— {{ section.caption }}</span></p>
  {{ section.body|safe }}
</section>
{% endfor %}
{% if page.additional_info %}
<section>
  <p class="section-label">{{ page.additional_info_label }}</p>
  {{ page.additional_info|safe }}
</section>
{% endif %}
<p><a href="{{ site.home|attr }}">Back to Registry</a></p>
{% endblock %}
"##;

const DASHBOARD_HTML: &str = r##"{% extends "base.html" %}
{% block title %}Dashboard - {% endblock %}
{% block content %}
<h1>Graph Break Metrics Dashboard</h1>
<div class="metric-container">
  <div class="metric-box">
    <h3>Total Graph Breaks</h3>
    <p>{{ page.total }}</p>
  </div>
  <div class="metric-box">
    <h3>Graph Breaks with Additional Info</h3>
    <p>{{ page.with_additional_info }}</p>
  </div>
  <div class="metric-box">
    <h3>Graph Breaks with Missing Content</h3>
    <p>{{ page.with_missing_content }}</p>
  </div>
</div>
{% endblock %}
"##;

const NOT_FOUND_HTML: &str = r##"{% extends "base.html" %}
{% block title %}Not found - {% endblock %}
{% block content %}
<h1>GBID {{ page.id }} not found</h1>
<p><a href="{{ site.home|attr }}">Back to Registry</a></p>
{% endblock %}
"##;

const ERROR_HTML: &str = r##"{% extends "base.html" %}
{% block title %}Error - {% endblock %}
{% block content %}
<h1>Something went wrong</h1>
<p class="placeholder">The graph-break registry could not be loaded. Try again shortly.</p>
{% endblock %}
"##;

const INDEX_MD: &str = r##"# {{ page.title }}

{{ page.intro }}

{% for item in page.items %}
- [{{ item.id }}]({{ item.href }}) — {{ item.label }}
{% endfor %}

[Dashboard]({{ site.dashboard }})
"##;

const DETAIL_MD: &str = r##"# {{ page.id }}

{% for section in page.sections %}
## {{ section.label }}
*{{ section.caption }}*

{{ section.body }}

{% endfor %}
{% if page.additional_info %}
## {{ page.additional_info_label }}

{{ page.additional_info }}

{% endif %}
[Back to Registry]({{ site.home }}) · [Dashboard]({{ site.dashboard }})
"##;

const DASHBOARD_MD: &str = r##"# Graph Break Metrics Dashboard

| Metric | Count |
|---|---|
| Total Graph Breaks | {{ page.total }} |
| Graph Breaks with Additional Info | {{ page.with_additional_info }} |
| Graph Breaks with Missing Content | {{ page.with_missing_content }} |

[Back to Registry]({{ site.home }})
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{HtmlMarkup, MarkdownMarkup};
    use crate::views::{NO_CONTEXT, NO_EXPLANATION, NO_HINTS, SECTIONS};
    use gbreg_registry::{FlatRecord, Registry};
    use pretty_assertions::assert_eq;

    const EXAMPLE: &str =
        r#"{"GB0001": [{"Gb_type": "unsupported operator", "Hints": ["rewrite using supported op"]}]}"#;

    fn example() -> Registry {
        Registry::from_json(EXAMPLE).unwrap()
    }

    #[test]
    fn renders_html_listing() {
        let engine = TemplateEngine::new();
        let site = Site::live("Graph-Break Registry");
        let records = example().flatten();
        let page = ListPage::build(&records, &site, &HtmlMarkup);

        let html = engine.render_list(Format::Html, &site, &page).unwrap();

        assert!(html.contains("<title>Graph-Break Registry</title>"));
        assert!(html.contains(r#"<li><a href="/gb/GB0001">GB0001</a> — unsupported operator</li>"#));
        assert!(html.contains(r#"<link rel="stylesheet" href="/assets/style.css">"#));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn renders_search_box_with_escaped_query() {
        let engine = TemplateEngine::new();
        let site = Site::live("Registry");
        let page = ListPage::build(&Vec::<FlatRecord>::new(), &site, &HtmlMarkup)
            .with_search(r#"a"b"#);

        let html = engine.render_list(Format::Html, &site, &page).unwrap();

        assert!(html.contains(r#"name="q""#));
        assert!(html.contains("value=\"a&quot;b\""));
        assert!(html.contains("No graph breaks match this search."));
    }

    #[test]
    fn renders_markdown_listing() {
        let engine = TemplateEngine::new();
        let site = Site::export("Registry", Format::Markdown);
        let records = example().flatten();
        let page = ListPage::build(&records, &site, &MarkdownMarkup);

        let md = engine.render_list(Format::Markdown, &site, &page).unwrap();

        assert_eq!(
            md,
            "# Graph-Break Registry\n\n\
             Below are all known graph breaks detected by Dynamo.\n\n\
             - [GB0001](gb/gb0001.md) — unsupported operator\n\n\
             [Dashboard](dashboard.md)\n"
        );
    }

    #[test]
    fn renders_html_detail_sections_in_order() {
        let engine = TemplateEngine::new();
        let site = Site::live("Registry");
        let registry = example();
        let page = DetailPage::build("gb0001", registry.current("gb0001").unwrap(), &HtmlMarkup);

        let html = engine.render_detail(Format::Html, &site, &page).unwrap();

        assert!(html.contains("<h1>GB0001</h1>"));
        let mut last = 0;
        for heading in SECTIONS {
            let at = html[last..].find(heading.caption).expect(heading.caption) + last;
            assert!(at >= last);
            last = at;
        }
        assert!(html.contains("<li>rewrite using supported op</li>"));
        assert!(html.contains(NO_CONTEXT));
        assert!(html.contains(NO_EXPLANATION));
        assert!(!html.contains(NO_HINTS));
        assert!(!html.contains("Additional Information"));
    }

    #[test]
    fn renders_markdown_detail() {
        let engine = TemplateEngine::new();
        let site = Site::export("Registry", Format::Markdown).nested();
        let registry = example();
        let page = DetailPage::build("GB0001", registry.current("GB0001").unwrap(), &MarkdownMarkup);

        let md = engine.render_detail(Format::Markdown, &site, &page).unwrap();

        assert_eq!(
            md,
            "# GB0001\n\n\
             ## Graph-Break Type\n\
             *short name describing what triggered the graph break*\n\n\
             unsupported operator\n\n\
             ## Context\n\
             *values or code snippet captured at the break point*\n\n\
             *No context provided.*\n\n\
             ## Explanation\n\
             *why this specific graph break happened*\n\n\
             *No explanation provided.*\n\n\
             ## Hints\n\
             *suggestions for fixing or working around the break*\n\n\
             - rewrite using supported op\n\n\
             [Back to Registry](../index.md) · [Dashboard](../dashboard.md)\n"
        );
    }

    #[test]
    fn renders_additional_info_when_present() {
        let engine = TemplateEngine::new();
        let site = Site::live("Registry");
        let registry = Registry::from_json(
            r#"{"GB0002": [{"Gb_type": "t", "Hints": [], "Additional_Info": ["see `x`"]}]}"#,
        )
        .unwrap();
        let page = DetailPage::build("GB0002", registry.current("GB0002").unwrap(), &HtmlMarkup);

        let html = engine.render_detail(Format::Html, &site, &page).unwrap();

        assert!(html.contains("Additional Information"));
        assert!(html.contains("<li>see <code>x</code></li>"));
    }

    #[test]
    fn renders_not_found() {
        let engine = TemplateEngine::new();

        let html = engine
            .render_not_found(&Site::live("Registry"), &NotFoundPage::new("gb9999"))
            .unwrap();

        assert!(html.contains("GBID GB9999 not found"));
    }

    #[test]
    fn renders_dashboard() {
        let engine = TemplateEngine::new();
        let site = Site::export("Registry", Format::Html);
        let page = DashboardPage::from_registry(&example());

        let html = engine.render_dashboard(Format::Html, &site, &page).unwrap();

        assert!(html.contains("<h3>Total Graph Breaks</h3>\n    <p>1</p>"));
        assert!(html.contains(r#"href="index.html""#));
    }

    #[test]
    fn renders_error_page() {
        let html = TemplateEngine::new()
            .render_error(&Site::live("Registry"))
            .unwrap();

        assert!(html.contains("Something went wrong"));
    }
}
