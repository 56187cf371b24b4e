//! Static registry exporter.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use gbreg_registry::{slug, FetchError, FlatRecord, Registry, RegistryClient, RegistryConfig};
use gbreg_render::{
    AssetPipeline, DashboardPage, DetailPage, Format, ListPage, Site, TemplateEngine,
    REGISTRY_TITLE,
};

/// Configuration for a static export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output directory
    pub output_dir: PathBuf,

    /// Page format
    pub format: Format,

    /// Site title
    pub title: String,

    /// Minify the stylesheet
    pub minify: bool,

    /// Registry source
    pub registry: RegistryConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("gbid_directory"),
            format: Format::Markdown,
            title: REGISTRY_TITLE.to_string(),
            minify: true,
            registry: RegistryConfig::default(),
        }
    }
}

/// Result of an export.
#[derive(Debug)]
pub struct ExportResult {
    /// Number of pages written
    pub pages: usize,

    /// Format of the written pages
    pub format: Format,

    /// Output directory
    pub output_dir: PathBuf,

    /// Total export time in milliseconds
    pub duration_ms: u64,
}

/// Errors that can occur during export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to render {page}: {source}")]
    Template {
        page: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to generate {name}: {message}")]
    Asset { name: String, message: String },
}

/// Front matter opening every exported markdown page.
#[derive(Debug, Serialize)]
struct FrontMatter<'a> {
    layout: &'a str,
    title: &'a str,
}

/// Jekyll site settings written next to markdown exports.
#[derive(Debug, Serialize)]
struct JekyllConfig<'a> {
    title: &'a str,
    description: &'a str,
    theme: &'a str,
    remote_theme: &'a str,
    plugins: [&'a str; 1],
}

/// Page shell for markdown exports, rendered by Jekyll.
const JEKYLL_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ page.title | default: site.title }}</title>
  <link rel="stylesheet" href="{{ "/assets/style.css" | relative_url }}">
</head>
<body>
  <header class="site-header">
    <nav>
      <a href="{{ "/" | relative_url }}">Home</a>
      <a href="{{ "/dashboard.html" | relative_url }}">Dashboard</a>
    </nav>
  </header>
  <main class="content">
{{ content }}
  </main>
</body>
</html>
"#;

/// One row of the HTML export's search index.
#[derive(Debug, Serialize)]
struct SearchEntry<'a> {
    id: &'a str,
    url: String,
    #[serde(rename = "Gb_type")]
    gb_type: &'a str,
    #[serde(rename = "Explanation", skip_serializing_if = "Option::is_none")]
    explanation: Option<&'a str>,
    #[serde(rename = "Context", skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

/// Writes the registry as a static site.
pub struct Exporter {
    config: ExportConfig,
    templates: TemplateEngine,
}

impl Exporter {
    /// Create a new exporter.
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
        }
    }

    /// Fetch the registry and export it.
    pub async fn run(&self) -> Result<ExportResult, ExportError> {
        let client = RegistryClient::new(self.config.registry.clone())?;
        let registry = client.fetch().await?;

        tracing::info!(
            "Fetched {} graph breaks from {}",
            registry.len(),
            self.config.registry.url
        );

        self.export(&registry)
    }

    /// Export an already fetched registry.
    ///
    /// Files are written one at a time; existing files are overwritten.
    pub fn export(&self, registry: &Registry) -> Result<ExportResult, ExportError> {
        let start = Instant::now();
        let format = self.config.format;
        let markup = format.markup();
        let out = &self.config.output_dir;

        let site = Site::export(self.config.title.clone(), format);
        let nested = site.nested();
        let records = registry.flatten();

        let mut pages = 0;

        let listing = ListPage::build(&records, &site, markup);
        let body = self
            .templates
            .render_list(format, &site, &listing)
            .map_err(|e| template_error("listing", e))?;
        self.write_page(&out.join(page_name("index", format)), listing.title, &body)?;
        pages += 1;

        for record in &records {
            let page = DetailPage::build(&record.id, &record.entry, markup);
            let body = self
                .templates
                .render_detail(format, &nested, &page)
                .map_err(|e| template_error(&record.id, e))?;

            let path = out.join("gb").join(page_name(&slug(&record.id), format));
            self.write_page(&path, &page.id, &body)?;
            pages += 1;
        }

        let dashboard = DashboardPage::from_registry(registry);
        let body = self
            .templates
            .render_dashboard(format, &site, &dashboard)
            .map_err(|e| template_error("dashboard", e))?;
        self.write_page(
            &out.join(page_name("dashboard", format)),
            "Graph Break Dashboard",
            &body,
        )?;
        pages += 1;

        self.generate_assets()?;
        match format {
            Format::Markdown => self.generate_jekyll_site()?,
            Format::Html => self.generate_search_index(&records, &site)?,
        }

        let duration = start.elapsed();
        tracing::info!("Exported {} pages to {}", pages, out.display());

        Ok(ExportResult {
            pages,
            format,
            output_dir: out.clone(),
            duration_ms: duration.as_millis() as u64,
        })
    }

    /// Write a page, prefixed with front matter for markdown output.
    fn write_page(&self, path: &Path, title: &str, body: &str) -> Result<(), ExportError> {
        let contents = match self.config.format {
            Format::Markdown => {
                let front = yaml(
                    "front matter",
                    &FrontMatter {
                        layout: "default",
                        title,
                    },
                )?;
                format!("---\n{}---\n\n{}", front, body)
            }
            Format::Html => body.to_string(),
        };

        write_file(path, &contents)
    }

    /// Jekyll settings plus the `default` layout every page names.
    fn generate_jekyll_site(&self) -> Result<(), ExportError> {
        let config = yaml(
            "_config.yml",
            &JekyllConfig {
                title: &self.config.title,
                description: "Graph breaks detected by Dynamo",
                theme: "jekyll-theme-minimal",
                remote_theme: "pages-themes/minimal@v0.2.0",
                plugins: ["jekyll-remote-theme"],
            },
        )?;

        write_file(&self.config.output_dir.join("_config.yml"), &config)?;

        write_file(
            &self.config.output_dir.join("_layouts").join("default.html"),
            JEKYLL_LAYOUT,
        )
    }

    fn generate_assets(&self) -> Result<(), ExportError> {
        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).map_err(|message| ExportError::Asset {
                name: "assets/style.css".to_string(),
                message,
            })?
        } else {
            css
        };

        write_file(
            &self.config.output_dir.join("assets").join("style.css"),
            &css,
        )
    }

    /// Generate search index.
    fn generate_search_index(
        &self,
        records: &[FlatRecord],
        site: &Site,
    ) -> Result<(), ExportError> {
        let index: Vec<SearchEntry<'_>> = records
            .iter()
            .map(|record| SearchEntry {
                id: &record.id,
                url: site.detail_href(&record.id),
                gb_type: &record.entry.gb_type,
                explanation: record.entry.explanation.as_deref(),
                context: record.entry.context.as_deref(),
            })
            .collect();

        let json = serde_json::to_string_pretty(&index).map_err(|e| ExportError::Asset {
            name: "search-index.json".to_string(),
            message: e.to_string(),
        })?;

        write_file(&self.config.output_dir.join("search-index.json"), &json)
    }
}

fn page_name(stem: &str, format: Format) -> String {
    format!("{}.{}", stem, format.extension())
}

fn template_error(page: &str, source: minijinja::Error) -> ExportError {
    ExportError::Template {
        page: page.to_string(),
        source,
    }
}

fn yaml<T: Serialize>(name: &str, value: &T) -> Result<String, ExportError> {
    serde_yaml::to_string(value).map_err(|e| ExportError::Asset {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Write `contents` to `path`, creating parent directories.
fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ExportError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, contents).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
