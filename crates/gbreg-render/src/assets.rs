//! Site stylesheet.

/// Stylesheet pipeline.
pub struct AssetPipeline;

impl AssetPipeline {
    /// The site stylesheet.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* Graph-Break Registry */

:root {
  --background: #ffffff;
  --foreground: #1f2328;
  --muted: #6b7280;
  --border: #d1d5db;
  --accent: #ee4c2c;
  --header: #333333;
  --code-background: #f5f5f5;
  --content-max-width: 65ch;
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  padding-top: 60px;
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

/* Header */
.site-header {
  position: fixed;
  top: 0;
  left: 0;
  width: 100%;
  z-index: 1000;
  padding: 10px 20px;
  background: var(--header);
  box-shadow: 0 2px 5px rgba(0, 0, 0, 0.2);
}

.site-header nav {
  display: flex;
  gap: 20px;
}

.site-header a {
  color: #ffffff;
  text-decoration: none;
  padding: 5px 10px;
  border-radius: 4px;
  transition: background-color 0.3s ease;
}

.site-header a:hover {
  background-color: #575757;
}

/* Content */
.content {
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 1.5rem;
}

.content a {
  color: var(--accent);
}

.intro,
.placeholder,
.caption {
  color: var(--muted);
}

.placeholder,
.caption {
  font-style: italic;
}

.caption {
  font-size: 0.875rem;
}

.section-label {
  font-weight: 700;
  margin: 1.5rem 0 0.5rem;
}

.content pre {
  background: var(--code-background);
  border: 1px solid var(--border);
  border-radius: 0.5rem;
  padding: 1rem;
  overflow-x: auto;
}

.content code {
  font-family: ui-monospace, monospace;
  font-size: 0.875em;
}

/* Search */
.search {
  margin-bottom: 1rem;
}

.search input {
  width: 100%;
  max-width: 36rem;
  padding: 0.5rem 0.75rem;
  border: 1px solid var(--border);
  border-radius: 0.25rem;
  font: inherit;
}

/* Dashboard */
.metric-container {
  display: flex;
  flex-wrap: wrap;
  gap: 20px;
  margin-top: 30px;
  justify-content: center;
}

.metric-box {
  flex: 1;
  min-width: 200px;
  max-width: 300px;
  padding: 20px;
  text-align: center;
  background: #f9f9f9;
  border: 1px solid #dddddd;
  border-radius: 8px;
  box-shadow: 0 4px 8px rgba(0, 0, 0, 0.1);
}

.metric-box h3 {
  margin-top: 0;
  font-size: 1.2em;
}

.metric-box p {
  margin-bottom: 0;
  font-size: 2em;
  font-weight: 700;
  color: var(--accent);
}
"#;
