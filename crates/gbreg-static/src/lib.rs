//! Static site exporter for the graph-break registry.
//!
//! Fetches the registry once and writes a listing page, one detail page per
//! GBID, and a dashboard, as Markdown for Jekyll hosts or as plain HTML.

pub mod exporter;

pub use exporter::{ExportConfig, ExportError, ExportResult, Exporter};
pub use gbreg_render::Format as ExportFormat;
