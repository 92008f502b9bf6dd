//! Page scaffold: app bar, upload prompt and the results region, plus the HTML
//! document the page is written to.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::distributor::ResultsRegion;
use crate::model::ServiceMetadata;
use crate::ui::components::app_bar::{self, AppBar};
use crate::ui::components::upload_prompt::{self, UploadPrompt};
use crate::ui::element::escape;
use crate::ui::registry::{ComponentRegistry, RegistryError};
use crate::ui::{Component, Element};

const STYLESHEET: &str = "\
body { font-family: system-ui, sans-serif; margin: 0; }
.content { max-width: 1200px; margin: 0 auto; padding: 24px; }
.file-upload { border: 2px dashed #ccc; border-radius: 8px; padding: 32px; text-align: center; }
.row { display: flex; justify-content: space-between; margin-bottom: 8px; }
.val { font-family: monospace; }
.confidence-bar { height: 4px; background: #eee; border-radius: 2px; }
.fill { height: 100%; background: #006a6a; border-radius: 2px; }
.explanation-overlay .container { position: relative; display: inline-block; }
.explanation-overlay img { display: block; max-width: 100%; height: auto; }
.explanation-overlay .overlay { position: absolute; top: 0; left: 0; width: 100%; height: 100%; pointer-events: none; }
";

#[derive(Debug)]
pub struct Page {
    app_bar: Box<AppBar>,
    uploader: Box<UploadPrompt>,
}

impl Page {
    pub fn mount(registry: &ComponentRegistry) -> Result<Self, RegistryError> {
        Ok(Self {
            app_bar: registry.create_as::<AppBar>(app_bar::TAG)?,
            uploader: registry.create_as::<UploadPrompt>(upload_prompt::TAG)?,
        })
    }

    pub fn title(&self) -> &str {
        self.app_bar.title()
    }

    pub fn set_service(&mut self, service: Option<ServiceMetadata>) {
        self.app_bar.set_service(service);
    }

    pub fn render(&self, region: &ResultsRegion) -> Element {
        Element::empty()
            .with_child(self.app_bar.render())
            .with_child(
                Element::new("main")
                    .with_class("content")
                    .with_child(self.uploader.render().with_id("uploader"))
                    .with_child(region.render()),
            )
    }

    /// Standalone HTML document for `body`.
    pub fn to_document(&self, body: &Element) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape(self.title()),
            STYLESHEET,
            body.to_html()
        )
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to write report to {path}: {source}")]
pub struct ReportError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

static WRITE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Writes `html` to `path` through a temporary file so a reader never sees a
/// partial report.
pub async fn write_report(path: &Path, html: &str) -> Result<(), ReportError> {
    let unique_id = WRITE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_path = path.with_extension(format!("html.{}.{}.tmp", std::process::id(), unique_id));
    let err = |source| ReportError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(err)?;
    }

    tokio::fs::write(&temp_path, html).await.map_err(err)?;

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(err(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted() -> (Page, ResultsRegion) {
        let registry = ComponentRegistry::with_builtin().unwrap();
        (Page::mount(&registry).unwrap(), ResultsRegion::mount(&registry).unwrap())
    }

    #[test]
    fn initial_page_shows_prompt_but_not_results() {
        let (page, region) = mounted();
        let text = page.render(&region).to_text();

        assert!(text.contains("== Fetal Plane Explorer =="));
        assert!(text.contains(upload_prompt::INSTRUCTION));
        assert!(!text.contains("Prediction"));
    }

    #[test]
    fn document_wraps_the_page() {
        let (page, region) = mounted();
        let html = page.to_document(&page.render(&region));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Fetal Plane Explorer</title>"));
        assert!(html.contains("<div id=\"results-area\" hidden>"));
    }

    #[tokio::test]
    async fn report_is_replaced_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("report.html");

        write_report(&path, "<p>one</p>").await.unwrap();
        write_report(&path, "<p>two</p>").await.unwrap();

        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "<p>two</p>");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
