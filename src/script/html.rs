//! Delivery of a scene script: JSON, a JS loader, an HTML page or a debug folder.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{SceneError, SceneResult};
use crate::scene::session::Scene;

/// Global function the viewer runtime exposes; it receives the command array.
pub const VIEWER_ENTRY_POINT: &str = "scenescript";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Where the page gets the viewer runtime from.
pub enum ViewerRuntime {
    /// JavaScript source embedded in (or written next to) the page.
    Inline(String),
    /// Externally hosted runtime.
    Url(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Page options for [`Scene::save_as_html`].
pub struct HtmlOpts {
    /// Page title.
    pub title: String,
    /// Extra markup at the end of `<head>`.
    pub head_html: String,
    /// Markup of `<body>`.
    pub body_html: String,
    /// Write the scene script to this file (relative to the page) instead of inlining it.
    pub script_path: Option<String>,
    /// Write an inline runtime to this file (relative to the page) instead of inlining it.
    pub library_path: Option<String>,
}

impl Default for HtmlOpts {
    fn default() -> Self {
        Self {
            title: "Scene".to_string(),
            head_html: String::new(),
            body_html: String::new(),
            script_path: None,
            library_path: None,
        }
    }
}

fn write_file(path: &Path, contents: &str) -> SceneResult<()> {
    std::fs::write(path, contents).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

/// `<script>` tag that either references `src` or carries `body`.
///
/// An inline body has every `</` written as `<\/`, so ids or label text containing `</script>`
/// cannot close the tag early.
fn script_tag(src: Option<&str>, body: &str) -> String {
    match src {
        Some(src) => format!("<script src='{src}'></script>"),
        None => format!("<script>{}</script>", body.replace("</", "<\\/")),
    }
}

impl Scene {
    /// JavaScript that hands the commands to the viewer once the page has loaded.
    pub fn script(&self) -> SceneResult<String> {
        Ok(format!(
            "window.onload = function(){{\n    let commands = {};\n    {VIEWER_ENTRY_POINT}(null, commands);\n}}\n",
            self.json()?
        ))
    }

    /// Write the command array as JSON.
    pub fn save_as_json(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        write_file(path.as_ref(), &self.json()?)
    }

    /// Write the loader script, prefixed by the runtime source when one is given.
    ///
    /// Works after [`Scene::clear_script`], so successive chunks can be written to separate files.
    pub fn save_as_script(
        &self,
        path: impl AsRef<Path>,
        standalone_runtime: Option<&str>,
    ) -> SceneResult<()> {
        let mut out = String::new();
        if let Some(source) = standalone_runtime {
            out.push_str(source);
            out.push_str("\n\n");
        }
        out.push_str(&self.script()?);
        write_file(path.as_ref(), &out)
    }

    /// Write a self-contained HTML page.
    ///
    /// Fails with [`SceneError::InvalidState`] once the script has been cleared: a page needs the
    /// whole scene, not the last chunk.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save_as_html(
        &self,
        path: impl AsRef<Path>,
        opts: &HtmlOpts,
        runtime: &ViewerRuntime,
    ) -> SceneResult<()> {
        if self.is_script_cleared() {
            return Err(SceneError::invalid_state(
                "save_as_html needs the full scene; clear_script was called",
            ));
        }
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| Path::new(""));

        let script = self.script()?;
        if let Some(rel) = &opts.script_path {
            write_file(&dir.join(rel), &script)?;
        }
        let script_html = script_tag(opts.script_path.as_deref(), &script);

        let library_html = match runtime {
            ViewerRuntime::Url(url) => script_tag(Some(url.as_str()), ""),
            ViewerRuntime::Inline(source) => {
                if let Some(rel) = &opts.library_path {
                    write_file(&dir.join(rel), source)?;
                }
                script_tag(opts.library_path.as_deref(), source)
            }
        };

        let html = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n   <head>\n      <meta charset=\"utf-8\"/>\n      <title>{}</title>\n      {library_html}\n      {script_html}\n      {}\n   </head>\n   <body>\n{}\n   </body>\n</html>",
            opts.title, opts.head_html, opts.body_html
        );
        write_file(path, &html)?;
        tracing::info!(bytes = html.len(), "wrote scene page");
        Ok(())
    }

    /// Write `index.html`, `script.js` and (for an inline runtime) `viewer.js` into `dir`.
    pub fn save_as_debug(&self, dir: impl AsRef<Path>, runtime: &ViewerRuntime) -> SceneResult<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).with_context(|| format!("create '{}'", dir.display()))?;
        let opts = HtmlOpts {
            script_path: Some("script.js".to_string()),
            library_path: Some("viewer.js".to_string()),
            ..HtmlOpts::default()
        };
        self.save_as_html(dir.join("index.html"), &opts, runtime)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/html.rs"]
mod tests;
