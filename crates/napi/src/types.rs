//! NAPI-exposed data structures.

use mdtmpl_core::TemplateEngine;
use napi_derive::napi;
use serde_json::Value as JsonValue;

/// Markdown switches accepted from JavaScript.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct MarkdownConfig {
    /// Enables GFM tables, strikethrough, task lists and footnotes. Defaults to true.
    pub gfm: Option<bool>,
    /// Turns single newlines into `<br />`. Defaults to true.
    pub breaks: Option<bool>,
}

impl MarkdownConfig {
    pub(crate) fn to_core(&self) -> mdtmpl_core::MarkdownOptions {
        let defaults = mdtmpl_core::MarkdownOptions::default();
        mdtmpl_core::MarkdownOptions {
            gfm: self.gfm.unwrap_or(defaults.gfm),
            breaks: self.breaks.unwrap_or(defaults.breaks),
        }
    }
}

/// Options accepted by `render`.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Forces an engine (`handlebars`, `mustache` or `liquid`) over the frontmatter.
    pub engine: Option<String>,
    /// Markdown conversion switches.
    pub markdown: Option<MarkdownConfig>,
}

impl RenderConfig {
    pub(crate) fn to_core(&self) -> napi::Result<mdtmpl_core::RenderOptions> {
        let engine = self.engine.as_deref().map(parse_engine).transpose()?;
        Ok(mdtmpl_core::RenderOptions {
            engine,
            markdown: self
                .markdown
                .as_ref()
                .map(MarkdownConfig::to_core)
                .unwrap_or_default(),
        })
    }
}

pub(crate) fn parse_engine(name: &str) -> napi::Result<TemplateEngine> {
    name.parse::<TemplateEngine>()
        .map_err(|err| napi::Error::from_reason(err.to_string()))
}

/// Template split into body, engine and frontmatter variables.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    /// Template body with frontmatter stripped.
    pub content: String,
    /// Detected engine name.
    pub engine: String,
    /// Frontmatter variables, excluding `engine`.
    pub frontmatter_vars: JsonValue,
}

impl From<mdtmpl_core::ParsedTemplate> for ParsedTemplate {
    fn from(parsed: mdtmpl_core::ParsedTemplate) -> Self {
        Self {
            content: parsed.content,
            engine: parsed.engine.to_string(),
            frontmatter_vars: JsonValue::Object(parsed.frontmatter_vars),
        }
    }
}

/// Output of the full render pipeline.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// Engine output before markdown conversion.
    pub raw: String,
    /// HTML output.
    pub html: String,
    /// Engine that rendered the template.
    pub engine: String,
}

impl From<mdtmpl_core::RenderResult> for RenderResult {
    fn from(result: mdtmpl_core::RenderResult) -> Self {
        Self {
            raw: result.raw,
            html: result.html,
            engine: result.engine.to_string(),
        }
    }
}
