//! The full template → markdown → HTML pipeline.

use crate::engine::{TemplateEngine, render_with_engine};
use crate::error::RenderError;
use crate::markdown::{MarkdownOptions, markdown_to_html_with_options};
use crate::parse::{Variables, merge_variables, parse_template, parse_variables};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Options accepted by [`render`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Overrides the engine detected from frontmatter.
    pub engine: Option<TemplateEngine>,
    /// Markdown dialect used for the HTML output.
    pub markdown: MarkdownOptions,
}

impl RenderOptions {
    /// Options that force `engine` regardless of frontmatter.
    pub fn with_engine(engine: TemplateEngine) -> Self {
        Self {
            engine: Some(engine),
            ..Self::default()
        }
    }
}

/// Explicit variables handed to [`render`].
#[derive(Clone, Debug, PartialEq)]
pub enum VariableSource<'a> {
    /// A YAML document, parsed with [`parse_variables`].
    Yaml(&'a str),
    /// Variables that are already structured.
    Parsed(Variables),
}

impl Default for VariableSource<'_> {
    fn default() -> Self {
        VariableSource::Parsed(Variables::new())
    }
}

impl<'a> From<&'a str> for VariableSource<'a> {
    fn from(yaml: &'a str) -> Self {
        VariableSource::Yaml(yaml)
    }
}

impl<'a> From<&'a String> for VariableSource<'a> {
    fn from(yaml: &'a String) -> Self {
        VariableSource::Yaml(yaml.as_str())
    }
}

impl From<Variables> for VariableSource<'_> {
    fn from(vars: Variables) -> Self {
        VariableSource::Parsed(vars)
    }
}

impl TryFrom<JsonValue> for VariableSource<'_> {
    type Error = RenderError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Null => Ok(VariableSource::default()),
            JsonValue::Object(map) => Ok(VariableSource::Parsed(map)),
            other => Err(RenderError::InvalidVariables(json_type_name(&other).to_string())),
        }
    }
}

impl VariableSource<'_> {
    fn into_variables(self) -> Result<Variables, RenderError> {
        match self {
            VariableSource::Yaml(yaml) => Ok(parse_variables(yaml)?),
            VariableSource::Parsed(vars) => Ok(vars),
        }
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Output of the full pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    /// Engine output before markdown conversion.
    pub raw: String,
    /// HTML produced from `raw`.
    pub html: String,
    /// Engine that rendered the template.
    pub engine: TemplateEngine,
}

/// Renders a template end to end.
///
/// 1. Parse frontmatter (engine and frontmatter variables).
/// 2. Resolve the explicit variables (YAML or pre-parsed).
/// 3. Merge them, explicit values winning over frontmatter defaults.
/// 4. Render with `options.engine`, or the detected engine when unset.
/// 5. Convert the engine output from markdown to HTML.
pub fn render<'a>(
    template: &str,
    variables: impl Into<VariableSource<'a>>,
    options: &RenderOptions,
) -> Result<RenderResult, RenderError> {
    let parsed = parse_template(template)?;
    let engine = options.engine.unwrap_or(parsed.engine);
    if options.engine.is_some_and(|forced| forced != parsed.engine) {
        log::debug!("engine override: {} -> {engine}", parsed.engine);
    }

    let explicit = variables.into().into_variables()?;
    let merged = merge_variables(&parsed.frontmatter_vars, &explicit);

    let raw = render_with_engine(&parsed.content, &merged, engine)?;
    let html = markdown_to_html_with_options(&raw, &options.markdown);

    Ok(RenderResult { raw, html, engine })
}

/// [`render`] with default options.
pub fn render_default<'a>(
    template: &str,
    variables: impl Into<VariableSource<'a>>,
) -> Result<RenderResult, RenderError> {
    render(template, variables, &RenderOptions::default())
}
