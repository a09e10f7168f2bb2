#![deny(missing_docs)]
//! Node.js bindings that surface mdtmpl's Rust implementation.

use mdtmpl_core::{VariableSource, Variables};
use napi_derive::napi;
use serde_json::Value as JsonValue;

/// Batch rendering types and functions.
pub mod batch;
/// NAPI-exposed data structures.
pub mod types;

pub use batch::*;
pub use types::*;

fn to_napi_error(err: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(err.to_string())
}

/// Turns a JS variables argument (YAML string, object, or nothing) into a source.
pub(crate) fn resolve_variables(
    variables: Option<JsonValue>,
) -> Result<VariableSource<'static>, String> {
    match variables {
        None => Ok(VariableSource::default()),
        Some(JsonValue::String(yaml)) => mdtmpl_core::parse_variables(&yaml)
            .map(VariableSource::Parsed)
            .map_err(|err| err.to_string()),
        Some(value) => VariableSource::try_from(value).map_err(|err| err.to_string()),
    }
}

fn expect_object(value: JsonValue, what: &str) -> napi::Result<Variables> {
    match value {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(Variables::new()),
        _ => Err(napi::Error::from_reason(format!("{what} must be an object"))),
    }
}

/// Splits frontmatter from a template and detects its engine.
#[napi]
pub fn parse_template(template: String) -> napi::Result<ParsedTemplate> {
    mdtmpl_core::parse_template(&template)
        .map(ParsedTemplate::from)
        .map_err(to_napi_error)
}

/// Parses a YAML variables document; blank input yields `{}`.
#[napi]
pub fn parse_variables(yaml: String) -> napi::Result<JsonValue> {
    mdtmpl_core::parse_variables(&yaml)
        .map(JsonValue::Object)
        .map_err(to_napi_error)
}

/// Shallow-merges variables; `explicitVars` win on key collisions.
#[napi]
pub fn merge_variables(
    frontmatter_vars: JsonValue,
    explicit_vars: JsonValue,
) -> napi::Result<JsonValue> {
    let frontmatter_vars = expect_object(frontmatter_vars, "frontmatterVars")?;
    let explicit_vars = expect_object(explicit_vars, "explicitVars")?;
    Ok(JsonValue::Object(mdtmpl_core::merge_variables(
        &frontmatter_vars,
        &explicit_vars,
    )))
}

/// Renders a template body with a specific engine, skipping frontmatter and markdown.
#[napi]
pub fn render_with_engine(
    content: String,
    variables: JsonValue,
    engine: String,
) -> napi::Result<String> {
    let engine = parse_engine(&engine)?;
    let variables = expect_object(variables, "variables")?;
    mdtmpl_core::render_with_engine(&content, &variables, engine).map_err(to_napi_error)
}

/// Converts markdown to HTML.
#[napi]
pub fn markdown_to_html(markdown: String, options: Option<MarkdownConfig>) -> String {
    let options = options.unwrap_or_default().to_core();
    mdtmpl_core::markdown_to_html_with_options(&markdown, &options)
}

/// Runs the full pipeline: frontmatter, variables, engine, markdown.
///
/// `variables` may be a YAML string or an object.
#[napi]
pub fn render(
    template: String,
    variables: Option<JsonValue>,
    options: Option<RenderConfig>,
) -> napi::Result<RenderResult> {
    let options = options.unwrap_or_default().to_core()?;
    let source = resolve_variables(variables).map_err(napi::Error::from_reason)?;
    mdtmpl_core::render(&template, source, &options)
        .map(RenderResult::from)
        .map_err(to_napi_error)
}
