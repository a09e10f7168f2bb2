use mdtmpl_core::{MarkdownOptions, RenderOptions, TemplateEngine, Variables};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

// ============================================================================
// Conversions
// ============================================================================

/// Render options accepted from the editor. Mirrors the NAPI `RenderConfig`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WasmRenderConfig {
    #[serde(default)]
    pub engine: Option<TemplateEngine>,
    #[serde(default)]
    pub markdown: Option<WasmMarkdownConfig>,
}

/// Markdown switches accepted from the editor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WasmMarkdownConfig {
    #[serde(default)]
    pub gfm: Option<bool>,
    #[serde(default)]
    pub breaks: Option<bool>,
}

impl WasmMarkdownConfig {
    fn to_core(&self) -> MarkdownOptions {
        let defaults = MarkdownOptions::default();
        MarkdownOptions {
            gfm: self.gfm.unwrap_or(defaults.gfm),
            breaks: self.breaks.unwrap_or(defaults.breaks),
        }
    }
}

impl WasmRenderConfig {
    fn to_core(&self) -> RenderOptions {
        RenderOptions {
            engine: self.engine,
            markdown: self
                .markdown
                .as_ref()
                .map(WasmMarkdownConfig::to_core)
                .unwrap_or_default(),
        }
    }
}

fn parse_config<T: Default + for<'de> Deserialize<'de>>(config: JsValue) -> T {
    if config.is_undefined() || config.is_null() {
        return T::default();
    }
    serde_wasm_bindgen::from_value(config).unwrap_or_default()
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

fn variables_from_js(variables: JsValue) -> Result<Variables, JsError> {
    if variables.is_undefined() || variables.is_null() {
        return Ok(Variables::new());
    }
    if let Some(yaml) = variables.as_string() {
        return mdtmpl_core::parse_variables(&yaml).map_err(|e| JsError::new(&e.to_string()));
    }

    let value: JsonValue = serde_wasm_bindgen::from_value(variables)
        .map_err(|e| JsError::new(&format!("Invalid variables: {}", e)))?;
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(JsError::new(&format!(
            "Variables must be a YAML string or an object, got {}",
            other
        ))),
    }
}

// ============================================================================
// Parse API
// ============================================================================

/// Splits frontmatter from a template.
///
/// Returns `{ content, engine, frontmatterVars }`.
#[wasm_bindgen(js_name = parseTemplate)]
pub fn parse_template(template: &str) -> Result<JsValue, JsError> {
    let parsed =
        mdtmpl_core::parse_template(template).map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&parsed)
}

/// Parses a YAML variables document into a plain object.
#[wasm_bindgen(js_name = parseVariables)]
pub fn parse_variables(yaml: &str) -> Result<JsValue, JsError> {
    let vars = mdtmpl_core::parse_variables(yaml).map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&vars)
}

/// Engine the editor should display for `template`.
///
/// Templates whose frontmatter cannot be parsed report the default engine.
#[wasm_bindgen(js_name = detectEngine)]
pub fn detect_engine(template: &str) -> String {
    mdtmpl_core::parse_template(template)
        .map(|parsed| parsed.engine)
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// Render API
// ============================================================================

/// Renders a template body with one engine, without frontmatter or markdown.
#[wasm_bindgen(js_name = renderWithEngine)]
pub fn render_with_engine(
    content: &str,
    variables: JsValue,
    engine: &str,
) -> Result<String, JsError> {
    let engine = engine.parse::<TemplateEngine>().map_err(|e| JsError::new(&e.to_string()))?;
    let vars = variables_from_js(variables)?;
    mdtmpl_core::render_with_engine(content, &vars, engine)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Converts markdown to HTML. `options` is an optional `{ gfm, breaks }` object.
#[wasm_bindgen(js_name = markdownToHtml)]
pub fn markdown_to_html(markdown: &str, options: JsValue) -> String {
    let cfg: WasmMarkdownConfig = parse_config(options);
    mdtmpl_core::markdown_to_html_with_options(markdown, &cfg.to_core())
}

/// Runs the full pipeline for the editor preview.
///
/// # Arguments
///
/// * `template` - Template source with optional frontmatter
/// * `variables` - YAML string, plain object, or `undefined`
/// * `options` - Optional `{ engine, markdown: { gfm, breaks } }`
///
/// # Returns
///
/// `{ raw, html, engine }`.
///
/// # Example (JavaScript)
///
/// ```javascript
/// import { render } from './mdtmpl_wasm';
///
/// const { html, engine } = render("---\nengine: liquid\n---\n# {{ title }}", "title: MSA");
/// // engine === "liquid", html === "<h1>MSA</h1>\n"
/// ```
#[wasm_bindgen]
pub fn render(template: &str, variables: JsValue, options: JsValue) -> Result<JsValue, JsError> {
    let cfg: WasmRenderConfig = parse_config(options);
    let vars = variables_from_js(variables)?;

    let result = mdtmpl_core::render(template, vars, &cfg.to_core())
        .map_err(|e| JsError::new(&e.to_string()))?;

    to_js(&result)
}
