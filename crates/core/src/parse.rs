//! Template and variable parsing.

use crate::engine::TemplateEngine;
use crate::frontmatter::{FrontmatterError, YamlMappingError, extract_frontmatter, yaml_to_mapping};
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Template variables: a JSON object keyed by variable name.
pub type Variables = serde_json::Map<String, JsonValue>;

/// Frontmatter key that selects the rendering engine.
pub const ENGINE_KEY: &str = "engine";

/// A template split into its body, engine and frontmatter defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTemplate {
    /// Template body with the frontmatter block stripped.
    pub content: String,
    /// Engine named by the frontmatter, or the default engine.
    pub engine: TemplateEngine,
    /// Every frontmatter key except `engine`.
    pub frontmatter_vars: Variables,
}

/// Errors emitted while parsing an explicit YAML variables document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariablesError {
    /// YAML failed to parse.
    #[error("Variables parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was a scalar or a sequence.
    #[error("Variables must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Parses a template, extracting the engine and the frontmatter variables.
///
/// The `engine` key only selects an engine when it is a string naming one of
/// the supported engines; anything else falls back to
/// [`TemplateEngine::default`]. The key is never passed on as a variable.
pub fn parse_template(template: &str) -> Result<ParsedTemplate, FrontmatterError> {
    let extraction = extract_frontmatter(template)?;
    let content = extraction.body(template).to_string();
    let mut frontmatter_vars = extraction.data;

    let engine = match frontmatter_vars.remove(ENGINE_KEY) {
        None => TemplateEngine::default(),
        Some(value) => match value.as_str().map(str::parse::<TemplateEngine>) {
            Some(Ok(engine)) => engine,
            _ => {
                log::warn!(
                    "unrecognised frontmatter engine {value}, falling back to {}",
                    TemplateEngine::default()
                );
                TemplateEngine::default()
            }
        },
    };
    log::debug!(
        "parsed template: engine={engine}, {} frontmatter variable(s)",
        frontmatter_vars.len()
    );

    Ok(ParsedTemplate {
        content,
        engine,
        frontmatter_vars,
    })
}

/// Parses a YAML document of explicit variables.
///
/// Blank input and a YAML `null` document both yield an empty map.
pub fn parse_variables(yaml: &str) -> Result<Variables, VariablesError> {
    yaml_to_mapping(yaml).map_err(|err| match err {
        YamlMappingError::Syntax(msg) => VariablesError::Parse(msg),
        YamlMappingError::NotAMapping => VariablesError::InvalidRootType,
    })
}

/// Shallow-merges two variable maps; `explicit_vars` win on key collisions.
pub fn merge_variables(frontmatter_vars: &Variables, explicit_vars: &Variables) -> Variables {
    let mut merged = frontmatter_vars.clone();
    merged.extend(
        explicit_vars
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: JsonValue) -> Variables {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn parse(lines: &[&str]) -> ParsedTemplate {
        parse_template(&lines.join("\n")).expect("template should parse")
    }

    #[test]
    fn detects_each_engine() {
        for (name, expected) in [
            ("handlebars", TemplateEngine::Handlebars),
            ("mustache", TemplateEngine::Mustache),
            ("liquid", TemplateEngine::Liquid),
        ] {
            let engine_line = format!("engine: {name}");
            let parsed = parse(&["---", &engine_line, "---", "Hello {{name}}"]);
            assert_eq!(parsed.engine, expected);
            assert!(parsed.frontmatter_vars.is_empty());
        }
    }

    #[test]
    fn strips_frontmatter_from_content() {
        let parsed = parse(&["---", "engine: handlebars", "---", "Hello {{name}}"]);
        assert_eq!(parsed.content.trim(), "Hello {{name}}");
    }

    #[test]
    fn defaults_to_handlebars_without_engine_key() {
        let parsed = parse(&["---", "title: My Doc", "---", "Hello {{name}}"]);
        assert_eq!(parsed.engine, TemplateEngine::Handlebars);
        assert_eq!(parsed.frontmatter_vars, vars(json!({ "title": "My Doc" })));
    }

    #[test]
    fn invalid_engine_falls_back_and_is_dropped() {
        let parsed = parse(&["---", "engine: jinja2", "---", "Hello {{name}}"]);
        assert_eq!(parsed.engine, TemplateEngine::Handlebars);
        assert!(!parsed.frontmatter_vars.contains_key(ENGINE_KEY));
    }

    #[test]
    fn engine_names_are_case_sensitive() {
        let parsed = parse(&["---", "engine: Liquid", "---", "x"]);
        assert_eq!(parsed.engine, TemplateEngine::Handlebars);
    }

    #[test]
    fn non_string_engine_falls_back() {
        let parsed = parse(&["---", "engine: 3", "---", "x"]);
        assert_eq!(parsed.engine, TemplateEngine::Handlebars);
        assert!(parsed.frontmatter_vars.is_empty());
    }

    #[test]
    fn extracts_frontmatter_variables_excluding_engine() {
        let parsed = parse(&[
            "---",
            "engine: handlebars",
            "effectiveDate: \"2025-02-10\"",
            "noticePeriod: 30",
            "---",
            "Date: {{effectiveDate}}",
        ]);
        assert_eq!(
            parsed.frontmatter_vars,
            vars(json!({ "effectiveDate": "2025-02-10", "noticePeriod": 30 }))
        );
    }

    #[test]
    fn template_without_frontmatter() {
        let parsed = parse_template("Hello {{name}}").unwrap();
        assert_eq!(parsed.engine, TemplateEngine::Handlebars);
        assert_eq!(parsed.content, "Hello {{name}}");
        assert!(parsed.frontmatter_vars.is_empty());
    }

    #[test]
    fn unterminated_frontmatter_is_an_error() {
        let err = parse_template("---\nengine: liquid\nHello").unwrap_err();
        assert_eq!(err, FrontmatterError::Unterminated);
    }

    #[test]
    fn parses_simple_variables() {
        let result = parse_variables("effectiveDate: \"2025-02-10\"\nnoticePeriod: 30").unwrap();
        assert_eq!(
            result,
            vars(json!({ "effectiveDate": "2025-02-10", "noticePeriod": 30 }))
        );
    }

    #[test]
    fn parses_nested_variables() {
        let yaml = [
            "provider:",
            "  name: \"Acme Solutions Inc.\"",
            "  address: \"123 Tech Street\"",
        ]
        .join("\n");
        let result = parse_variables(&yaml).unwrap();
        assert_eq!(
            result,
            vars(json!({
                "provider": { "name": "Acme Solutions Inc.", "address": "123 Tech Street" }
            }))
        );
    }

    #[test]
    fn parses_sequences() {
        let yaml = "services:\n  - \"Software Development\"\n  - \"Technical Consulting\"";
        let result = parse_variables(yaml).unwrap();
        assert_eq!(
            result,
            vars(json!({ "services": ["Software Development", "Technical Consulting"] }))
        );
    }

    #[test]
    fn blank_variables_are_empty() {
        assert!(parse_variables("").unwrap().is_empty());
        assert!(parse_variables("   \n  ").unwrap().is_empty());
        assert!(parse_variables("~").unwrap().is_empty());
    }

    #[test]
    fn scalar_variables_are_rejected() {
        assert_eq!(
            parse_variables("just text").unwrap_err(),
            VariablesError::InvalidRootType
        );
        assert_eq!(
            parse_variables("- a\n- b").unwrap_err(),
            VariablesError::InvalidRootType
        );
    }

    #[test]
    fn malformed_variables_are_rejected() {
        let err = parse_variables("key: [1, 2").unwrap_err();
        assert!(matches!(err, VariablesError::Parse(_)), "{err:?}");
    }

    #[test]
    fn merge_unions_both_sides() {
        let merged = merge_variables(&vars(json!({ "a": 1, "b": 2 })), &vars(json!({ "c": 3 })));
        assert_eq!(merged, vars(json!({ "a": 1, "b": 2, "c": 3 })));
    }

    #[test]
    fn merge_prefers_explicit_values() {
        let merged = merge_variables(
            &vars(json!({ "name": "default", "value": 10 })),
            &vars(json!({ "name": "override" })),
        );
        assert_eq!(merged["name"], "override");
        assert_eq!(merged["value"], 10);
    }

    #[test]
    fn merge_replaces_nested_objects_wholesale() {
        let merged = merge_variables(
            &vars(json!({ "provider": { "name": "Acme", "email": "a@acme.com" } })),
            &vars(json!({ "provider": { "name": "Globex" } })),
        );
        assert_eq!(merged["provider"], json!({ "name": "Globex" }));
    }

    #[test]
    fn merge_with_empty_sides() {
        let one = vars(json!({ "name": "test" }));
        assert_eq!(merge_variables(&Variables::new(), &one), one);
        assert_eq!(merge_variables(&one, &Variables::new()), one);
    }
}
