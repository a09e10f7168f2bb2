//! Template engine selection and dispatch.

use crate::Variables;
use liquid::model::{DisplayCow, KString, KStringCow, Object, State, Value};
use liquid::{ObjectView, ValueView};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Template languages a document can be rendered with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateEngine {
    /// Handlebars (`{{name}}`, `{{#each}}`).
    #[default]
    Handlebars,
    /// Logic-less Mustache (`{{name}}`, `{{#section}}`).
    Mustache,
    /// Liquid (`{{ name }}`, `{% for %}`).
    Liquid,
}

impl TemplateEngine {
    /// Every supported engine, in declaration order.
    pub const ALL: [TemplateEngine; 3] = [
        TemplateEngine::Handlebars,
        TemplateEngine::Mustache,
        TemplateEngine::Liquid,
    ];

    /// Lowercase name used in frontmatter and options.
    pub const fn as_str(self) -> &'static str {
        match self {
            TemplateEngine::Handlebars => "handlebars",
            TemplateEngine::Mustache => "mustache",
            TemplateEngine::Liquid => "liquid",
        }
    }
}

impl fmt::Display for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name that does not match any supported engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown template engine '{0}', expected one of: handlebars, mustache, liquid")]
pub struct UnknownEngine(pub String);

impl FromStr for TemplateEngine {
    type Err = UnknownEngine;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        TemplateEngine::ALL
            .into_iter()
            .find(|engine| engine.as_str() == name)
            .ok_or_else(|| UnknownEngine(name.to_string()))
    }
}

/// A template failed to compile or render.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{engine} error: {message}")]
pub struct EngineError {
    /// Engine that reported the failure.
    pub engine: TemplateEngine,
    /// Message reported by the engine.
    pub message: String,
}

/// Renders `content` with `engine`.
///
/// Frontmatter and markdown are left untouched; see [`crate::render::render`] for
/// the full pipeline.
pub fn render_with_engine(
    content: &str,
    variables: &Variables,
    engine: TemplateEngine,
) -> Result<String, EngineError> {
    log::debug!("rendering {} byte template with {engine}", content.len());
    let rendered = match engine {
        TemplateEngine::Handlebars => render_handlebars(content, variables),
        TemplateEngine::Mustache => render_mustache(content, variables),
        TemplateEngine::Liquid => render_liquid(content, variables),
    };
    rendered.map_err(|message| EngineError { engine, message })
}

fn render_handlebars(content: &str, variables: &Variables) -> Result<String, String> {
    let mut registry = handlebars::Handlebars::new();
    registry.set_strict_mode(false);
    registry
        .render_template(content, variables)
        .map_err(|err| err.to_string())
}

fn render_mustache(content: &str, variables: &Variables) -> Result<String, String> {
    let template = mustache::compile_str(content).map_err(|err| err.to_string())?;
    let mut out = Vec::with_capacity(content.len());
    template
        .render(&mut out, variables)
        .map_err(|err| err.to_string())?;
    String::from_utf8(out).map_err(|err| err.to_string())
}

fn render_liquid(content: &str, variables: &Variables) -> Result<String, String> {
    let parser = liquid::ParserBuilder::with_stdlib()
        .build()
        .map_err(|err| err.to_string())?;
    let template = parser.parse(content).map_err(|err| err.to_string())?;
    let globals = liquid::model::to_object(variables).map_err(|err| err.to_string())?;
    template
        .render(&LenientObject::new(globals))
        .map_err(|err| err.to_string())
}

static NIL: Value = Value::Nil;

/// Liquid globals where a missing key reads as `nil` instead of failing.
///
/// Nested objects are wrapped too, so `{{ client.name }}` renders empty when
/// `client` has no `name`.
#[derive(Debug)]
struct LenientObject {
    object: Object,
    nested: HashMap<KString, LenientObject>,
}

impl LenientObject {
    fn new(object: Object) -> Self {
        let nested = object
            .iter()
            .filter_map(|(key, value)| match value {
                Value::Object(inner) => Some((key.clone(), LenientObject::new(inner.clone()))),
                _ => None,
            })
            .collect();
        Self { object, nested }
    }
}

impl ValueView for LenientObject {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        ValueView::render(&self.object)
    }

    fn source(&self) -> DisplayCow<'_> {
        ValueView::source(&self.object)
    }

    fn type_name(&self) -> &'static str {
        "object"
    }

    fn query_state(&self, state: State) -> bool {
        ValueView::query_state(&self.object, state)
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        ValueView::to_kstr(&self.object)
    }

    fn to_value(&self) -> Value {
        Value::Object(self.object.clone())
    }

    fn as_object(&self) -> Option<&dyn ObjectView> {
        Some(self)
    }
}

impl ObjectView for LenientObject {
    fn as_value(&self) -> &dyn ValueView {
        self
    }

    fn size(&self) -> i64 {
        ObjectView::size(&self.object)
    }

    fn keys<'k>(&'k self) -> Box<dyn Iterator<Item = KStringCow<'k>> + 'k> {
        ObjectView::keys(&self.object)
    }

    fn values<'k>(&'k self) -> Box<dyn Iterator<Item = &'k dyn ValueView> + 'k> {
        ObjectView::values(&self.object)
    }

    fn iter<'k>(&'k self) -> Box<dyn Iterator<Item = (KStringCow<'k>, &'k dyn ValueView)> + 'k> {
        ObjectView::iter(&self.object)
    }

    fn contains_key(&self, _index: &str) -> bool {
        true
    }

    fn get<'s>(&'s self, index: &str) -> Option<&'s dyn ValueView> {
        let found = match self.nested.get(index) {
            Some(nested) => nested as &dyn ValueView,
            None => self
                .object
                .get(index)
                .map_or(&NIL as &dyn ValueView, |value| value as &dyn ValueView),
        };
        Some(found)
    }
}
