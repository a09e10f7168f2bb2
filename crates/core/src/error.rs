use crate::engine::EngineError;
use crate::frontmatter::FrontmatterError;
use crate::parse::VariablesError;
use thiserror::Error;

/// Errors that can occur while running the full render pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The template's frontmatter could not be split or parsed.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// The explicit YAML variables could not be parsed.
    #[error(transparent)]
    Variables(#[from] VariablesError),
    /// Pre-parsed variables were not a JSON object.
    #[error("Variables must be an object, got {0}")]
    InvalidVariables(String),
    /// The template engine failed to compile or render the body.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl RenderError {
    /// Short machine-readable category, used by the JS bindings.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::Frontmatter(_) => "frontmatter",
            RenderError::Variables(_) | RenderError::InvalidVariables(_) => "variables",
            RenderError::Engine(_) => "engine",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TemplateEngine;

    #[test]
    fn messages_come_from_the_source_error() {
        let err = RenderError::from(FrontmatterError::Unterminated);
        assert_eq!(err.to_string(), FrontmatterError::Unterminated.to_string());
        assert_eq!(err.kind(), "frontmatter");
    }

    #[test]
    fn engine_errors_name_the_engine() {
        let err = RenderError::from(EngineError {
            engine: TemplateEngine::Liquid,
            message: "Unknown variable".to_string(),
        });
        assert_eq!(err.to_string(), "liquid error: Unknown variable");
        assert_eq!(err.kind(), "engine");
    }
}
