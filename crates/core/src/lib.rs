#![deny(missing_docs)]
//! mdtmpl core: frontmatter-driven template rendering with markdown output.

/// Template engine selection and dispatch.
pub mod engine;
/// Pipeline error types.
pub mod error;
/// YAML frontmatter extraction.
pub mod frontmatter;
/// Markdown to HTML conversion.
pub mod markdown;
/// Template and variable parsing.
pub mod parse;
/// The full render pipeline.
pub mod render;

pub use engine::{EngineError, TemplateEngine, UnknownEngine, render_with_engine};
pub use error::RenderError;
pub use frontmatter::{FrontmatterError, FrontmatterExtraction, extract_frontmatter};
pub use markdown::{MarkdownOptions, markdown_to_html, markdown_to_html_with_options};
pub use parse::{
    ENGINE_KEY, ParsedTemplate, Variables, VariablesError, merge_variables, parse_template,
    parse_variables,
};
pub use render::{RenderOptions, RenderResult, VariableSource, render, render_default};
