use crate::Variables;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Frontmatter mapping split off the front of a template.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrontmatterExtraction {
    /// Top-level frontmatter keys converted to JSON values.
    pub data: Variables,
    /// Byte offset inside the original template where the body begins.
    pub body_start: usize,
}

impl FrontmatterExtraction {
    /// Returns the part of `input` that follows the frontmatter block.
    ///
    /// `input` must be the same string the extraction was produced from.
    pub fn body<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.body_start..).unwrap_or_default()
    }
}

/// Errors emitted while splitting or parsing frontmatter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrontmatterError {
    /// Opening `---` fence without a matching closing fence.
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML inside the fences failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Splits YAML frontmatter off the front of `input` and parses it.
///
/// Templates without an opening fence yield an empty mapping and a body that
/// starts at offset 0.
pub fn extract_frontmatter(input: &str) -> Result<FrontmatterExtraction, FrontmatterError> {
    let Some(block) = locate_block(input)? else {
        return Ok(FrontmatterExtraction::default());
    };

    let data = yaml_to_mapping(&input[block.yaml.clone()]).map_err(|err| match err {
        YamlMappingError::Syntax(msg) => FrontmatterError::Parse(msg),
        YamlMappingError::NotAMapping => FrontmatterError::InvalidRootType,
    })?;

    Ok(FrontmatterExtraction {
        data,
        body_start: block.body_start,
    })
}

/// Failure modes shared by frontmatter and explicit variable parsing.
pub(crate) enum YamlMappingError {
    Syntax(String),
    NotAMapping,
}

/// Parses a YAML document whose root must be a mapping (or empty/null).
pub(crate) fn yaml_to_mapping(source: &str) -> Result<Variables, YamlMappingError> {
    if source.trim().is_empty() {
        return Ok(Variables::new());
    }

    let yaml: serde_yaml::Value =
        serde_yaml::from_str(source).map_err(|err| YamlMappingError::Syntax(err.to_string()))?;
    let json =
        serde_json::to_value(yaml).map_err(|err| YamlMappingError::Syntax(err.to_string()))?;

    match json {
        JsonValue::Null => Ok(Variables::new()),
        JsonValue::Object(map) => Ok(map),
        _ => Err(YamlMappingError::NotAMapping),
    }
}

struct Block {
    yaml: std::ops::Range<usize>,
    body_start: usize,
}

fn locate_block(input: &str) -> Result<Option<Block>, FrontmatterError> {
    let mut lines = Lines::new(input);
    if input.starts_with('\u{feff}') {
        lines.cursor = '\u{feff}'.len_utf8();
    }

    let opening = loop {
        match lines.next() {
            Some(line) if line.text.trim().is_empty() => continue,
            Some(line) if is_fence(line.text) => break line,
            _ => return Ok(None),
        }
    };

    let yaml_start = opening.next;
    for line in lines.by_ref() {
        if is_fence(line.text) {
            let yaml_end = input[..line.start]
                .trim_end_matches(['\r', '\n'])
                .len()
                .max(yaml_start);
            return Ok(Some(Block {
                yaml: yaml_start..yaml_end,
                body_start: line.next,
            }));
        }
    }

    Err(FrontmatterError::Unterminated)
}

struct Line<'a> {
    text: &'a str,
    start: usize,
    next: usize,
}

struct Lines<'a> {
    input: &'a str,
    cursor: usize,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, cursor: 0 }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        if self.cursor >= self.input.len() {
            return None;
        }

        let start = self.cursor;
        let rest = &self.input[start..];
        let (text, next) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], start + pos + 1),
            None => (rest, self.input.len()),
        };
        self.cursor = next;
        Some(Line { text, start, next })
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(input: &str) -> FrontmatterExtraction {
        extract_frontmatter(input).expect("frontmatter extraction should succeed")
    }

    #[test]
    fn returns_empty_when_no_frontmatter() {
        let input = "Hello {{name}}";
        let result = extract(input);
        assert_eq!(result.body_start, 0);
        assert!(result.data.is_empty());
        assert_eq!(result.body(input), input);
    }

    #[test]
    fn parses_mapping_and_locates_body() {
        let input = "---\nengine: liquid\nnoticePeriod: 30\n---\nHello {{ name }}";
        let result = extract(input);
        assert_eq!(result.body(input), "Hello {{ name }}");
        assert_eq!(result.data["engine"], "liquid");
        assert_eq!(result.data["noticePeriod"], 30);
    }

    #[test]
    fn empty_block_is_empty_mapping() {
        let input = "---\n---\n# Body";
        let result = extract(input);
        assert!(result.data.is_empty());
        assert_eq!(result.body(input), "# Body");
    }

    #[test]
    fn skips_bom_and_leading_blank_lines() {
        let input = "\u{feff}\n   \n---\nfoo: bar\n---\nBody";
        let result = extract(input);
        assert_eq!(result.data["foo"], "bar");
        assert_eq!(result.body_start, input.find("Body").unwrap());
    }

    #[test]
    fn tolerates_crlf_fences() {
        let input = "---\r\ntitle: Doc\r\n---\r\nBody";
        let result = extract(input);
        assert_eq!(result.data["title"], "Doc");
        assert_eq!(result.body(input), "Body");
    }

    #[test]
    fn fence_must_be_first_non_blank_line() {
        let input = "Intro\n---\ntitle: nope\n---\n";
        let result = extract(input);
        assert!(result.data.is_empty());
        assert_eq!(result.body_start, 0);
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let err = extract_frontmatter("---\ninvalid: [unterminated\n---\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::Parse(_)), "{err:?}");
    }

    #[test]
    fn errors_on_non_mapping_root() {
        let err = extract_frontmatter("---\n- a\n- b\n---\nBody").unwrap_err();
        assert_eq!(err, FrontmatterError::InvalidRootType);
    }

    #[test]
    fn errors_on_unterminated_block() {
        let err = extract_frontmatter("---\ntitle: test").unwrap_err();
        assert_eq!(err, FrontmatterError::Unterminated);
    }
}
