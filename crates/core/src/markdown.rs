//! Markdown to HTML conversion.

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, html};
use serde::{Deserialize, Serialize};

/// Markdown dialect switches applied when converting rendered output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables, strikethrough, task lists,
    /// footnotes and bare-URL autolinks.
    pub gfm: bool,
    /// Turn single newlines inside a paragraph into `<br />`.
    pub breaks: bool,
}

impl MarkdownOptions {
    /// Plain CommonMark: no GFM extensions, newlines stay soft.
    pub const fn commonmark() -> Self {
        Self {
            gfm: false,
            breaks: false,
        }
    }

    fn to_pulldown(self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        options
    }
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            breaks: true,
        }
    }
}

/// Converts markdown to HTML with GFM and line breaks enabled.
pub fn markdown_to_html(markdown: &str) -> String {
    markdown_to_html_with_options(markdown, &MarkdownOptions::default())
}

/// Converts markdown to HTML. Raw HTML in the input is passed through.
pub fn markdown_to_html_with_options(markdown: &str, options: &MarkdownOptions) -> String {
    let breaks = options.breaks;
    let events = Parser::new_ext(markdown, options.to_pulldown()).map(|event| match event {
        Event::SoftBreak if breaks => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() + markdown.len() / 2);
    if options.gfm {
        html::push_html(&mut out, autolink(events).into_iter());
    } else {
        html::push_html(&mut out, events);
    }
    out
}

const URL_PREFIXES: [&str; 3] = ["https://", "http://", "www."];

/// Wraps bare `http://`, `https://` and `www.` URLs in text with links.
///
/// Adjacent text events are joined first since the parser splits text on
/// punctuation. Text inside links, images, code blocks and raw `<a>` tags is
/// left alone.
fn autolink<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    let mut pending = String::new();
    let mut skip_depth = 0usize;

    for event in events {
        match &event {
            Event::Text(text) if skip_depth == 0 => {
                pending.push_str(text);
                continue;
            }
            Event::Start(Tag::Link(..) | Tag::Image(..) | Tag::CodeBlock(_)) => skip_depth += 1,
            Event::End(Tag::Link(..) | Tag::Image(..) | Tag::CodeBlock(_)) => {
                skip_depth = skip_depth.saturating_sub(1)
            }
            Event::Html(html) if html.starts_with("<a ") || html.starts_with("<a>") => {
                skip_depth += 1
            }
            Event::Html(html) if html.starts_with("</a") => {
                skip_depth = skip_depth.saturating_sub(1)
            }
            _ => {}
        }
        push_linkified(std::mem::take(&mut pending), &mut out);
        out.push(event);
    }
    push_linkified(pending, &mut out);
    out
}

fn push_linkified<'a>(text: String, out: &mut Vec<Event<'a>>) {
    let mut rest = text.as_str();
    while let Some((start, end)) = next_url(rest) {
        if start > 0 {
            out.push(Event::Text(rest[..start].to_string().into()));
        }
        let label = &rest[start..end];
        let href = if label.starts_with("www.") {
            format!("http://{label}")
        } else {
            label.to_string()
        };
        let tag = Tag::Link(LinkType::Autolink, href.into(), CowStr::Borrowed(""));
        out.push(Event::Start(tag.clone()));
        out.push(Event::Text(label.to_string().into()));
        out.push(Event::End(tag));
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        out.push(Event::Text(rest.to_string().into()));
    }
}

/// Byte range of the first URL in `text` that starts at a word boundary.
fn next_url(text: &str) -> Option<(usize, usize)> {
    let mut search = 0;
    while search < text.len() {
        let (start, prefix) = URL_PREFIXES
            .iter()
            .filter_map(|prefix| text[search..].find(prefix).map(|at| (search + at, *prefix)))
            .min_by_key(|(at, _)| *at)?;
        let at_boundary = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let end = start + url_len(&text[start..]);
        if at_boundary && end > start + prefix.len() {
            return Some((start, end));
        }
        search = start + prefix.len();
    }
    None
}

/// Length of the URL at the start of `candidate`, minus trailing punctuation
/// and unbalanced closing parentheses.
fn url_len(candidate: &str) -> usize {
    let mut end = candidate
        .find(|c: char| c.is_whitespace() || c == '<')
        .unwrap_or(candidate.len());
    loop {
        let trimmed = candidate[..end]
            .trim_end_matches(['?', '!', '.', ',', ':', '*', '_', '~', '\'', '"']);
        end = trimmed.len();
        if trimmed.ends_with(')') && trimmed.matches('(').count() < trimmed.matches(')').count() {
            end -= 1;
            continue;
        }
        break end;
    }
}
