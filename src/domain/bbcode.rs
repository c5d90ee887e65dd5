//! BBCode to HTML rendering for post content.
//!
//! Source text is HTML-escaped first, then bracket tags are rewritten into
//! markup. Unknown tags and stray close tags pass through literally. A tag that
//! is never closed swallows the rest of the input and is reported back so an
//! editor can offer to close it.
//!
//! Block mode: when a tag body starts with a newline, that newline and one
//! newline right after the close tag are dropped, and the size/highlight tags
//! render as `<div>` instead of `<span>` so line height follows the font size.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static NEXT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[(/?)([a-z]+)(?:=([^\]]+))?\]").unwrap());
static ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^#?[a-z0-9]+;").unwrap());
static IMG_HEIGHT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)h?$").unwrap());
static IMG_WIDTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)w$").unwrap());
static IMG_WIDTH_X_HEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)x([0-9]+)$").unwrap());
static IMG_WIDTH_HEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)w([0-9]+)h$").unwrap());

const DEFAULT_FONT: &str = "Impact,sans-serif";
const DEFAULT_COLOR: &str = "red";
const DEFAULT_HIGHLIGHT: &str = "yellow";
const DEFAULT_SIZE_PT: i64 = 14;
/// Open tags nested deeper than this are kept as literal text.
pub const MAX_NESTING: usize = 256;
const DENIED_HREF: &str = "javascript:alert('You have been denied!');";

/// Result of rendering a BBCode document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub html: String,
    /// Tags left open, innermost first.
    pub unclosed: Vec<&'static str>,
}

/// Render BBCode source into HTML.
pub fn render(source: &str) -> Rendered {
    let escaped = escape_html(source.trim_end());
    let mut parser = Parser {
        rest: &escaped,
        unclosed: Vec::new(),
        depth: 0,
    };
    let html = parser.parse_body(None);
    Rendered {
        html,
        unclosed: parser.unclosed,
    }
}

/// Escape `<`, `>`, `"` and any `&` that does not already start an entity.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '&' if !ENTITY.is_match(&s[i + 1..]) => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Bold,
    Italic,
    Underline,
    Strike,
    Sup,
    Sub,
    Left,
    Right,
    Center,
    Justify,
    Font,
    Size,
    Color,
    Highlight,
    Quote,
    Url,
    Img,
    Code,
    List,
    ListItem,
}

impl Tag {
    fn lookup(name: &str) -> Option<Tag> {
        let tag = match name.to_ascii_lowercase().as_str() {
            "b" => Tag::Bold,
            "i" => Tag::Italic,
            "u" => Tag::Underline,
            "s" => Tag::Strike,
            "sup" => Tag::Sup,
            "sub" => Tag::Sub,
            "left" => Tag::Left,
            "right" => Tag::Right,
            "center" => Tag::Center,
            "justify" => Tag::Justify,
            "font" => Tag::Font,
            "size" => Tag::Size,
            "color" => Tag::Color,
            "highlight" => Tag::Highlight,
            "quote" => Tag::Quote,
            "url" => Tag::Url,
            "img" => Tag::Img,
            "code" => Tag::Code,
            "list" => Tag::List,
            "li" => Tag::ListItem,
            _ => return None,
        };
        Some(tag)
    }

    fn name(self) -> &'static str {
        match self {
            Tag::Bold => "b",
            Tag::Italic => "i",
            Tag::Underline => "u",
            Tag::Strike => "s",
            Tag::Sup => "sup",
            Tag::Sub => "sub",
            Tag::Left => "left",
            Tag::Right => "right",
            Tag::Center => "center",
            Tag::Justify => "justify",
            Tag::Font => "font",
            Tag::Size => "size",
            Tag::Color => "color",
            Tag::Highlight => "highlight",
            Tag::Quote => "quote",
            Tag::Url => "url",
            Tag::Img => "img",
            Tag::Code => "code",
            Tag::List => "list",
            Tag::ListItem => "li",
        }
    }

    /// Tags whose body is taken verbatim up to the matching close tag.
    fn is_raw(self, param: Option<&str>) -> bool {
        match self {
            Tag::Code | Tag::Img => true,
            Tag::Url => param.is_none(),
            _ => false,
        }
    }

    fn format(self, body: &str, param: Option<&str>, block: bool) -> String {
        let container = if block { "div" } else { "span" };
        match self {
            Tag::Bold
            | Tag::Italic
            | Tag::Underline
            | Tag::Strike
            | Tag::Sup
            | Tag::Sub => {
                let name = self.name();
                format!("<{name}>{body}</{name}>")
            }
            Tag::Left | Tag::Right | Tag::Center | Tag::Justify => {
                format!(r#"<div style="text-align: {};">{body}</div>"#, self.name())
            }
            Tag::Font => format!(
                r#"<span style="font-family: {};">{body}</span>"#,
                param.unwrap_or(DEFAULT_FONT)
            ),
            Tag::Color => format!(
                r#"<span style="color: {};">{body}</span>"#,
                param.unwrap_or(DEFAULT_COLOR)
            ),
            Tag::Highlight => format!(
                r#"<{container} style="background-color: {};">{body}</{container}>"#,
                param.unwrap_or(DEFAULT_HIGHLIGHT)
            ),
            Tag::Size => format!(
                r#"<{container} style="font-size: {}pt;">{body}</{container}>"#,
                size_pt(param)
            ),
            Tag::Quote => format!("<blockquote>{body}</blockquote>"),
            Tag::Code => format!("<pre>{body}</pre>"),
            Tag::Url => {
                let href = param.unwrap_or(body).trim();
                let href = if is_denied_href(href) { DENIED_HREF } else { href };
                format!(r#"<a href="{href}">{body}</a>"#)
            }
            Tag::Img => format_img(body, param),
            Tag::List => match param {
                Some(p) if leading_int(p).is_some_and(|start| start > 1) => {
                    format!(r#"<ol type="1" start="{p}">{body}</ol>"#)
                }
                Some(p) => format!(r#"<ol type="{p}">{body}</ol>"#),
                None => format!("<ul>{body}</ul>"),
            },
            Tag::ListItem => format!("<li>{body}</li>"),
        }
    }
}

struct TagToken<'a> {
    start: usize,
    end: usize,
    text: &'a str,
    closing: bool,
    name: &'a str,
    param: Option<&'a str>,
}

fn next_tag(s: &str) -> Option<TagToken<'_>> {
    let caps = NEXT_TAG.captures(s)?;
    let whole = caps.get(0)?;
    Some(TagToken {
        start: whole.start(),
        end: whole.end(),
        text: whole.as_str(),
        closing: caps.get(1).is_some_and(|m| !m.as_str().is_empty()),
        name: caps.get(2)?.as_str(),
        param: caps.get(3).map(|m| m.as_str()),
    })
}

struct Parser<'a> {
    rest: &'a str,
    unclosed: Vec<&'static str>,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Consume input until the close tag of `open` (or end of input at the root).
    fn parse_body(&mut self, open: Option<Tag>) -> String {
        let mut out = String::new();
        loop {
            let Some(token) = next_tag(self.rest) else {
                out.push_str(self.rest);
                self.rest = "";
                if let Some(tag) = open {
                    self.unclosed.push(tag.name());
                }
                return out;
            };
            out.push_str(&self.rest[..token.start]);
            self.rest = &self.rest[token.end..];

            match Tag::lookup(token.name) {
                Some(tag) if token.closing && open == Some(tag) => return out,
                Some(tag) if !token.closing && self.depth < MAX_NESTING => {
                    self.depth += 1;
                    let inner = self.parse_tag(tag, token.param);
                    self.depth -= 1;
                    let block = starts_with_newline(&inner);
                    let body = if block {
                        self.rest = trim_leading_newline(self.rest);
                        trim_leading_newline(&inner)
                    } else {
                        &inner
                    };
                    out.push_str(&tag.format(body, token.param, block));
                }
                _ => out.push_str(token.text),
            }
        }
    }

    fn parse_tag(&mut self, tag: Tag, param: Option<&str>) -> String {
        if tag.is_raw(param) {
            self.take_raw(tag)
        } else {
            self.parse_body(Some(tag))
        }
    }

    fn take_raw(&mut self, tag: Tag) -> String {
        let close = format!("[/{}]", tag.name());
        // ASCII lowercasing keeps byte offsets aligned with `rest`.
        match self.rest.to_ascii_lowercase().find(&close) {
            Some(pos) => {
                let body = self.rest[..pos].to_string();
                self.rest = &self.rest[pos + close.len()..];
                body
            }
            None => {
                self.unclosed.push(tag.name());
                let body = self.rest.to_string();
                self.rest = "";
                body
            }
        }
    }
}

fn starts_with_newline(s: &str) -> bool {
    s.starts_with('\n') || s.starts_with("\r\n")
}

fn trim_leading_newline(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

/// Parse an optionally signed integer prefix, ignoring leading whitespace.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

fn size_pt(param: Option<&str>) -> i64 {
    let Some(param) = param else {
        return DEFAULT_SIZE_PT;
    };
    let trimmed = param.trim();
    if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
        if let Some(pt) = leading_int(trimmed) {
            return pt;
        }
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "small" => 8,
        "large" => 24,
        _ => DEFAULT_SIZE_PT,
    }
}

fn format_img(src: &str, param: Option<&str>) -> String {
    if let Some(param) = param {
        if let Some(caps) = IMG_HEIGHT.captures(param) {
            return format!(r#"<img height="{}" src="{src}">"#, &caps[1]);
        }
        if let Some(caps) = IMG_WIDTH.captures(param) {
            return format!(r#"<img width="{}" src="{src}">"#, &caps[1]);
        }
        if let Some(caps) = IMG_WIDTH_X_HEIGHT
            .captures(param)
            .or_else(|| IMG_WIDTH_HEIGHT.captures(param))
        {
            return format!(
                r#"<img width="{}" height="{}" src="{src}">"#,
                &caps[1], &caps[2]
            );
        }
    }
    format!(r#"<img src="{src}">"#)
}

/// Scripting schemes are refused, including ones hidden behind whitespace,
/// control characters or character references before the first colon.
fn is_denied_href(href: &str) -> bool {
    let normalized: String = href
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect::<String>()
        .to_ascii_lowercase();
    let scheme = normalized.split(':').next().unwrap_or_default();
    scheme.contains('&')
        || ["javascript", "vbscript", "data:"]
            .iter()
            .any(|s| normalized.starts_with(s))
}
