//! SPDX-style license templates.
//!
//! A template is canonical license text with a small markup:
//!
//! ```text
//! <<year>>                                     wildcard variable, rendered as "<year>"
//! <<var;name="x";original="...";match="...">>  variable with explicit text and regex
//! <<beginOptional>> ... <<endOptional>>        text that may be absent
//! ```
//!
//! [`Template::render`] produces the canonical text used by the exact and fuzzy
//! strategies; [`Template::compile`] produces the [`StructuralPattern`] used by
//! the pattern strategy.

use regex::{Regex, RegexBuilder};

use crate::error::{CatalogError, Result};

/// Upper bound on the compiled program size of one pattern. Full license
/// texts compiled case-insensitively exceed the `regex` default.
const COMPILED_SIZE_LIMIT: usize = 64 * (1 << 20);

/// What a `<<name>>` variable without a `match` fragment accepts: one field of
/// at most 200 characters.
const WILDCARD: &str = ".{0,200}?";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Var {
        name: String,
        original: Option<String>,
        pattern: Option<String>,
    },
    Optional(Vec<Segment>),
}

enum Marker {
    BeginOptional,
    EndOptional,
    Var(Segment),
}

/// Regex-generation view of a template. No sequence starts or ends with a
/// gap; an optional block owns the gaps that separate it from its neighbours.
#[derive(Debug, PartialEq)]
enum Piece<'t> {
    Word(String),
    Gap,
    Var(Option<&'t str>),
    Optional(Vec<Piece<'t>>),
}

impl Piece<'_> {
    fn is_required(&self) -> bool {
        matches!(self, Piece::Word(_) | Piece::Var(_))
    }

    /// True when the first (or last) thing this piece can match is a variable.
    fn var_at_edge(&self, leading: bool) -> bool {
        match self {
            Piece::Var(_) => true,
            Piece::Optional(body) => {
                let edge = if leading { body.first() } else { body.last() };
                edge.is_some_and(|piece| piece.var_at_edge(leading))
            }
            Piece::Word(_) | Piece::Gap => false,
        }
    }
}

/// Whitespace-split segments, before gaps are assigned.
enum Token<'t> {
    Word(String),
    Gap,
    Var(Option<&'t str>),
    Optional(Layout<'t>),
}

/// One sequence of pieces with the whitespace at its edges removed.
struct Layout<'t> {
    pieces: Vec<Piece<'t>>,
    leading_gap: bool,
    trailing_gap: bool,
}

/// A parsed template, tied to the identifier it was declared for.
#[derive(Debug, Clone)]
pub struct Template {
    identifier: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template markup. All markup errors surface here.
    pub fn parse(identifier: &str, source: &str) -> Result<Self> {
        let segments = parse_segments(identifier, source)?;
        Ok(Self {
            identifier: identifier.to_string(),
            segments,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Canonical text: optional blocks included, variables replaced by their
    /// original text (or `<name>` when none is given).
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_into(&self.segments, &mut out);
        out
    }

    /// The anchored regex source this template compiles to.
    pub fn regex_source(&self) -> String {
        let mut re = String::from("(?s)^");
        emit(&layout(&self.segments).pieces, None, None, &mut re);
        re.push('$');
        re
    }

    pub fn compile(&self) -> Result<StructuralPattern> {
        let regex = build_regex(&self.identifier, &self.regex_source())?;
        Ok(StructuralPattern { regex })
    }
}

/// Where a structural pattern comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSource {
    /// Template markup, see the module docs.
    Template(String),
    /// A raw regex matched case-insensitively against the whole collapsed text.
    Regex(String),
}

/// A precompiled, case-insensitive matcher for a whole collapsed text.
#[derive(Debug, Clone)]
pub struct StructuralPattern {
    regex: Regex,
}

impl StructuralPattern {
    pub fn compile(identifier: &str, source: &PatternSource) -> Result<Self> {
        match source {
            PatternSource::Template(markup) => Template::parse(identifier, markup)?.compile(),
            PatternSource::Regex(raw) => {
                let regex = build_regex(identifier, &format!("(?s)^(?:{raw})$"))?;
                Ok(Self { regex })
            }
        }
    }

    /// True when the pattern matches the entire text.
    pub fn is_match(&self, collapsed: &str) -> bool {
        self.regex.is_match(collapsed)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

fn build_regex(identifier: &str, source: &str) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .size_limit(COMPILED_SIZE_LIMIT)
        .dfa_size_limit(COMPILED_SIZE_LIMIT)
        .build()
        .map_err(|source| CatalogError::InvalidPattern {
            identifier: identifier.to_string(),
            source,
        })
}

// ---------------------------------------------------------------------------
// Markup parser
// ---------------------------------------------------------------------------

fn parse_segments(identifier: &str, source: &str) -> Result<Vec<Segment>> {
    // Bottom of the stack is the template body; each open optional block
    // pushes a frame.
    let mut stack: Vec<Vec<Segment>> = vec![Vec::new()];
    let mut text = String::new();
    let mut rest = source;

    while let Some(start) = rest.find("<<") {
        let offset = source.len() - rest.len() + start;
        text.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = find_marker_end(after).ok_or_else(|| {
            CatalogError::template(identifier, format!("unterminated marker at byte {offset}"))
        })?;
        let body = after[..end].trim();
        rest = &after[end + 2..];

        flush_text(&mut text, &mut stack);
        match parse_marker(identifier, body)? {
            Marker::BeginOptional => stack.push(Vec::new()),
            Marker::EndOptional => {
                if stack.len() < 2 {
                    return Err(CatalogError::template(
                        identifier,
                        format!("<<endOptional>> without matching <<beginOptional>> at byte {offset}"),
                    ));
                }
                let inner = stack.pop().unwrap_or_default();
                if let Some(top) = stack.last_mut() {
                    top.push(Segment::Optional(inner));
                }
            }
            Marker::Var(var) => {
                if let Some(top) = stack.last_mut() {
                    top.push(var);
                }
            }
        }
    }

    text.push_str(rest);
    flush_text(&mut text, &mut stack);

    if stack.len() != 1 {
        return Err(CatalogError::template(
            identifier,
            "<<beginOptional>> is never closed",
        ));
    }
    Ok(stack.pop().unwrap_or_default())
}

fn flush_text(text: &mut String, stack: &mut [Vec<Segment>]) {
    if text.is_empty() {
        return;
    }
    if let Some(top) = stack.last_mut() {
        top.push(Segment::Text(std::mem::take(text)));
    }
}

/// Byte offset of the closing `>>`, ignoring any inside double quotes.
fn find_marker_end(body: &str) -> Option<usize> {
    let mut in_quote = false;
    for (i, c) in body.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '>' if !in_quote && body[i..].starts_with(">>") => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_marker(identifier: &str, body: &str) -> Result<Marker> {
    if body == "beginOptional" || body.starts_with("beginOptional;") {
        return Ok(Marker::BeginOptional);
    }
    if body == "endOptional" {
        return Ok(Marker::EndOptional);
    }
    if let Some(fields) = body.strip_prefix("var;") {
        return parse_var(identifier, fields).map(Marker::Var);
    }

    let simple_name = !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.'));
    if simple_name {
        return Ok(Marker::Var(Segment::Var {
            name: body.to_string(),
            original: None,
            pattern: None,
        }));
    }

    Err(CatalogError::template(
        identifier,
        format!("unknown marker <<{body}>>"),
    ))
}

fn parse_var(identifier: &str, fields: &str) -> Result<Segment> {
    let mut name = None;
    let mut original = None;
    let mut pattern = None;

    for field in split_fields(fields) {
        let Some((key, value)) = field.split_once('=') else {
            return Err(CatalogError::template(
                identifier,
                format!("malformed var field `{field}`"),
            ));
        };
        let value = unquote(value.trim());
        match key.trim() {
            "name" => name = Some(value.to_string()),
            "original" => original = Some(value.to_string()),
            "match" => {
                build_regex(identifier, value)?;
                pattern = Some(value.to_string());
            }
            // Other SPDX attributes (e.g. `example`) carry no matching semantics.
            _ => {}
        }
    }

    match name {
        Some(name) if !name.is_empty() => Ok(Segment::Var {
            name,
            original,
            pattern,
        }),
        _ => Err(CatalogError::template(identifier, "var marker without a name")),
    }
}

/// Split `a="x;y";b="z"` on semicolons outside quotes.
fn split_fields(fields: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut in_quote = false;
    let mut start = 0;
    for (i, c) in fields.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            ';' if !in_quote => {
                out.push(&fields[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&fields[start..]);
    out.into_iter().filter(|f| !f.trim().is_empty()).collect()
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

// ---------------------------------------------------------------------------
// Rendering and regex generation
// ---------------------------------------------------------------------------

fn render_into(segments: &[Segment], out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Var { name, original, .. } => match original {
                Some(original) => out.push_str(original),
                None => {
                    out.push('<');
                    out.push_str(name);
                    out.push('>');
                }
            },
            Segment::Optional(inner) => render_into(inner, out),
        }
    }
}

fn tokenize<'t>(segments: &'t [Segment], tokens: &mut Vec<Token<'t>>) {
    for segment in segments {
        match segment {
            Segment::Text(text) => {
                let mut word = String::new();
                for c in text.chars() {
                    if c.is_whitespace() {
                        if !word.is_empty() {
                            tokens.push(Token::Word(std::mem::take(&mut word)));
                        }
                        if !matches!(tokens.last(), Some(Token::Gap)) {
                            tokens.push(Token::Gap);
                        }
                    } else {
                        word.push(c);
                    }
                }
                if !word.is_empty() {
                    tokens.push(Token::Word(word));
                }
            }
            Segment::Var { pattern, .. } => tokens.push(Token::Var(pattern.as_deref())),
            Segment::Optional(inner) => tokens.push(Token::Optional(layout(inner))),
        }
    }
}

/// Assign the whitespace around optional blocks.
///
/// A block between two required pieces keeps the gap in front of it and
/// takes the gap behind it. At the start or end of a sequence the block takes
/// the single gap on its inner side. Gaps at the edges of the sequence are
/// dropped and reported through `leading_gap` and `trailing_gap`.
fn layout(segments: &[Segment]) -> Layout<'_> {
    let mut tokens = Vec::new();
    tokenize(segments, &mut tokens);

    let leading_gap = match tokens.first() {
        Some(Token::Gap) => true,
        Some(Token::Optional(inner)) => inner.leading_gap,
        _ => false,
    };
    let trailing_gap = match tokens.last() {
        Some(Token::Gap) => true,
        Some(Token::Optional(inner)) => inner.trailing_gap,
        _ => false,
    };

    let mut required_after = vec![false; tokens.len()];
    for i in (0..tokens.len().saturating_sub(1)).rev() {
        required_after[i] =
            required_after[i + 1] || matches!(tokens[i + 1], Token::Word(_) | Token::Var(_));
    }
    let gap_next: Vec<bool> = (0..tokens.len())
        .map(|i| matches!(tokens.get(i + 1), Some(Token::Gap)))
        .collect();

    let mut pieces: Vec<Piece<'_>> = Vec::new();
    let mut after_gap = false;
    let mut skip_gap = false;
    for (i, token) in tokens.into_iter().enumerate() {
        let gap_before = std::mem::take(&mut after_gap);
        let taken = std::mem::take(&mut skip_gap);
        match token {
            Token::Gap => {
                if !taken && !pieces.is_empty() {
                    pieces.push(Piece::Gap);
                }
                after_gap = true;
            }
            Token::Word(word) => pieces.push(Piece::Word(word)),
            Token::Var(pattern) => pieces.push(Piece::Var(pattern)),
            Token::Optional(inner) => {
                let open_left =
                    (inner.leading_gap || gap_before) && pieces.iter().any(Piece::is_required);
                let open_right = (inner.trailing_gap || gap_next[i]) && required_after[i];
                let mut body = inner.pieces;
                if open_left && open_right {
                    if pieces.last().is_some_and(Piece::is_required) {
                        pieces.push(Piece::Gap);
                    }
                    body.push(Piece::Gap);
                } else {
                    if pieces.last() == Some(&Piece::Gap) {
                        pieces.pop();
                    }
                    if open_left {
                        body.insert(0, Piece::Gap);
                    } else if open_right {
                        body.push(Piece::Gap);
                    }
                }
                pieces.push(Piece::Optional(body));
                skip_gap = gap_next[i];
            }
        }
    }
    if pieces.last() == Some(&Piece::Gap) {
        pieces.pop();
    }

    Layout {
        pieces,
        leading_gap,
        trailing_gap,
    }
}

/// Append the regex for `pieces`. `before` and `after` are the pieces just
/// outside the sequence, for gaps at its edges.
fn emit(
    pieces: &[Piece<'_>],
    before: Option<&Piece<'_>>,
    after: Option<&Piece<'_>>,
    re: &mut String,
) {
    for (i, piece) in pieces.iter().enumerate() {
        let prev = if i == 0 { before } else { pieces.get(i - 1) };
        let next = pieces.get(i + 1).or(after);
        match piece {
            Piece::Word(word) => push_literal(re, word),
            Piece::Gap => {
                // Variables may match nothing, so the space beside one is optional.
                let loose = prev.is_some_and(|p| p.var_at_edge(false))
                    || next.is_some_and(|p| p.var_at_edge(true));
                re.push_str(if loose { r"\s*" } else { r"\s+" });
            }
            Piece::Var(Some(pattern)) => {
                re.push_str("(?:");
                re.push_str(pattern);
                re.push(')');
            }
            Piece::Var(None) => re.push_str(WILDCARD),
            Piece::Optional(body) => {
                re.push_str("(?:");
                emit(body, prev, next, re);
                re.push_str(")?");
            }
        }
    }
}

/// Escape a literal word; quote and dash variants match each other.
fn push_literal(re: &mut String, word: &str) {
    let mut buf = [0u8; 4];
    for c in word.chars() {
        match c {
            '"' | '\u{201C}' | '\u{201D}' => re.push_str("[\"\u{201C}\u{201D}]"),
            '\'' | '\u{2018}' | '\u{2019}' => re.push_str("['\u{2018}\u{2019}]"),
            '-' | '\u{2013}' | '\u{2014}' => re.push_str("[-\u{2013}\u{2014}]"),
            _ => re.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
}
