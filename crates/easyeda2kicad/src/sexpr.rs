/// Nested-list document model for KiCad files.
///
/// Grammar accepted by [`decode`]:
///   node   = list | string | token
///   list   = '(' node* ')'
///   string = '"' ( [^"\\] | '\' any | '""' )* '"'
///   token  = [^ \t\n\r()"]+     (coerced to a number when it is one)
///
/// [`encode`] is the inverse for trees without formatting hints; nulls and
/// hints never reach the output text.
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Formatting marker interleaved with list items. Not a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// Line break followed by `level` steps of indentation.
    Break(u8),
}

#[derive(Debug, Clone)]
pub enum Node {
    Str(String),
    Num(f64),
    /// Elided on output.
    Null,
    List(Vec<Node>),
    Hint(Hint),
}

/// Build a [`Node::List`] from anything convertible into a [`Node`].
///
/// ```
/// use easyeda2kicad::{list, sexpr::encode};
/// let seg = list!["segment", list!["start", 0, 0], list!["width", 0.16]];
/// assert_eq!(encode(&seg), "(segment (start 0 0) (width 0.16))");
/// ```
#[macro_export]
macro_rules! list {
    ($($item:expr),* $(,)?) => {
        $crate::sexpr::Node::List(vec![$($crate::sexpr::Node::from($item)),*])
    };
}

/// Line break at top level (`_LF_`).
pub const BR: Node = Node::Hint(Hint::Break(0));
/// Line break one level in (`_LF1_`).
pub const BR1: Node = Node::Hint(Hint::Break(1));
/// Line break two levels in (`_LF2_`).
pub const BR2: Node = Node::Hint(Hint::Break(2));
/// Line break three levels in (`_LF3_`).
pub const BR3: Node = Node::Hint(Hint::Break(3));

impl Node {
    /// True for nodes that are part of the document structure.
    pub fn is_content(&self) -> bool {
        !matches!(self, Node::Null | Node::Hint(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Node::List(_))
    }

    /// Content items of a list, skipping nulls and hints.
    pub fn items(&self) -> impl Iterator<Item = &Node> {
        let items: &[Node] = match self {
            Node::List(items) => items,
            _ => &[],
        };
        items.iter().filter(|n| n.is_content())
    }

    /// Get the first atom in a list (the "tag" or "name").
    pub fn tag(&self) -> Option<&str> {
        self.items().next().and_then(Node::as_str)
    }

    /// Content items after the tag.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.items().skip(1)
    }

    /// Find a child list with the given tag.
    pub fn find(&self, tag: &str) -> Option<&Node> {
        self.children().find(|c| c.tag() == Some(tag))
    }

    /// Find all child lists with the given tag.
    pub fn find_all(&self, tag: &str) -> Vec<&Node> {
        self.children().filter(|c| c.tag() == Some(tag)).collect()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Num(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the nth child (0-indexed after the tag).
    pub fn child_at(&self, index: usize) -> Option<&Node> {
        self.children().nth(index)
    }

    /// Get the nth child as f64.
    pub fn f64_at(&self, index: usize) -> Option<f64> {
        self.child_at(index).and_then(Node::as_f64)
    }

    /// Get the nth child as a string.
    pub fn str_at(&self, index: usize) -> Option<&str> {
        self.child_at(index).and_then(Node::as_str)
    }
}

/// Equality ignores nulls and formatting hints inside lists.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Str(a), Node::Str(b)) => a == b,
            (Node::Num(a), Node::Num(b)) => a == b,
            (Node::Null, Node::Null) => true,
            (Node::Hint(a), Node::Hint(b)) => a == b,
            (Node::List(_), Node::List(_)) => self.items().eq(other.items()),
            _ => false,
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Str(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Str(s)
    }
}

impl From<&String> for Node {
    fn from(s: &String) -> Self {
        Node::Str(s.clone())
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Num(v)
    }
}

impl From<i32> for Node {
    fn from(v: i32) -> Self {
        Node::Num(v as f64)
    }
}

impl From<u32> for Node {
    fn from(v: u32) -> Self {
        Node::Num(v as f64)
    }
}

impl From<usize> for Node {
    fn from(v: usize) -> Self {
        Node::Num(v as f64)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::List(items)
    }
}

impl From<Option<Node>> for Node {
    fn from(node: Option<Node>) -> Self {
        node.unwrap_or(Node::Null)
    }
}

impl From<Hint> for Node {
    fn from(hint: Hint) -> Self {
        Node::Hint(hint)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

/// Recursively drop nulls and hints.
pub fn flatten_and_filter(node: &Node) -> Node {
    match node {
        Node::List(items) => Node::List(
            items
                .iter()
                .filter(|n| n.is_content())
                .map(flatten_and_filter)
                .collect(),
        ),
        other => other.clone(),
    }
}

// ─── Encoder ─────────────────────────────────────────────────────────

/// Single-line text form.
pub fn encode(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, false);
    out
}

/// Text form with hints rendered as line breaks and indentation.
pub fn encode_pretty(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, true);
    out
}

fn write_node(out: &mut String, node: &Node, pretty: bool) {
    match node {
        Node::Str(s) => out.push_str(&encode_string(s)),
        Node::Num(v) => out.push_str(&encode_number(*v)),
        Node::List(items) => write_list(out, items, pretty),
        Node::Null | Node::Hint(_) => {}
    }
}

fn write_list(out: &mut String, items: &[Node], pretty: bool) {
    out.push('(');
    let mut first = true;
    let mut pending_break: Option<u8> = None;
    for item in items {
        match item {
            Node::Null => continue,
            Node::Hint(Hint::Break(level)) => {
                if pretty {
                    pending_break = Some(*level);
                }
                continue;
            }
            _ => {}
        }
        if let Some(level) = pending_break.take() {
            out.push('\n');
            for _ in 0..level {
                out.push_str("  ");
            }
        } else if !first {
            out.push(' ');
        }
        first = false;
        write_node(out, item, pretty);
    }
    out.push(')');
}

fn is_bare(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2
        && bytes[0].is_ascii_lowercase()
        && bytes[1..]
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'_')
}

/// Quote a string unless it is a bare identifier.
pub fn encode_string(s: &str) -> Cow<'_, str> {
    if is_bare(s) {
        return Cow::Borrowed(s);
    }
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Magnitudes from here on have no fractional digits worth keeping and
/// are written as they are.
const ROUNDING_LIMIT: f64 = 1e12;

/// Round half-up to 3 decimals; negative zero prints as `0`.
///
/// Every value encodes as a number token: NaN becomes `0` and infinities
/// are clamped to the largest finite magnitude.
pub fn encode_number(value: f64) -> String {
    let value = if value.is_nan() {
        0.0
    } else {
        value.clamp(f64::MIN, f64::MAX)
    };
    if value.abs() >= ROUNDING_LIMIT {
        return format!("{value}");
    }
    let rounded = (value * 1000.0 + f64::EPSILON + 0.5).floor() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

// ─── Decoder ─────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected ')' at offset {0}")]
    UnexpectedClose(usize),

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("trailing input at offset {0}")]
    TrailingInput(usize),

    #[error("nesting deeper than {MAX_DEPTH} lists at offset {0}")]
    TooDeep(usize),
}

/// Deepest list nesting the decoder accepts.
pub const MAX_DEPTH: usize = 512;

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn parse_string(&mut self) -> Result<Node, DecodeError> {
        let start = self.pos;
        // Skip opening quote
        self.pos += 1;
        let mut bytes = Vec::new();
        loop {
            match self.peek() {
                None => return Err(DecodeError::UnterminatedString(start)),
                Some(b'"') => {
                    if self.input.get(self.pos + 1) == Some(&b'"') {
                        bytes.push(b'"');
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                        break;
                    }
                }
                Some(b'\\') => {
                    let escaped = self
                        .input
                        .get(self.pos + 1)
                        .copied()
                        .ok_or(DecodeError::UnterminatedString(start))?;
                    bytes.push(if escaped == b'n' { b'\n' } else { escaped });
                    self.pos += 2;
                }
                Some(b) => {
                    bytes.push(b);
                    self.pos += 1;
                }
            }
        }
        Ok(Node::Str(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn parse_token(&mut self) -> Node {
        let start = self.pos;
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' | b'(' | b')' | b'"' => break,
                _ => self.pos += 1,
            }
        }
        let token = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        match parse_number(&token) {
            Some(v) => Node::Num(v),
            None => Node::Str(token),
        }
    }

    fn parse_node(&mut self) -> Result<Node, DecodeError> {
        self.skip_whitespace();
        match self.peek().ok_or(DecodeError::UnexpectedEof)? {
            b'(' => {
                if self.depth == MAX_DEPTH {
                    return Err(DecodeError::TooDeep(self.pos));
                }
                self.depth += 1;
                self.pos += 1;
                let mut items = Vec::new();
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        Some(b')') => {
                            self.pos += 1;
                            break;
                        }
                        None => return Err(DecodeError::UnexpectedEof),
                        _ => items.push(self.parse_node()?),
                    }
                }
                self.depth -= 1;
                Ok(Node::List(items))
            }
            b'"' => self.parse_string(),
            b')' => Err(DecodeError::UnexpectedClose(self.pos)),
            _ => Ok(self.parse_token()),
        }
    }
}

/// Bare tokens that read as finite numbers become [`Node::Num`].
fn parse_number(token: &str) -> Option<f64> {
    let first = *token.as_bytes().first()?;
    if !(first.is_ascii_digit() || matches!(first, b'-' | b'+' | b'.')) {
        return None;
    }
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a document from text.
pub fn decode(text: &str) -> Result<Node, DecodeError> {
    let mut parser = Parser::new(text.as_bytes());
    let node = parser.parse_node()?;
    parser.skip_whitespace();
    if parser.pos < parser.input.len() {
        return Err(DecodeError::TrailingInput(parser.pos));
    }
    Ok(node)
}
