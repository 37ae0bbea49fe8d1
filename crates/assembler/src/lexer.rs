//! Tokenizer for HRM program text.
//!
//! Tokenization is lossless: every byte of a line belongs to exactly one
//! token, so [`render_tokens`] reproduces the source. Lines skipped as a
//! whole (`define` blocks, `comment` markers) become a single
//! [`TokenKind::Comment`] token.

/// Column range of a token within its line (byte offsets, end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// First byte of the token.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

impl Span {
    /// Span from `start` up to, not including, `end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// What a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `-?[0-9]+`. The value is checked by the parser.
    Integer,
    /// Any other run of non-space, non-bracket characters.
    Word,
    /// A whole `name:` label declaration.
    LabelDef,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `-- ...` to end of line, or a skipped line.
    Comment,
    /// A run of whitespace.
    Whitespace,
}

/// A single token with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based source line.
    pub line: usize,
    pub span: Span,
}

impl Token {
    fn new(kind: TokenKind, text: &str, line: usize, start: usize) -> Self {
        Self {
            kind,
            text: text.to_string(),
            line,
            span: Span::new(start, start + text.len()),
        }
    }

    /// Comments and whitespace carry no meaning for the parser.
    pub fn is_significant(&self) -> bool {
        !matches!(self.kind, TokenKind::Comment | TokenKind::Whitespace)
    }

    /// The declared name, for a [`TokenKind::LabelDef`] token.
    pub fn label_name(&self) -> Option<&str> {
        match self.kind {
            TokenKind::LabelDef => self.text.strip_suffix(':').map(str::trim),
            _ => None,
        }
    }

    /// A copy of this token at the same position with different text.
    ///
    /// Operand tokens are reclassified from the new text; label
    /// declarations, comments and whitespace keep their kind.
    pub fn substitute(&self, text: impl Into<String>) -> Token {
        let text = text.into();
        let kind = match self.kind {
            TokenKind::LabelDef | TokenKind::Comment | TokenKind::Whitespace => self.kind,
            _ => classify(&text),
        };
        Token {
            kind,
            line: self.line,
            span: Span::new(self.span.start, self.span.start + text.len()),
            text,
        }
    }
}

/// Classify a bracket or a word.
fn classify(text: &str) -> TokenKind {
    match text {
        "[" => TokenKind::LBracket,
        "]" => TokenKind::RBracket,
        _ if is_integer(text) => TokenKind::Integer,
        _ => TokenKind::Word,
    }
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn first_word_is(line: &str, keyword: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|w| w.eq_ignore_ascii_case(keyword))
}

/// Tokenize a whole program.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut in_define = false;

    for (idx, line) in source.lines().enumerate() {
        let line_num = idx + 1;
        let trimmed = line.trim();

        if in_define {
            if trimmed.is_empty() || trimmed.ends_with(';') {
                in_define = false;
            }
            if !line.is_empty() {
                tokens.push(Token::new(TokenKind::Comment, line, line_num, 0));
            }
            continue;
        }

        if first_word_is(trimmed, "define") {
            in_define = !trimmed.ends_with(';');
            tokens.push(Token::new(TokenKind::Comment, line, line_num, 0));
            continue;
        }

        if first_word_is(trimmed, "comment") {
            tokens.push(Token::new(TokenKind::Comment, line, line_num, 0));
            continue;
        }

        tokenize_line(line, line_num, &mut tokens);
    }

    tokens
}

/// Tokenize a single ordinary line (not part of a skipped block).
fn tokenize_line(line: &str, line_num: usize, tokens: &mut Vec<Token>) {
    let comment_start = line.find("--").unwrap_or(line.len());
    let code = &line[..comment_start];

    if code.trim_end().ends_with(':') {
        let body_start = code.len() - code.trim_start().len();
        let body_end = code.trim_end().len();
        if body_start > 0 {
            tokens.push(Token::new(TokenKind::Whitespace, &code[..body_start], line_num, 0));
        }
        tokens.push(Token::new(
            TokenKind::LabelDef,
            &code[body_start..body_end],
            line_num,
            body_start,
        ));
        if body_end < code.len() {
            tokens.push(Token::new(
                TokenKind::Whitespace,
                &code[body_end..],
                line_num,
                body_end,
            ));
        }
    } else {
        tokenize_code(code, line_num, tokens);
    }

    if comment_start < line.len() {
        tokens.push(Token::new(
            TokenKind::Comment,
            &line[comment_start..],
            line_num,
            comment_start,
        ));
    }
}

fn tokenize_code(code: &str, line_num: usize, tokens: &mut Vec<Token>) {
    let mut chars = code.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let mut end = start + c.len_utf8();
        if c == '[' || c == ']' {
            tokens.push(Token::new(classify(&code[start..end]), &code[start..end], line_num, start));
            continue;
        }

        let whitespace = c.is_whitespace();
        while let Some(&(pos, next)) = chars.peek() {
            let same_run = if whitespace {
                next.is_whitespace()
            } else {
                !next.is_whitespace() && next != '[' && next != ']'
            };
            if !same_run {
                break;
            }
            end = pos + next.len_utf8();
            chars.next();
        }

        let text = &code[start..end];
        let kind = if whitespace {
            TokenKind::Whitespace
        } else {
            classify(text)
        };
        tokens.push(Token::new(kind, text, line_num, start));
    }
}

/// Reassemble source text from tokens.
///
/// Lines that produced no tokens come back as empty lines.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut line = 1;
    for token in tokens {
        while line < token.line {
            out.push('\n');
            line += 1;
        }
        out.push_str(&token.text);
    }
    if !tokens.is_empty() {
        out.push('\n');
    }
    out
}
