//! Query lexer (tokenizer).
//!
//! Scans a normalized query left to right. At every position each token
//! category is tried in order and the longest match wins; on equal length the
//! earlier category wins:
//!
//! 1. group open: `(`, `-(` or `!(`, at the start, after whitespace or after `(`
//! 2. group close: `)`
//! 3. negation: `-` or `!` not followed by `(`
//! 4. range: `key:A..B` or `key=A..B` over numbers or dates
//! 5. comparison: `key` then `:`, `=`, `>`, `<`, `>=` or `<=`, then a number or date
//! 6. term: optional `key:` then a word, a `"phrase"` or a `/regex/`
//!
//! Anything else up to the next whitespace is skipped and reported as a
//! syntax error. Scanning never aborts.

mod cleanup;
mod literal;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{config::ParserConfig, error::ParseError, instant};
use literal::{Classified, Literal, Period, classify, is_literal_char};

/// A token with its character offset in the normalized query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// What was scanned.
    #[serde(flatten)]
    pub kind: TokenKind,
    /// Character offset of the term this token was scanned from.
    pub position: usize,
}

impl Token {
    /// Creates a token at `position`.
    pub fn new(kind: TokenKind, position: usize) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @{}", self.kind, self.position)
    }
}

/// The kinds of token the lexer produces.
///
/// Range and coarse date expansions produce several tokens for one term; all
/// of them carry the position of that term.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenKind {
    /// A bare word.
    Word {
        /// The word.
        value: String,
    },

    /// A quoted phrase (quotes stripped).
    Phrase {
        /// Text between the quotes.
        value: String,
    },

    /// A slash-delimited regular expression (slashes stripped).
    Regex {
        /// The pattern body.
        value: String,
    },

    /// `key:word`
    Keyword {
        /// Field name.
        key: String,
        /// The word.
        value: String,
    },

    /// `key:"phrase"`
    KeywordPhrase {
        /// Field name.
        key: String,
        /// Text between the quotes.
        value: String,
    },

    /// `key:/regex/`
    KeywordRegex {
        /// Field name.
        key: String,
        /// The pattern body.
        value: String,
    },

    /// A numeric comparison against a field.
    KeywordNumeric {
        /// Field name.
        key: String,
        /// Comparison operator.
        operator: Comparison,
        /// Number compared against.
        value: f64,
    },

    /// A date comparison against a field.
    KeywordDate {
        /// Field name.
        key: String,
        /// Comparison operator.
        operator: Comparison,
        /// Instant compared against.
        #[serde(serialize_with = "instant::serialize")]
        value: DateTime<Utc>,
    },

    /// A logical operator between terms.
    Operator {
        /// Spelling used in the query.
        value: LogicalOperator,
    },

    /// Start of a group.
    OpenParen {
        /// The group was written `-(` or `!(`.
        negated: bool,
    },

    /// End of a group.
    CloseParen,

    /// A standalone `-` or `!` negating the following term.
    Negation,
}

impl TokenKind {
    /// Returns the snake_case name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Word { .. } => "word",
            Self::Phrase { .. } => "phrase",
            Self::Regex { .. } => "regex",
            Self::Keyword { .. } => "keyword",
            Self::KeywordPhrase { .. } => "keyword_phrase",
            Self::KeywordRegex { .. } => "keyword_regex",
            Self::KeywordNumeric { .. } => "keyword_numeric",
            Self::KeywordDate { .. } => "keyword_date",
            Self::Operator { .. } => "operator",
            Self::OpenParen { .. } => "open_paren",
            Self::CloseParen => "close_paren",
            Self::Negation => "negation",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Self::Word { value } => write!(f, "{name}({value})"),
            Self::Phrase { value } => write!(f, "{name}({value:?})"),
            Self::Regex { value } => write!(f, "{name}(/{value}/)"),
            Self::Keyword { key, value } => write!(f, "{name}({key}:{value})"),
            Self::KeywordPhrase { key, value } => write!(f, "{name}({key}:{value:?})"),
            Self::KeywordRegex { key, value } => write!(f, "{name}({key}:/{value}/)"),
            Self::KeywordNumeric {
                key,
                operator,
                value,
            } => write!(f, "{name}({key} {operator} {value})"),
            Self::KeywordDate {
                key,
                operator,
                value,
            } => write!(
                f,
                "{name}({key} {operator} {})",
                instant::format_instant(value)
            ),
            Self::Operator { value } => write!(f, "{name}({value})"),
            Self::OpenParen { negated: true } => write!(f, "{name}(negated)"),
            Self::OpenParen { negated: false } | Self::CloseParen | Self::Negation => {
                f.write_str(name)
            }
        }
    }
}

/// Comparison operator of a numeric or date condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Comparison {
    /// `:`
    #[serde(rename = ":")]
    Colon,
    /// `=`
    #[serde(rename = "=")]
    Eq,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `>=`
    #[serde(rename = ">=")]
    Gte,
    /// `<=`
    #[serde(rename = "<=")]
    Lte,
}

impl Comparison {
    /// Returns the operator as written in a query.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Colon => ":",
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
        }
    }

    /// `:` and `=` both test equality.
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Colon | Self::Eq)
    }

    /// Tests `actual <op> expected`.
    pub fn holds<T: PartialOrd>(self, actual: &T, expected: &T) -> bool {
        match self {
            Self::Colon | Self::Eq => actual == expected,
            Self::Gt => actual > expected,
            Self::Lt => actual < expected,
            Self::Gte => actual >= expected,
            Self::Lte => actual <= expected,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical operator spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogicalOperator {
    /// `AND` (any case).
    #[serde(rename = "AND")]
    And,
    /// `OR` (any case).
    #[serde(rename = "OR")]
    Or,
    /// `&`
    #[serde(rename = "&")]
    Ampersand,
    /// `|`
    #[serde(rename = "|")]
    Pipe,
}

impl LogicalOperator {
    /// Recognizes a bare word as an operator, ignoring case.
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "&" => Some(Self::Ampersand),
            "|" => Some(Self::Pipe),
            _ => None,
        }
    }

    /// Returns the canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Ampersand => "&",
            Self::Pipe => "|",
        }
    }

    /// `OR` and `|` are disjunctions; `AND` and `&` are conjunctions.
    pub fn is_disjunction(self) -> bool {
        matches!(self, Self::Or | Self::Pipe)
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the lexer: cleaned tokens plus every recoverable error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    /// Tokens after empty-group and stray-operator cleanup.
    pub tokens: Vec<Token>,
    /// Syntax, key and literal errors in source order.
    pub errors: Vec<ParseError>,
}

/// How a term's value was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueForm {
    /// Bare word.
    Word,
    /// `"..."`
    Phrase,
    /// `/.../`
    Regex,
}

impl ValueForm {
    /// Token kind for a keyless term.
    fn bare(self, value: String) -> TokenKind {
        match self {
            Self::Word => TokenKind::Word { value },
            Self::Phrase => TokenKind::Phrase { value },
            Self::Regex => TokenKind::Regex { value },
        }
    }

    /// Token kind for a term scoped to `key`.
    fn keyed(self, key: String, value: String) -> TokenKind {
        match self {
            Self::Word => TokenKind::Keyword { key, value },
            Self::Phrase => TokenKind::KeywordPhrase { key, value },
            Self::Regex => TokenKind::KeywordRegex { key, value },
        }
    }
}

/// A scanned term value.
struct ScannedValue {
    /// How the value was written.
    form: ValueForm,
    /// The value without delimiters.
    text: String,
    /// Offset just past the value.
    end: usize,
}

/// A match found by one token category.
struct Candidate {
    /// Characters covered by the match.
    len: usize,
    /// Field the match is scoped to, checked against the allow-list.
    key: Option<String>,
    /// Text after the key, reported with key and literal errors.
    value: String,
    /// What the match produces when accepted.
    outcome: Outcome,
}

impl Candidate {
    /// A match that is not scoped to any field.
    fn unkeyed(len: usize, token: Token) -> Self {
        Self {
            len,
            key: None,
            value: String::new(),
            outcome: Outcome::Tokens(vec![token]),
        }
    }
}

/// What an accepted match produces.
enum Outcome {
    /// Tokens to append.
    Tokens(Vec<Token>),
    /// A literal shaped like a number or date that names no real value.
    MalformedLiteral,
}

/// Signature shared by the token categories.
type Scan<'a> = fn(&Lexer<'a>, usize) -> Option<Candidate>;

/// Tokenizes a normalized query.
struct Lexer<'a> {
    /// The query as characters; positions index into this.
    chars: Vec<char>,
    /// Current offset.
    position: usize,
    /// Allow-list, default key and literal strictness.
    config: &'a ParserConfig,
    /// Tokens produced so far.
    tokens: Vec<Token>,
    /// Errors recorded so far.
    errors: Vec<ParseError>,
}

impl<'a> Lexer<'a> {
    /// Token categories in priority order.
    const CATEGORIES: [Scan<'a>; 6] = [
        Self::scan_group_open,
        Self::scan_group_close,
        Self::scan_negation,
        Self::scan_range,
        Self::scan_comparison,
        Self::scan_term,
    ];

    /// Creates a lexer over `input`.
    fn new(input: &str, config: &'a ParserConfig) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            config,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Scans the whole input.
    fn tokenize(mut self) -> TokenStream {
        while self.position < self.chars.len() {
            if self.chars[self.position].is_whitespace() {
                self.position += 1;
                continue;
            }

            let start = self.position;
            match self.longest_match(start) {
                Some(candidate) => {
                    self.position += candidate.len;
                    self.accept(start, candidate);
                }
                None => self.skip_unexpected(start),
            }
        }

        TokenStream {
            tokens: cleanup::cleanup(self.tokens),
            errors: self.errors,
        }
    }

    /// Runs every category at `start` and keeps the longest match.
    fn longest_match(&self, start: usize) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for scan in Self::CATEGORIES {
            if let Some(candidate) = scan(self, start)
                && best.as_ref().is_none_or(|b| candidate.len > b.len)
            {
                best = Some(candidate);
            }
        }
        best
    }

    /// Applies the allow-list and literal checks, then keeps the tokens.
    fn accept(&mut self, start: usize, candidate: Candidate) {
        if let Some(key) = &candidate.key
            && !self.config.accepts_key(key)
        {
            debug!(key = %key, position = start, "rejected key not in allow-list");
            self.errors
                .push(ParseError::invalid_key(start, key, &candidate.value));
            self.drop_dangling_negation();
            return;
        }

        match candidate.outcome {
            Outcome::Tokens(tokens) => self.tokens.extend(tokens),
            Outcome::MalformedLiteral => {
                debug!(value = %candidate.value, position = start, "dropped malformed literal");
                if self.config.strict_literals {
                    self.errors.push(ParseError::invalid_literal(
                        start,
                        candidate.key.as_deref(),
                        &candidate.value,
                    ));
                }
                self.drop_dangling_negation();
            }
        }
    }

    /// Removes a negation that no longer has an operand.
    fn drop_dangling_negation(&mut self) {
        if self
            .tokens
            .last()
            .is_some_and(|t| t.kind == TokenKind::Negation)
        {
            self.tokens.pop();
        }
    }

    /// Skips the non-whitespace run at `start` and records a syntax error.
    fn skip_unexpected(&mut self, start: usize) {
        let end = self.run_end(start, |ch| !ch.is_whitespace());
        let text = self.text(start, end);
        debug!(value = %text, position = start, "skipped unexpected syntax");
        self.errors.push(ParseError::syntax(start, text));
        self.position = end;
    }

    /// `(`, `-(` or `!(` at a group boundary.
    fn scan_group_open(&self, start: usize) -> Option<Candidate> {
        let at_boundary = start == 0
            || self
                .chars
                .get(start - 1)
                .is_some_and(|&ch| ch.is_whitespace() || ch == '(');
        if !at_boundary {
            return None;
        }

        let (len, negated) = match (self.peek_at(start)?, self.peek_at(start + 1)) {
            ('(', _) => (1, false),
            ('-' | '!', Some('(')) => (2, true),
            _ => return None,
        };
        Some(Candidate::unkeyed(
            len,
            Token::new(TokenKind::OpenParen { negated }, start),
        ))
    }

    /// `)`
    fn scan_group_close(&self, start: usize) -> Option<Candidate> {
        (self.peek_at(start)? == ')')
            .then(|| Candidate::unkeyed(1, Token::new(TokenKind::CloseParen, start)))
    }

    /// `-` or `!` not opening a group.
    fn scan_negation(&self, start: usize) -> Option<Candidate> {
        let is_marker = matches!(self.peek_at(start)?, '-' | '!');
        let opens_group = self.peek_at(start + 1) == Some('(');
        (is_marker && !opens_group)
            .then(|| Candidate::unkeyed(1, Token::new(TokenKind::Negation, start)))
    }

    /// `key:A..B` or `key=A..B`.
    fn scan_range(&self, start: usize) -> Option<Candidate> {
        let key_end = self.scan_key(start)?;
        if !matches!(self.peek_at(key_end)?, ':' | '=') {
            return None;
        }

        let literal_start = key_end + 1;
        let literal_end = self.run_end(literal_start, is_literal_char);
        let text = self.text(literal_start, literal_end);
        let (low, high) = text.split_once("..")?;
        let key = self.text(start, key_end);

        let outcome = match (classify(low), classify(high)) {
            (
                Classified::Valid(Literal::Number(low)),
                Classified::Valid(Literal::Number(high)),
            ) => Outcome::Tokens(vec![
                numeric(&key, Comparison::Gte, low, start),
                numeric(&key, Comparison::Lte, high, start),
            ]),
            (
                Classified::Valid(Literal::Period(low)),
                Classified::Valid(Literal::Period(high)),
            ) => Outcome::Tokens(date_group(&key, low.start, high.end, start)),
            (Classified::NotLiteral, _) | (_, Classified::NotLiteral) => return None,
            (Classified::Valid(_), Classified::Valid(_)) => return None,
            _ => Outcome::MalformedLiteral,
        };

        Some(Candidate {
            len: literal_end - start,
            key: Some(key),
            value: text,
            outcome,
        })
    }

    /// `key<op>literal` for a number or date literal.
    fn scan_comparison(&self, start: usize) -> Option<Candidate> {
        let key_end = self.scan_key(start)?;
        let (operator, operator_len) = self.scan_operator(key_end)?;

        let literal_start = key_end + operator_len;
        let literal_end = self.run_end(literal_start, is_literal_char);
        if literal_end == literal_start {
            return None;
        }
        let text = self.text(literal_start, literal_end);
        let key = self.text(start, key_end);

        let outcome = match classify(&text) {
            Classified::Valid(Literal::Number(value)) => {
                Outcome::Tokens(vec![numeric(&key, operator, value, start)])
            }
            Classified::Valid(Literal::Period(period)) => {
                Outcome::Tokens(date_comparison(&key, operator, &period, start))
            }
            Classified::Malformed => Outcome::MalformedLiteral,
            Classified::NotLiteral => return None,
        };

        Some(Candidate {
            len: literal_end - start,
            key: Some(key),
            value: text,
            outcome,
        })
    }

    /// Optional `key:` followed by a word, phrase or regex.
    fn scan_term(&self, start: usize) -> Option<Candidate> {
        if let Some(key_end) = self.scan_key(start)
            && self.peek_at(key_end) == Some(':')
            && let Some(value) = self.scan_value(key_end + 1)
        {
            let key = self.text(start, key_end);
            let token = Token::new(value.form.keyed(key.clone(), value.text.clone()), start);
            return Some(Candidate {
                len: value.end - start,
                key: Some(key),
                value: value.text,
                outcome: Outcome::Tokens(vec![token]),
            });
        }

        let value = self.scan_value(start)?;
        let len = value.end - start;

        if value.form == ValueForm::Word
            && let Some(operator) = LogicalOperator::from_word(&value.text)
        {
            return Some(Candidate::unkeyed(
                len,
                Token::new(TokenKind::Operator { value: operator }, start),
            ));
        }

        let (key, kind) = match &self.config.default_key {
            Some(default) => (
                Some(default.clone()),
                value.form.keyed(default.clone(), value.text.clone()),
            ),
            None => (None, value.form.bare(value.text.clone())),
        };

        Some(Candidate {
            len,
            key,
            value: value.text,
            outcome: Outcome::Tokens(vec![Token::new(kind, start)]),
        })
    }

    /// Scans the longest of a phrase, regex or word at `at`.
    fn scan_value(&self, at: usize) -> Option<ScannedValue> {
        [self.scan_phrase(at), self.scan_regex(at), self.scan_word(at)]
            .into_iter()
            .flatten()
            .fold(None, |best: Option<ScannedValue>, value| match best {
                Some(b) if b.end >= value.end => Some(b),
                _ => Some(value),
            })
    }

    /// `"..."` with no escapes; unclosed quotes do not match.
    fn scan_phrase(&self, at: usize) -> Option<ScannedValue> {
        if self.peek_at(at)? != '"' {
            return None;
        }
        let close = (at + 1..self.chars.len()).find(|&i| self.chars[i] == '"')?;
        Some(ScannedValue {
            form: ValueForm::Phrase,
            text: self.text(at + 1, close),
            end: close + 1,
        })
    }

    /// `/.../`, where `\/` does not close the pattern.
    fn scan_regex(&self, at: usize) -> Option<ScannedValue> {
        if self.peek_at(at)? != '/' {
            return None;
        }
        let mut i = at + 1;
        loop {
            match self.peek_at(i)? {
                '\\' => i += 2,
                '/' => break,
                _ => i += 1,
            }
        }
        Some(ScannedValue {
            form: ValueForm::Regex,
            text: self.text(at + 1, i),
            end: i + 1,
        })
    }

    /// A run of word characters; `&` and `|` stand alone.
    fn scan_word(&self, at: usize) -> Option<ScannedValue> {
        let first = self.peek_at(at)?;
        let end = match first {
            '&' | '|' => at + 1,
            '-' | '!' => return None,
            _ if is_word_char(first) => self.run_end(at, is_word_char),
            _ => return None,
        };
        Some(ScannedValue {
            form: ValueForm::Word,
            text: self.text(at, end),
            end,
        })
    }

    /// Scans a field name, returning the offset just past it.
    fn scan_key(&self, start: usize) -> Option<usize> {
        let first = self.peek_at(start)?;
        if !(first.is_alphanumeric() || first == '_') {
            return None;
        }
        Some(self.run_end(start + 1, is_key_char))
    }

    /// Scans a comparison operator, returning it and its length.
    fn scan_operator(&self, at: usize) -> Option<(Comparison, usize)> {
        let operator = match (self.peek_at(at)?, self.peek_at(at + 1)) {
            ('>', Some('=')) => return Some((Comparison::Gte, 2)),
            ('<', Some('=')) => return Some((Comparison::Lte, 2)),
            (':', _) => Comparison::Colon,
            ('=', _) => Comparison::Eq,
            ('>', _) => Comparison::Gt,
            ('<', _) => Comparison::Lt,
            _ => return None,
        };
        Some((operator, 1))
    }

    /// Returns the offset of the first character at or after `from` failing `accept`.
    fn run_end(&self, from: usize, accept: impl Fn(char) -> bool) -> usize {
        let mut end = from;
        while self.peek_at(end).is_some_and(&accept) {
            end += 1;
        }
        end
    }

    /// Returns the character at `index`.
    fn peek_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Collects the characters in `from..to`.
    fn text(&self, from: usize, to: usize) -> String {
        self.chars[from..to].iter().collect()
    }
}

/// Characters allowed in a field name after the first.
fn is_key_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-')
}

/// Characters allowed inside a bare word.
fn is_word_char(ch: char) -> bool {
    !ch.is_whitespace()
        && !matches!(
            ch,
            '(' | ')' | '"' | '~' | '&' | '|' | '^' | '{' | '}' | '[' | ']' | ';' | '\\' | '`'
                | '<' | '>'
        )
}

/// Builds a numeric comparison token.
fn numeric(key: &str, operator: Comparison, value: f64, position: usize) -> Token {
    Token::new(
        TokenKind::KeywordNumeric {
            key: key.to_string(),
            operator,
            value,
        },
        position,
    )
}

/// Builds a date comparison token.
fn date(key: &str, operator: Comparison, value: DateTime<Utc>, position: usize) -> Token {
    Token::new(
        TokenKind::KeywordDate {
            key: key.to_string(),
            operator,
            value,
        },
        position,
    )
}

/// Builds `( key >= start key <= end )`, keeping both bounds in one group.
fn date_group(key: &str, start: DateTime<Utc>, end: DateTime<Utc>, position: usize) -> Vec<Token> {
    vec![
        Token::new(TokenKind::OpenParen { negated: false }, position),
        date(key, Comparison::Gte, start, position),
        date(key, Comparison::Lte, end, position),
        Token::new(TokenKind::CloseParen, position),
    ]
}

/// Expands a date comparison according to the literal's granularity.
///
/// `<` and `>=` compare against the first instant of the period, `<=` and `>`
/// against the last. Equality on anything coarser than an explicit time
/// becomes an inclusive range.
fn date_comparison(key: &str, operator: Comparison, period: &Period, position: usize) -> Vec<Token> {
    match operator {
        Comparison::Lt | Comparison::Gte => vec![date(key, operator, period.start, position)],
        Comparison::Lte | Comparison::Gt => vec![date(key, operator, period.end, position)],
        Comparison::Colon | Comparison::Eq if period.has_time => {
            vec![date(key, operator, period.start, position)]
        }
        Comparison::Colon | Comparison::Eq => date_group(key, period.start, period.end, position),
    }
}

/// Tokenizes a normalized query.
///
/// Positions in the returned tokens and errors are character offsets into
/// `input`. Malformed input never aborts the scan; it shows up in
/// [`TokenStream::errors`].
pub fn tokenize(input: &str, config: &ParserConfig) -> TokenStream {
    Lexer::new(input, config).tokenize()
}
