//! EJSON/JSONEE tokenizer.
//!
//! This is structured as recursive-descent over [`CharReader`] rather than
//! a literal state-id dispatch loop: each named production (`DATA`,
//! `CONTROL`, `LEFT_BRACE`, `UNQUOTED`, `BYTE_SEQUENCE`, …) becomes a parse
//! function instead of a `match` arm reached through a `state` field. The
//! external contract is unchanged — `reconsume()` push-back, the same
//! error taxonomy and `{line, column, character}` payload, the same depth
//! limit checked before every container push — so this is a simplification
//! of the state machine's *shape*, not of what it accepts or rejects.
//!
//! CJSONEE support covers the common case (`{{ clause (&&|\|\|;) clause
//! ... }}`); deeply nested CJSONEE-inside-CJSONEE chaining is accepted
//! structurally but not specially re-optimized.

use crate::error::{Result, TokenizerError};
use crate::reader::CharReader;
use crate::sbst;
use crate::vcm::{CjsoneeJoiner, VcmKind, VcmNode};
use purc_core::{Atom, AtomTable, PurcErrorKind, Variant};

/// Tokenizer configuration.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    pub max_depth: usize,
    pub line_cache_capacity: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            line_cache_capacity: 3,
        }
    }
}

pub struct Tokenizer {
    config: TokenizerConfig,
    depth: usize,
    corrupt: bool,
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\t' | '\x0c' | '\u{feff}')
}

fn is_separator(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | '<' | '>' | '(' | ')' | ',' | ':')
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self {
            config,
            depth: 0,
            corrupt: false,
        }
    }

    /// `reset(parser, depth, flags)`: clear the corrupt flag and depth
    /// counter so the tokenizer can be reused.
    pub fn reset(&mut self) {
        self.depth = 0;
        self.corrupt = false;
    }

    /// Tokenize a complete EJSON/JSONEE expression from `input`, returning
    /// its VCM tree. The tokenizer is single-shot per call: on error it is
    /// left corrupt and [`Tokenizer::reset`] must be called before reuse
    ///.
    pub fn tokenize(&mut self, input: &str, atoms: &mut AtomTable) -> Result<VcmNode> {
        if self.corrupt {
            return Err(TokenizerError::new(
                PurcErrorKind::InvalidOperand,
                0,
                0,
                None,
                "tokenizer must be reset() before reuse after an error",
            ));
        }
        let mut reader = CharReader::from_str(input).with_line_cache(self.config.line_cache_capacity);
        let result = self.parse_top(&mut reader, atoms);
        if result.is_err() {
            self.corrupt = true;
        }
        result
    }

    fn enter_container(&mut self, reader: &CharReader) -> Result<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            let (line, column) = reader.position();
            return Err(TokenizerError::new(
                PurcErrorKind::MaxDepthExceeded,
                line,
                column,
                None,
                format!("nesting exceeds max depth {}", self.config.max_depth),
            ));
        }
        Ok(())
    }

    fn leave_container(&mut self) {
        self.depth -= 1;
    }

    fn skip_whitespace(&self, reader: &mut CharReader) {
        loop {
            match reader.next_char() {
                Some(c) if is_whitespace(c.codepoint) => continue,
                Some(c) => {
                    reader.reconsume();
                    let _ = c;
                    break;
                }
                None => break,
            }
        }
    }

    fn peek(&self, reader: &mut CharReader) -> Option<char> {
        let c = reader.next_char()?;
        reader.reconsume();
        Some(c.codepoint)
    }

    fn expect(&self, reader: &mut CharReader, expected: char) -> Result<()> {
        match reader.next_char() {
            Some(c) if c.codepoint == expected => Ok(()),
            Some(c) => Err(TokenizerError::new(
                PurcErrorKind::UnexpectedCharacter,
                c.line,
                c.column,
                Some(c.codepoint),
                format!("expected '{expected}'"),
            )),
            None => Err(TokenizerError::new(
                PurcErrorKind::UnexpectedEof,
                0,
                0,
                None,
                format!("expected '{expected}', found end of input"),
            )),
        }
    }

    /// `DATA`/`CONTROL`/finish detection: skip leading whitespace, parse
    /// one top-level expression, and require the stream to be exhausted
    ///.
    fn parse_top(&mut self, reader: &mut CharReader, atoms: &mut AtomTable) -> Result<VcmNode> {
        self.skip_whitespace(reader);
        let node = self.parse_expr(reader, atoms)?;
        self.skip_whitespace(reader);
        if let Some(c) = reader.next_char() {
            return Err(TokenizerError::new(
                PurcErrorKind::UnexpectedCharacter,
                c.line,
                c.column,
                Some(c.codepoint),
                "trailing input after a complete expression",
            ));
        }
        Ok(node)
    }

    /// A primary expression followed by any number of postfix
    /// `[elem]`/`.name`/`(args)`/`(!args)` applications.
    fn parse_expr(&mut self, reader: &mut CharReader, atoms: &mut AtomTable) -> Result<VcmNode> {
        let mut node = self.parse_primary(reader, atoms)?;
        loop {
            self.skip_whitespace(reader);
            match self.peek(reader) {
                Some('[') => {
                    reader.next_char();
                    self.enter_container(reader)?;
                    self.skip_whitespace(reader);
                    let elem = self.parse_expr(reader, atoms)?;
                    self.skip_whitespace(reader);
                    self.expect(reader, ']')?;
                    self.leave_container();
                    node = VcmNode::closed(VcmKind::GetElement(Box::new(node), Box::new(elem)));
                }
                Some('.') => {
                    reader.next_char();
                    let name = self.parse_bare_name(reader)?;
                    node = VcmNode::closed(VcmKind::GetElement(
                        Box::new(node),
                        Box::new(VcmNode::literal(Variant::make_string(name))),
                    ));
                }
                Some('(') => {
                    reader.next_char();
                    self.enter_container(reader)?;
                    self.skip_whitespace(reader);
                    let is_setter = self.peek(reader) == Some('!');
                    if is_setter {
                        reader.next_char();
                    }
                    let args = self.parse_arg_list(reader, atoms)?;
                    self.expect(reader, ')')?;
                    self.leave_container();
                    node = if is_setter {
                        VcmNode::closed(VcmKind::CallSetter(Box::new(node), args))
                    } else {
                        VcmNode::closed(VcmKind::CallGetter(Box::new(node), args))
                    };
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_arg_list(&mut self, reader: &mut CharReader, atoms: &mut AtomTable) -> Result<Vec<VcmNode>> {
        let mut args = Vec::new();
        self.skip_whitespace(reader);
        if self.peek(reader) == Some(')') {
            return Ok(args);
        }
        let mut expect_more = true;
        while expect_more {
            self.skip_whitespace(reader);
            args.push(self.parse_expr(reader, atoms)?);
            self.skip_whitespace(reader);
            match self.peek(reader) {
                Some(',') => {
                    reader.next_char();
                    self.skip_whitespace(reader);
                    if self.peek(reader) == Some(',') {
                        let c = reader.next_char().unwrap();
                        return Err(TokenizerError::new(
                            PurcErrorKind::UnexpectedComma,
                            c.line,
                            c.column,
                            Some(','),
                            "two consecutive commas",
                        ));
                    }
                }
                _ => expect_more = false,
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self, reader: &mut CharReader, atoms: &mut AtomTable) -> Result<VcmNode> {
        self.skip_whitespace(reader);
        let Some(first) = reader.next_char() else {
            return Err(TokenizerError::new(PurcErrorKind::UnexpectedEof, 0, 0, None, "expected an expression"));
        };
        match first.codepoint {
            '{' => self.parse_brace(reader, atoms),
            '[' => self.parse_array(reader, atoms),
            '"' => self.parse_quoted_string(reader, atoms, '"'),
            '\'' => self.parse_quoted_string(reader, atoms, '\''),
            '$' => self.parse_variable(reader, atoms),
            'b' if matches!(self.peek(reader), Some('x') | Some('b')) || self.looks_like_b64(reader) => {
                self.parse_byte_sequence(reader, first)
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' => {
                reader.reconsume();
                self.parse_number(reader)
            }
            c if c.is_alphabetic() || c == '_' => {
                reader.reconsume();
                self.parse_unquoted(reader)
            }
            c => Err(TokenizerError::new(
                PurcErrorKind::UnexpectedCharacter,
                first.line,
                first.column,
                Some(c),
                "unexpected character starting an expression",
            )),
        }
    }

    fn looks_like_b64(&self, reader: &mut CharReader) -> bool {
        matches!(self.peek(reader), Some('6'))
    }

    /// `{` opens either a CJSONEE (`{{ ... }}`) or an object literal
    ///.
    fn parse_brace(&mut self, reader: &mut CharReader, atoms: &mut AtomTable) -> Result<VcmNode> {
        self.enter_container(reader)?;
        self.skip_whitespace(reader);
        if self.peek(reader) == Some('{') {
            reader.next_char();
            let node = self.parse_cjsonee(reader, atoms)?;
            self.leave_container();
            return Ok(node);
        }
        let node = self.parse_object_body(reader, atoms)?;
        self.leave_container();
        Ok(node)
    }

    fn parse_object_body(&mut self, reader: &mut CharReader, atoms: &mut AtomTable) -> Result<VcmNode> {
        let mut entries = Vec::new();
        self.skip_whitespace(reader);
        if self.peek(reader) == Some('}') {
            reader.next_char();
            return Ok(VcmNode::closed(VcmKind::ObjectLiteral(entries)));
        }
        loop {
            self.skip_whitespace(reader);
            let key = self.parse_object_key(reader, atoms)?;
            self.skip_whitespace(reader);
            self.expect(reader, ':')?;
            self.skip_whitespace(reader);
            let value = self.parse_expr(reader, atoms)?;
            entries.push((key, value));
            self.skip_whitespace(reader);
            match reader.next_char() {
                Some(c) if c.codepoint == ',' => continue,
                Some(c) if c.codepoint == '}' => break,
                Some(c) => {
                    return Err(TokenizerError::new(
                        PurcErrorKind::UnexpectedCharacter,
                        c.line,
                        c.column,
                        Some(c.codepoint),
                        "expected ',' or '}' in object literal",
                    ));
                }
                None => return Err(TokenizerError::new(PurcErrorKind::UnexpectedEof, 0, 0, None, "unterminated object literal")),
            }
        }
        Ok(VcmNode::closed(VcmKind::ObjectLiteral(entries)))
    }

    fn parse_object_key(&mut self, reader: &mut CharReader, atoms: &mut AtomTable) -> Result<VcmNode> {
        match self.peek(reader) {
            Some('"') => {
                reader.next_char();
                self.parse_quoted_string(reader, atoms, '"')
            }
            Some('\'') => {
                reader.next_char();
                self.parse_quoted_string(reader, atoms, '\'')
            }
            _ => {
                let name = self.parse_bare_name(reader)?;
                Ok(VcmNode::literal(Variant::make_string(name)))
            }
        }
    }

    fn parse_array(&mut self, reader: &mut CharReader, atoms: &mut AtomTable) -> Result<VcmNode> {
        self.enter_container(reader)?;
        let mut items = Vec::new();
        self.skip_whitespace(reader);
        if self.peek(reader) == Some(']') {
            reader.next_char();
            self.leave_container();
            return Ok(VcmNode::closed(VcmKind::ArrayLiteral(items)));
        }
        loop {
            self.skip_whitespace(reader);
            items.push(self.parse_expr(reader, atoms)?);
            self.skip_whitespace(reader);
            match reader.next_char() {
                Some(c) if c.codepoint == ',' => {
                    self.skip_whitespace(reader);
                    if self.peek(reader) == Some(',') {
                        let c2 = reader.next_char().unwrap();
                        return Err(TokenizerError::new(
                            PurcErrorKind::UnexpectedComma,
                            c2.line,
                            c2.column,
                            Some(','),
                            "two consecutive commas",
                        ));
                    }
                    continue;
                }
                Some(c) if c.codepoint == ']' => break,
                Some(c) => {
                    return Err(TokenizerError::new(
                        PurcErrorKind::UnexpectedRightBracket,
                        c.line,
                        c.column,
                        Some(c.codepoint),
                        "expected ',' or ']' in array literal",
                    ));
                }
                None => return Err(TokenizerError::new(PurcErrorKind::UnexpectedEof, 0, 0, None, "unterminated array literal")),
            }
        }
        self.leave_container();
        Ok(VcmNode::closed(VcmKind::ArrayLiteral(items)))
    }

    /// `{{ clause (&&|\|\|;) clause ... }}`.
    fn parse_cjsonee(&mut self, reader: &mut CharReader, atoms: &mut AtomTable) -> Result<VcmNode> {
        let mut clauses = Vec::new();
        let mut joiners = Vec::new();
        loop {
            self.skip_whitespace(reader);
            clauses.push(self.parse_expr(reader, atoms)?);
            self.skip_whitespace(reader);
            // Look ahead for a joiner (&&, ||, ;) or the closing `}}`.
            match reader.next_char() {
                Some(c) if c.codepoint == '&' && self.peek(reader) == Some('&') => {
                    reader.next_char();
                    joiners.push(CjsoneeJoiner::And);
                }
                Some(c) if c.codepoint == '|' && self.peek(reader) == Some('|') => {
                    reader.next_char();
                    joiners.push(CjsoneeJoiner::Or);
                }
                Some(c) if c.codepoint == ';' => {
                    joiners.push(CjsoneeJoiner::Sequence);
                }
                Some(c) if c.codepoint == '}' => {
                    self.expect(reader, '}')?;
                    break;
                }
                Some(c) => {
                    return Err(TokenizerError::new(
                        PurcErrorKind::UnexpectedCharacter,
                        c.line,
                        c.column,
                        Some(c.codepoint),
                        "expected '&&', '||', ';' or '}}' in a chained expression",
                    ));
                }
                None => return Err(TokenizerError::new(PurcErrorKind::UnexpectedEof, 0, 0, None, "unterminated chained expression")),
            }
        }
        Ok(VcmNode::closed(VcmKind::Cjsonee { clauses, joiners }))
    }

    fn parse_bare_name(&mut self, reader: &mut CharReader) -> Result<String> {
        let mut name = String::new();
        loop {
            match reader.next_char() {
                Some(c) if c.codepoint.is_alphanumeric() || c.codepoint == '_' || c.codepoint == '-' => {
                    name.push(c.codepoint);
                }
                Some(c) => {
                    reader.reconsume();
                    let _ = c;
                    break;
                }
                None => break,
            }
        }
        if name.is_empty() {
            let (line, column) = reader.position();
            return Err(TokenizerError::new(PurcErrorKind::UnexpectedCharacter, line, column, None, "expected a name"));
        }
        Ok(name)
    }

    /// `$` begins a variable reference; `$$...` nests getters; `${...}`
    /// introduces a quoted variable name.
    fn parse_variable(&mut self, reader: &mut CharReader, atoms: &mut AtomTable) -> Result<VcmNode> {
        if self.peek(reader) == Some('$') {
            reader.next_char();
            let inner = self.parse_variable(reader, atoms)?;
            return Ok(VcmNode::closed(VcmKind::GetVariable(Box::new(inner))));
        }
        if self.peek(reader) == Some('{') {
            reader.next_char();
            self.enter_container(reader)?;
            self.skip_whitespace(reader);
            // A quoted variable name is either a bare identifier (`${name}`)
            // or, when it starts with `$`, a nested dynamic expression whose
            // result supplies the name (`${$FOO(1)}`).
            let expr = if self.peek(reader) == Some('$') {
                self.parse_expr(reader, atoms)?
            } else {
                let name = self.parse_bare_name(reader)?;
                let _: Atom = atoms.intern(&name);
                VcmNode::literal(Variant::make_string(name))
            };
            self.skip_whitespace(reader);
            self.expect(reader, '}')?;
            self.leave_container();
            return Ok(VcmNode::closed(VcmKind::GetVariable(Box::new(expr))));
        }
        let name = self.parse_bare_name(reader)?;
        let _: Atom = atoms.intern(&name);
        Ok(VcmNode::closed(VcmKind::GetVariable(Box::new(VcmNode::literal(
            Variant::make_string(name),
        )))))
    }

    /// `UNQUOTED`: keyword via SBST, else a number with optional suffix.
    fn parse_unquoted(&mut self, reader: &mut CharReader) -> Result<VcmNode> {
        let mut word = String::new();
        loop {
            match reader.next_char() {
                Some(c) if c.codepoint.is_alphanumeric() => word.push(c.codepoint),
                Some(c) => {
                    reader.reconsume();
                    let _ = c;
                    break;
                }
                None => break,
            }
        }
        if let Some((value, consumed)) = sbst::longest_match(sbst::EJSON_KEYWORDS, &word) {
            if consumed == word.chars().count() {
                return Ok(VcmNode::literal(keyword_variant(value)));
            }
        }
        let (line, column) = reader.position();
        Err(TokenizerError::new(
            PurcErrorKind::UnexpectedCharacter,
            line,
            column,
            word.chars().next(),
            format!("'{word}' is not a recognized keyword"),
        ))
    }

    /// Number literal with an optional `L`/`UL`/`FL` type suffix.
    fn parse_number(&mut self, reader: &mut CharReader) -> Result<VcmNode> {
        let (start_line, start_column) = reader.position();
        let mut text = String::new();
        let mut is_float = false;

        if matches!(self.peek(reader), Some('-') | Some('+')) {
            text.push(reader.next_char().unwrap().codepoint);
        }
        while matches!(self.peek(reader), Some(c) if c.is_ascii_digit()) {
            text.push(reader.next_char().unwrap().codepoint);
        }
        if self.peek(reader) == Some('.') {
            is_float = true;
            text.push(reader.next_char().unwrap().codepoint);
            while matches!(self.peek(reader), Some(c) if c.is_ascii_digit()) {
                text.push(reader.next_char().unwrap().codepoint);
            }
        }
        if matches!(self.peek(reader), Some('e') | Some('E')) {
            is_float = true;
            text.push(reader.next_char().unwrap().codepoint);
            if matches!(self.peek(reader), Some('-') | Some('+')) {
                text.push(reader.next_char().unwrap().codepoint);
            }
            while matches!(self.peek(reader), Some(c) if c.is_ascii_digit()) {
                text.push(reader.next_char().unwrap().codepoint);
            }
        }

        if text.is_empty() || text == "-" || text == "+" {
            return Err(TokenizerError::new(
                PurcErrorKind::UnexpectedCharacter,
                start_line,
                start_column,
                None,
                "expected a number",
            ));
        }

        let suffix = self.parse_number_suffix(reader);
        match suffix.as_deref() {
            Some("L") => {
                let n: i64 = text.parse().map_err(|_| {
                    TokenizerError::new(PurcErrorKind::BadEncoding, start_line, start_column, None, "invalid long-int literal")
                })?;
                Ok(VcmNode::literal(Variant::make_longint(n)))
            }
            Some("UL") => {
                let n: u64 = text.parse().map_err(|_| {
                    TokenizerError::new(PurcErrorKind::BadEncoding, start_line, start_column, None, "invalid unsigned-long literal")
                })?;
                Ok(VcmNode::literal(Variant::make_ulongint(n)))
            }
            Some("FL") => {
                let n: f64 = text.parse().map_err(|_| {
                    TokenizerError::new(PurcErrorKind::BadEncoding, start_line, start_column, None, "invalid long-double literal")
                })?;
                Ok(VcmNode::literal(Variant::make_longdouble(n)))
            }
            _ => {
                let n: f64 = text.parse().map_err(|_| {
                    TokenizerError::new(PurcErrorKind::BadEncoding, start_line, start_column, None, "invalid number literal")
                })?;
                let _ = is_float;
                Ok(VcmNode::literal(Variant::make_number(n)))
            }
        }
    }

    fn parse_number_suffix(&mut self, reader: &mut CharReader) -> Option<String> {
        match self.peek(reader) {
            Some('L') => {
                reader.next_char();
                Some("L".to_string())
            }
            Some('U') => {
                reader.next_char();
                if self.peek(reader) == Some('L') {
                    reader.next_char();
                    Some("UL".to_string())
                } else {
                    reader.reconsume();
                    None
                }
            }
            Some('F') => {
                reader.next_char();
                if self.peek(reader) == Some('L') {
                    reader.next_char();
                    Some("FL".to_string())
                } else {
                    reader.reconsume();
                    None
                }
            }
            _ => None,
        }
    }

    /// `b`, `bx…`, `bb…`, `b64…` byte-sequence literals: the suffix selects the hex/binary/base64 decoder.
    fn parse_byte_sequence(&mut self, reader: &mut CharReader, first: crate::reader::CharRecord) -> Result<VcmNode> {
        let (line, column) = (first.line, first.column);
        let bad = |msg: &str| TokenizerError::new(PurcErrorKind::BadEncoding, line, column, None, msg.to_string());

        match reader.next_char().map(|c| c.codepoint) {
            Some('x') => {
                let digits = self.collect_charset(reader, |c| c.is_ascii_hexdigit() || c == '.');
                let cleaned: String = digits.chars().filter(|c| *c != '.').collect();
                let bytes = hex::decode(&cleaned).map_err(|_| bad("invalid hex byte-sequence"))?;
                Ok(VcmNode::literal(Variant::make_bytes(bytes)))
            }
            Some('b') => {
                let digits = self.collect_charset(reader, |c| c == '0' || c == '1' || c == '.');
                let cleaned: String = digits.chars().filter(|c| *c != '.').collect();
                if cleaned.len() % 8 != 0 {
                    return Err(bad("binary byte-sequence length must be a multiple of 8 bits"));
                }
                let mut bytes = Vec::with_capacity(cleaned.len() / 8);
                for chunk in cleaned.as_bytes().chunks(8) {
                    let byte_str = std::str::from_utf8(chunk).unwrap();
                    bytes.push(u8::from_str_radix(byte_str, 2).map_err(|_| bad("invalid binary byte-sequence"))?);
                }
                Ok(VcmNode::literal(Variant::make_bytes(bytes)))
            }
            Some('6') => {
                self.expect(reader, '4')?;
                let digits = self.collect_charset(reader, |c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=');
                use base64::Engine;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(digits.as_bytes())
                    .map_err(|_| bad("invalid base64 byte-sequence"))?;
                Ok(VcmNode::literal(Variant::make_bytes(bytes)))
            }
            _ => {
                reader.reconsume();
                Ok(VcmNode::literal(Variant::make_bytes(Vec::new())))
            }
        }
    }

    fn collect_charset(&self, reader: &mut CharReader, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        loop {
            match reader.next_char() {
                Some(c) if pred(c.codepoint) => out.push(c.codepoint),
                Some(c) => {
                    reader.reconsume();
                    let _ = c;
                    break;
                }
                None => break,
            }
        }
        out
    }

    /// `SINGLE_QUOTED`/`DOUBLE_QUOTED`: string literals; `$` inside a
    /// double-quoted string is the same variable-reference introducer as
    /// top-level `$` (delegates to [`Self::parse_variable`]), producing a
    /// `ConcatString` node when at least one substitution is present.
    fn parse_quoted_string(&mut self, reader: &mut CharReader, atoms: &mut AtomTable, quote: char) -> Result<VcmNode> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        loop {
            match reader.next_char() {
                None => return Err(TokenizerError::new(PurcErrorKind::UnexpectedEof, 0, 0, None, "unterminated string literal")),
                Some(c) if c.codepoint == quote => break,
                Some(c) if c.codepoint == '\\' => {
                    literal.push(self.parse_escape(reader)?);
                }
                Some(c) if quote == '"' && c.codepoint == '$' => {
                    if !literal.is_empty() {
                        pieces.push(VcmNode::literal(Variant::make_string(std::mem::take(&mut literal))));
                    }
                    pieces.push(self.parse_variable(reader, atoms)?);
                }
                Some(c) => literal.push(c.codepoint),
            }
        }
        if pieces.is_empty() {
            return Ok(VcmNode::literal(Variant::make_string(literal)));
        }
        if !literal.is_empty() {
            pieces.push(VcmNode::literal(Variant::make_string(literal)));
        }
        Ok(VcmNode::closed(VcmKind::ConcatString(pieces)))
    }

    fn parse_escape(&mut self, reader: &mut CharReader) -> Result<char> {
        let Some(c) = reader.next_char() else {
            return Err(TokenizerError::new(PurcErrorKind::UnexpectedEof, 0, 0, None, "unterminated escape sequence"));
        };
        match c.codepoint {
            '"' => Ok('"'),
            '\'' => Ok('\''),
            '\\' => Ok('\\'),
            '/' => Ok('/'),
            'b' => Ok('\u{0008}'),
            'f' => Ok('\u{000c}'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'x' => self.parse_hex_escape(reader, 2),
            'u' => {
                if self.peek(reader) == Some('{') {
                    reader.next_char();
                    let mut digits = String::new();
                    loop {
                        match reader.next_char() {
                            Some(c) if c.codepoint == '}' => break,
                            Some(c) => digits.push(c.codepoint),
                            None => return Err(TokenizerError::new(PurcErrorKind::UnexpectedEof, 0, 0, None, "unterminated \\u{...} escape")),
                        }
                    }
                    let cp = u32::from_str_radix(&digits, 16)
                        .ok()
                        .and_then(char::from_u32)
                        .ok_or_else(|| TokenizerError::new(PurcErrorKind::BadEncoding, c.line, c.column, None, "invalid \\u{...} escape"))?;
                    Ok(cp)
                } else {
                    self.parse_hex_escape(reader, 4)
                }
            }
            other => Err(TokenizerError::new(
                PurcErrorKind::BadEncoding,
                c.line,
                c.column,
                Some(other),
                "unrecognized escape sequence",
            )),
        }
    }

    fn parse_hex_escape(&mut self, reader: &mut CharReader, n: usize) -> Result<char> {
        let mut digits = String::new();
        for _ in 0..n {
            match reader.next_char() {
                Some(c) if c.codepoint.is_ascii_hexdigit() => digits.push(c.codepoint),
                Some(c) => return Err(TokenizerError::new(PurcErrorKind::BadEncoding, c.line, c.column, Some(c.codepoint), "invalid hex escape digit")),
                None => return Err(TokenizerError::new(PurcErrorKind::UnexpectedEof, 0, 0, None, "unterminated hex escape")),
            }
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| TokenizerError::new(PurcErrorKind::BadEncoding, 0, 0, None, "invalid hex escape"))
    }
}

fn keyword_variant(keyword: &str) -> Variant {
    match keyword {
        "true" => Variant::make_boolean(true),
        "false" => Variant::make_boolean(false),
        "null" => Variant::make_null(),
        "undefined" => Variant::make_undefined(),
        "NaN" => Variant::make_number(f64::NAN),
        "Infinity" => Variant::make_number(f64::INFINITY),
        _ => unreachable!("EJSON_KEYWORDS is exhaustive over its own values"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(src: &str) -> Result<VcmNode> {
        let mut tk = Tokenizer::new(TokenizerConfig::default());
        let mut atoms = AtomTable::new();
        tk.tokenize(src, &mut atoms)
    }

    #[test]
    fn parses_scalars() {
        assert_eq!(tokenize("true").unwrap().kind, VcmKind::Literal(Variant::make_boolean(true)));
        assert_eq!(tokenize("null").unwrap().kind, VcmKind::Literal(Variant::make_null()));
        assert_eq!(tokenize("42").unwrap().kind, VcmKind::Literal(Variant::make_number(42.0)));
        assert_eq!(tokenize("42L").unwrap().kind, VcmKind::Literal(Variant::make_longint(42)));
        assert_eq!(tokenize("42UL").unwrap().kind, VcmKind::Literal(Variant::make_ulongint(42)));
    }

    #[test]
    fn parses_object_and_array_literals() {
        let node = tokenize(r#"{"a": 1, "b": [1, 2, 3]}"#).unwrap();
        match node.kind {
            VcmKind::ObjectLiteral(entries) => assert_eq!(entries.len(), 2),
            other => panic!("expected object literal, got {other:?}"),
        }
    }

    #[test]
    fn rejects_consecutive_commas() {
        let err = tokenize("[1,,2]").unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::UnexpectedComma);
    }

    #[test]
    fn parses_byte_sequence_hex() {
        let node = tokenize("bxdead").unwrap();
        assert_eq!(node.kind, VcmKind::Literal(Variant::make_bytes([0xde, 0xad])));
    }

    #[test]
    fn parses_variable_getter_and_call() {
        let node = tokenize("$FOO(1, 2)").unwrap();
        assert!(matches!(node.kind, VcmKind::CallGetter(_, _)));
    }

    #[test]
    fn parses_string_interpolation() {
        let node = tokenize(r#""hello ${$name}""#).unwrap();
        match node.kind {
            VcmKind::ConcatString(pieces) => assert_eq!(pieces.len(), 2),
            other => panic!("expected ConcatString, got {other:?}"),
        }
    }

    #[test]
    fn bare_name_substitution_yields_a_get_variable_piece() {
        let node = tokenize(r#""hello ${name}!""#).unwrap();
        match node.kind {
            VcmKind::ConcatString(pieces) => {
                assert_eq!(pieces.len(), 3);
                assert!(matches!(&pieces[0].kind, VcmKind::Literal(Variant::String(s)) if &**s == "hello "));
                match &pieces[1].kind {
                    VcmKind::GetVariable(inner) => {
                        assert!(matches!(&inner.kind, VcmKind::Literal(Variant::String(s)) if &**s == "name"));
                    }
                    other => panic!("expected GetVariable, got {other:?}"),
                }
                assert!(matches!(&pieces[2].kind, VcmKind::Literal(Variant::String(s)) if &**s == "!"));
            }
            other => panic!("expected ConcatString, got {other:?}"),
        }
    }

    #[test]
    fn max_depth_is_enforced() {
        let mut config = TokenizerConfig::default();
        config.max_depth = 2;
        let mut tk = Tokenizer::new(config);
        let mut atoms = AtomTable::new();
        let err = tk.tokenize("[[[1]]]", &mut atoms).unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::MaxDepthExceeded);
    }

    #[test]
    fn reuse_without_reset_after_error_is_rejected() {
        let mut tk = Tokenizer::new(TokenizerConfig::default());
        let mut atoms = AtomTable::new();
        assert!(tk.tokenize("[1,,2]", &mut atoms).is_err());
        let err = tk.tokenize("1", &mut atoms).unwrap_err();
        assert_eq!(err.kind, PurcErrorKind::InvalidOperand);
        tk.reset();
        assert!(tk.tokenize("1", &mut atoms).is_ok());
    }

    #[test]
    fn parses_cjsonee_chain() {
        let node = tokenize("{{ true && false }}").unwrap();
        match node.kind {
            VcmKind::Cjsonee { clauses, joiners } => {
                assert_eq!(clauses.len(), 2);
                assert_eq!(joiners, vec![CjsoneeJoiner::And]);
            }
            other => panic!("expected Cjsonee, got {other:?}"),
        }
    }
}
