//! Phase 2: Parser
//!
//! The parser consumes the scanner's token stream and builds the value
//! tree. Block structure is reconstructed from token columns: a block
//! mapping pins the column of its first key and a block sequence the column
//! of its first `-`; anything to the left of that column closes the
//! construct and is handed back for the enclosing one. Flow collections are
//! bracket-delimited and ignore columns entirely.
//!
//! Anchors store a finished copy of their value; aliases clone it again, so
//! the produced tree never shares substructure. Tags ride in a single
//! pending slot and are consumed by the next scalar's schema resolution.

use std::collections::HashMap;
use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::scanner::{Mark, ScalarStyle, Scanner, Token, TokenKind};
use crate::schema;
use crate::value::{Mapping, Value};

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    lookahead: VecDeque<Token>,
    anchors: HashMap<String, Value>,
    pending_tag: Option<(String, Mark)>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            scanner: Scanner::new(input),
            lookahead: VecDeque::new(),
            anchors: HashMap::new(),
            pending_tag: None,
        }
    }

    /// Parse one document: an optional `---`, a value, an optional `...`.
    /// An empty stream is a null document.
    pub fn parse_document(&mut self) -> Result<Value> {
        if self.peek()?.kind == TokenKind::StreamStart {
            self.bump()?;
        }
        if self.peek()?.kind == TokenKind::DocumentStart {
            self.bump()?;
        }
        let value = self.parse_node(false)?;
        if self.peek()?.kind == TokenKind::DocumentEnd {
            self.bump()?;
        }
        Ok(value)
    }

    fn peek(&mut self) -> Result<&Token> {
        if self.lookahead.is_empty() {
            let token = self
                .scanner
                .next_token()
                .ok_or_else(|| Error::UnexpectedEndOfStream(String::new()))?;
            self.lookahead.push_back(token);
        }
        Ok(&self.lookahead[0])
    }

    fn bump(&mut self) -> Result<Token> {
        self.peek()?;
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => Err(Error::UnexpectedEndOfStream(String::new())),
        }
    }

    fn give_back(&mut self, token: Token) {
        self.lookahead.push_front(token);
    }

    /// Peek inside a flow collection, where running out of tokens means the
    /// closing bracket never came.
    fn peek_flow(&mut self, open: Mark) -> Result<&Token> {
        if self.peek()?.kind == TokenKind::StreamEnd {
            return Err(Error::UnexpectedEndOfStream(open.suffix()));
        }
        self.peek()
    }

    /// Parse a single value starting at the next token.
    fn parse_node(&mut self, in_flow: bool) -> Result<Value> {
        let token = self.bump()?;
        match token.kind {
            TokenKind::Scalar { value, style } => {
                if !in_flow {
                    let starts_mapping = {
                        let next = self.peek()?;
                        next.kind == TokenKind::Value && next.mark.line == token.mark.line
                    };
                    if starts_mapping {
                        return self.parse_block_mapping(value, token.mark);
                    }
                }
                self.resolve_scalar(value, style)
            }
            TokenKind::Alias(name) => self.resolve_alias(&name, token.mark),
            TokenKind::Anchor(name) => {
                let value = self.parse_node(in_flow)?;
                self.anchors.insert(name, value.clone());
                Ok(value)
            }
            TokenKind::Tag(tag) => {
                self.pending_tag = Some((tag, token.mark));
                let value = self.parse_node(in_flow)?;
                self.apply_pending_tag(value)
            }
            TokenKind::BlockEntry if !in_flow => self.parse_block_sequence(token.mark),
            TokenKind::FlowSequenceStart => self.parse_flow_sequence(token.mark),
            TokenKind::FlowMappingStart => self.parse_flow_mapping(token.mark),
            TokenKind::Key if !in_flow => self.parse_explicit_mapping(token.mark),
            TokenKind::StreamEnd => {
                self.give_back(token);
                Ok(Value::Null)
            }
            TokenKind::DocumentStart | TokenKind::DocumentEnd if !in_flow => {
                self.give_back(token);
                Ok(Value::Null)
            }
            TokenKind::FlowSequenceEnd | TokenKind::FlowMappingEnd | TokenKind::FlowEntry
                if in_flow =>
            {
                self.give_back(token);
                Ok(Value::Null)
            }
            kind => Err(Error::UnexpectedToken(
                kind.describe().to_string(),
                token.mark.suffix(),
            )),
        }
    }

    /// Resolve a scalar token, consuming any pending tag. Only plain
    /// scalars go through implicit classification; quoted and block styles
    /// are strings unless explicitly tagged.
    fn resolve_scalar(&mut self, lexeme: String, style: ScalarStyle) -> Result<Value> {
        let tag = self.pending_tag.take();
        match style {
            ScalarStyle::Plain => {
                schema::resolve(&lexeme, tag.as_ref().map(|(tag, _)| tag.as_str()))
            }
            _ => match tag {
                Some((tag, _)) => schema::apply_tag(&lexeme, &tag),
                None => Ok(Value::String(lexeme)),
            },
        }
    }

    fn resolve_alias(&mut self, name: &str, mark: Mark) -> Result<Value> {
        if let Some((tag, tag_mark)) = self.pending_tag.take() {
            return Err(Error::InvalidTag(tag, tag_mark.suffix()));
        }
        match self.anchors.get(name) {
            Some(value) => Ok(value.clone()),
            None => Err(Error::UnknownAlias(name.to_string(), mark.suffix())),
        }
    }

    /// Settle a tag that was not consumed by scalar resolution. `!!seq` on
    /// a sequence and `!!map` on a mapping are no-ops; a tag left over on
    /// an empty value applies to the empty lexeme; anything else is an
    /// error rather than a silent drop.
    fn apply_pending_tag(&mut self, value: Value) -> Result<Value> {
        let (tag, mark) = match self.pending_tag.take() {
            None => return Ok(value),
            Some(pending) => pending,
        };
        match &value {
            Value::Sequence(_) if tag == "!!seq" => Ok(value),
            Value::Mapping(_) if tag == "!!map" => Ok(value),
            Value::Null => schema::apply_tag("", &tag),
            _ => Err(Error::InvalidTag(tag, mark.suffix())),
        }
    }

    /// Block mapping whose first key (already consumed) sat at `key_mark`.
    /// Further keys are accepted at exactly that column.
    fn parse_block_mapping(&mut self, first_key: String, key_mark: Mark) -> Result<Value> {
        let key_col = key_mark.col;
        let mut map = Mapping::new();
        let mut key = first_key;
        loop {
            let colon = self.bump()?;
            let value = self.parse_nested_value(key_col, colon.mark.line, key_col)?;
            map.insert(key, value);

            let next_may_be_key = {
                let next = self.peek()?;
                matches!(next.kind, TokenKind::Scalar { .. }) && next.mark.col == key_col
            };
            if !next_may_be_key {
                break;
            }
            let key_token = self.bump()?;
            let is_pair = {
                let next = self.peek()?;
                next.kind == TokenKind::Value && next.mark.line == key_token.mark.line
            };
            if !is_pair {
                self.give_back(key_token);
                break;
            }
            key = match key_token.kind {
                TokenKind::Scalar { value, .. } => value,
                _ => break,
            };
        }
        Ok(Value::Mapping(map))
    }

    /// Block sequence whose first `-` (already consumed) sat at
    /// `entry_mark`. Further entries are accepted at exactly that column.
    fn parse_block_sequence(&mut self, entry_mark: Mark) -> Result<Value> {
        let entry_col = entry_mark.col;
        let mut seq = Vec::new();
        let mut entry_line = entry_mark.line;
        loop {
            let item = self.parse_nested_value(entry_col, entry_line, entry_col + 1)?;
            seq.push(item);

            let next_entry = {
                let next = self.peek()?;
                next.kind == TokenKind::BlockEntry && next.mark.col == entry_col
            };
            if !next_entry {
                break;
            }
            let token = self.bump()?;
            entry_line = token.mark.line;
        }
        Ok(Value::Sequence(seq))
    }

    /// The value slot of a block construct: a mapping pair's value or a
    /// sequence entry's item. `owner_line` is the line of the introducing
    /// `:` or `-`; content on that line always belongs to the slot, content
    /// on later lines only if indented past `owner_col`. A `-` is accepted
    /// from `entry_min_col` on, which lets mapping values start a sequence
    /// at the key's own column (YAML's zero-indented sequence). Anything
    /// that fails the column test leaves the slot empty.
    fn parse_nested_value(
        &mut self,
        owner_col: usize,
        owner_line: usize,
        entry_min_col: usize,
    ) -> Result<Value> {
        let (mark, starts_value, is_entry, is_anchor, is_tag) = {
            let next = self.peek()?;
            (
                next.mark,
                matches!(
                    next.kind,
                    TokenKind::Scalar { .. }
                        | TokenKind::FlowSequenceStart
                        | TokenKind::FlowMappingStart
                        | TokenKind::Alias(_)
                        | TokenKind::Key
                ),
                next.kind == TokenKind::BlockEntry,
                matches!(next.kind, TokenKind::Anchor(_)),
                matches!(next.kind, TokenKind::Tag(_)),
            )
        };
        let in_slot = mark.line == owner_line || mark.col > owner_col;

        if starts_value {
            if in_slot {
                return self.parse_node(false);
            }
            return Ok(Value::Null);
        }
        if is_entry {
            if mark.col >= entry_min_col {
                let entry = self.bump()?;
                return self.parse_block_sequence(entry.mark);
            }
            return Ok(Value::Null);
        }
        if is_anchor && in_slot {
            let token = self.bump()?;
            let value = self.parse_nested_value(owner_col, owner_line, entry_min_col)?;
            if let TokenKind::Anchor(name) = token.kind {
                self.anchors.insert(name, value.clone());
            }
            return Ok(value);
        }
        if is_tag && in_slot {
            let token = self.bump()?;
            if let TokenKind::Tag(tag) = token.kind {
                self.pending_tag = Some((tag, token.mark));
            }
            let value = self.parse_nested_value(owner_col, owner_line, entry_min_col)?;
            return self.apply_pending_tag(value);
        }
        Ok(Value::Null)
    }

    /// Explicit-key block mapping: `? key` / `: value` pairs.
    fn parse_explicit_mapping(&mut self, first_mark: Mark) -> Result<Value> {
        let key_col = first_mark.col;
        let mut map = Mapping::new();
        loop {
            let key = if self.peek()?.kind == TokenKind::Value {
                // `?` directly followed by `:` is an explicit empty key.
                String::new()
            } else {
                let key_token = self.bump()?;
                match key_token.kind {
                    TokenKind::Scalar { value, .. } => value,
                    kind => {
                        return Err(Error::InvalidSyntax(
                            format!("mapping key must be a scalar, found {}", kind.describe()),
                            key_token.mark.suffix(),
                        ))
                    }
                }
            };
            let value = if self.peek()?.kind == TokenKind::Value {
                let colon = self.bump()?;
                self.parse_nested_value(key_col, colon.mark.line, key_col)?
            } else {
                Value::Null
            };
            map.insert(key, value);

            let again = {
                let next = self.peek()?;
                next.kind == TokenKind::Key && next.mark.col == key_col
            };
            if !again {
                break;
            }
            self.bump()?;
        }
        Ok(Value::Mapping(map))
    }

    /// Flow sequence body after `[`: values separated by `,` until `]`.
    fn parse_flow_sequence(&mut self, open: Mark) -> Result<Value> {
        let mut seq = Vec::new();
        loop {
            while self.peek_flow(open)?.kind == TokenKind::FlowEntry {
                self.bump()?;
            }
            if self.peek_flow(open)?.kind == TokenKind::FlowSequenceEnd {
                self.bump()?;
                break;
            }
            if self.peek_flow(open)?.kind == TokenKind::FlowMappingEnd {
                let token = self.bump()?;
                return Err(Error::UnexpectedToken(
                    token.kind.describe().to_string(),
                    token.mark.suffix(),
                ));
            }
            let item = self.parse_node(true)?;
            seq.push(item);
        }
        Ok(Value::Sequence(seq))
    }

    /// Flow mapping body after `{`: `key: value` pairs separated by `,`
    /// until `}`. Keys must be scalars.
    fn parse_flow_mapping(&mut self, open: Mark) -> Result<Value> {
        let mut map = Mapping::new();
        loop {
            while self.peek_flow(open)?.kind == TokenKind::FlowEntry {
                self.bump()?;
            }
            if self.peek_flow(open)?.kind == TokenKind::FlowMappingEnd {
                self.bump()?;
                break;
            }
            let key_token = self.bump()?;
            let key = match key_token.kind {
                TokenKind::Scalar { value, .. } => value,
                kind => {
                    return Err(Error::InvalidSyntax(
                        format!("mapping key must be a scalar, found {}", kind.describe()),
                        key_token.mark.suffix(),
                    ))
                }
            };
            let value = if self.peek_flow(open)?.kind == TokenKind::Value {
                self.bump()?;
                self.parse_node(true)?
            } else {
                Value::Null
            };
            map.insert(key, value);
        }
        Ok(Value::Mapping(map))
    }
}
