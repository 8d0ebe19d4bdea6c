// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Line-oriented text codec in the TOON style.
//!
//! The layout is indentation-structured with one `key: value` per line and
//! length-marked array headers:
//!
//! ```text
//! users[#2]:
//!   - id: 1
//!     name: User_0
//!     email: user0@example.com
//!     role: admin
//!     tags[#0]:
//!     profile:
//!       age: 18
//!       country: BR
//!       score: 0
//!       verified: true
//!   - id: 2
//!     ...
//! ```
//!
//! The codec is schema-driven: it only understands the payload shape, which
//! keeps decoding strict (declared lengths, required fields and indentation
//! are all checked).

use serde::{Deserialize, Serialize};

use super::{ensure_finite, Codec};
use crate::error::{DecodeError, EncodeError, ValidationError};
use crate::payload::{Payload, Profile, User};
use crate::types::Format;

const MIN_INDENT: usize = 1;
const MAX_INDENT: usize = 8;

/// Separator between inline array values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
}

impl Delimiter {
    pub const fn as_char(&self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
            Self::Pipe => '|',
        }
    }

    /// Marker written inside array brackets; comma is implicit.
    const fn header_marker(&self) -> &'static str {
        match self {
            Self::Comma => "",
            Self::Tab => "\t",
            Self::Pipe => "|",
        }
    }
}

/// Line codec options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LineOptions {
    /// Write `[#N]` instead of `[N]` in array headers.
    pub length_markers: bool,
    /// Spaces per nesting level.
    pub indent: usize,
    /// Inline array separator.
    pub delimiter: Delimiter,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            length_markers: true,
            indent: 2,
            delimiter: Delimiter::Comma,
        }
    }
}

impl LineOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_INDENT..=MAX_INDENT).contains(&self.indent) {
            return Err(ValidationError::OutOfRange {
                field: "indent",
                value: self.indent as i64,
                min: MIN_INDENT as i64,
                max: MAX_INDENT as i64,
            });
        }
        Ok(())
    }
}

/// TOON-style line codec.
#[derive(Debug, Clone)]
pub struct LineCodec {
    options: LineOptions,
    /// Prefix of the first line of a list item (`  - `).
    item_prefix: String,
    /// Prefix of a field inside a list item.
    field_prefix: String,
    /// Prefix of a field inside a nested object of a list item.
    nested_prefix: String,
}

impl LineCodec {
    /// Build a codec from validated options.
    pub fn new(options: LineOptions) -> Result<Self, ValidationError> {
        options.validate()?;
        let unit = " ".repeat(options.indent);
        Ok(Self {
            options,
            item_prefix: format!("{}- ", unit),
            field_prefix: unit.repeat(2),
            nested_prefix: unit.repeat(3),
        })
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    fn write_header(&self, out: &mut String, key: &str, len: usize) {
        out.push_str(key);
        out.push('[');
        if self.options.length_markers {
            out.push('#');
        }
        out.push_str(&len.to_string());
        out.push_str(self.options.delimiter.header_marker());
        out.push_str("]:");
    }

    fn write_string(&self, out: &mut String, value: &str) {
        if needs_quotes(value, self.options.delimiter.as_char()) {
            out.push('"');
            for c in value.chars() {
                match c {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    _ => out.push(c),
                }
            }
            out.push('"');
        } else {
            out.push_str(value);
        }
    }

    fn write_user(&self, out: &mut String, user: &User) -> Result<(), EncodeError> {
        out.push('\n');
        out.push_str(&self.item_prefix);
        out.push_str("id: ");
        out.push_str(&user.id.to_string());

        for (key, value) in [
            ("name", &user.name),
            ("email", &user.email),
            ("role", &user.role),
        ] {
            out.push('\n');
            out.push_str(&self.field_prefix);
            out.push_str(key);
            out.push_str(": ");
            self.write_string(out, value);
        }

        out.push('\n');
        out.push_str(&self.field_prefix);
        self.write_header(out, "tags", user.tags.len());
        for (i, tag) in user.tags.iter().enumerate() {
            out.push(if i == 0 { ' ' } else { self.options.delimiter.as_char() });
            self.write_string(out, tag);
        }

        if let Some(profile) = &user.profile {
            ensure_finite("score", profile.score)?;

            out.push('\n');
            out.push_str(&self.field_prefix);
            out.push_str("profile:");

            out.push('\n');
            out.push_str(&self.nested_prefix);
            out.push_str("age: ");
            out.push_str(&profile.age.to_string());

            out.push('\n');
            out.push_str(&self.nested_prefix);
            out.push_str("country: ");
            self.write_string(out, &profile.country);

            out.push('\n');
            out.push_str(&self.nested_prefix);
            out.push_str("score: ");
            out.push_str(&profile.score.to_string());

            out.push('\n');
            out.push_str(&self.nested_prefix);
            out.push_str("verified: ");
            out.push_str(if profile.verified { "true" } else { "false" });
        }

        Ok(())
    }

    // =========================================================================
    // Decoding
    // =========================================================================

    fn parse_user(&self, reader: &mut LineReader<'_>) -> Result<User, DecodeError> {
        let (start, line) = reader.next_line().ok_or(DecodeError::UnexpectedEof {
            expected: "list item",
        })?;
        let first = line
            .strip_prefix(self.item_prefix.as_str())
            .ok_or_else(|| malformed(start, "expected list item"))?;

        let mut fields = UserFields::default();
        self.apply_user_field(&mut fields, parse_field(first, start)?, start, reader)?;

        while let Some((line_no, line)) = reader.peek() {
            let Some(rest) = line.strip_prefix(self.field_prefix.as_str()) else {
                break;
            };
            if rest.starts_with(' ') {
                return Err(malformed(line_no, "unexpected indentation"));
            }
            reader.advance();
            self.apply_user_field(&mut fields, parse_field(rest, line_no)?, line_no, reader)?;
        }

        fields.finish(start)
    }

    fn apply_user_field(
        &self,
        fields: &mut UserFields,
        field: FieldLine<'_>,
        line: usize,
        reader: &mut LineReader<'_>,
    ) -> Result<(), DecodeError> {
        match field.key {
            "id" => {
                field.expect_scalar(line)?;
                set_once(&mut fields.id, parse_number(field.value, "id", line)?, "id", line)
            }
            "name" => {
                field.expect_scalar(line)?;
                set_once(&mut fields.name, parse_string(field.value, line)?, "name", line)
            }
            "email" => {
                field.expect_scalar(line)?;
                set_once(&mut fields.email, parse_string(field.value, line)?, "email", line)
            }
            "role" => {
                field.expect_scalar(line)?;
                set_once(&mut fields.role, parse_string(field.value, line)?, "role", line)
            }
            "tags" => {
                let header = field
                    .array
                    .ok_or_else(|| malformed(line, "'tags' requires an array header"))?;
                let tags = parse_delimited(field.value, header.delimiter.as_char(), line)?;
                if tags.len() != header.len {
                    return Err(DecodeError::LengthMismatch {
                        field: "tags",
                        line,
                        declared: header.len,
                        actual: tags.len(),
                    });
                }
                set_once(&mut fields.tags, tags, "tags", line)
            }
            "profile" => {
                field.expect_scalar(line)?;
                if !field.value.is_empty() {
                    return Err(malformed(line, "'profile' must open a nested block"));
                }
                let profile = self.parse_profile(reader, line)?;
                set_once(&mut fields.profile, profile, "profile", line)
            }
            other => Err(malformed(line, format!("unknown field '{}'", other))),
        }
    }

    fn parse_profile(
        &self,
        reader: &mut LineReader<'_>,
        start: usize,
    ) -> Result<Profile, DecodeError> {
        let mut age = None;
        let mut country = None;
        let mut score = None;
        let mut verified = None;

        while let Some((line_no, line)) = reader.peek() {
            let Some(rest) = line.strip_prefix(self.nested_prefix.as_str()) else {
                break;
            };
            if rest.starts_with(' ') {
                return Err(malformed(line_no, "unexpected indentation"));
            }
            reader.advance();

            let field = parse_field(rest, line_no)?;
            field.expect_scalar(line_no)?;
            match field.key {
                "age" => set_once(
                    &mut age,
                    parse_number(field.value, "age", line_no)?,
                    "age",
                    line_no,
                )?,
                "country" => set_once(
                    &mut country,
                    parse_string(field.value, line_no)?,
                    "country",
                    line_no,
                )?,
                "score" => {
                    let value: f64 = parse_number(field.value, "score", line_no)?;
                    if !value.is_finite() {
                        return Err(malformed(line_no, "score must be finite"));
                    }
                    set_once(&mut score, value, "score", line_no)?
                }
                "verified" => set_once(
                    &mut verified,
                    parse_number(field.value, "verified", line_no)?,
                    "verified",
                    line_no,
                )?,
                other => return Err(malformed(line_no, format!("unknown field '{}'", other))),
            }
        }

        Ok(Profile {
            age: require(age, "age", start)?,
            country: require(country, "country", start)?,
            score: require(score, "score", start)?,
            verified: require(verified, "verified", start)?,
        })
    }
}

impl Codec for LineCodec {
    fn format(&self) -> Format {
        Format::Line
    }

    fn encode(&self, payload: &Payload) -> Result<Vec<u8>, EncodeError> {
        let mut out = String::with_capacity(16 + payload.users.len() * 192);
        self.write_header(&mut out, "users", payload.users.len());
        for user in &payload.users {
            self.write_user(&mut out, user)?;
        }
        Ok(out.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Payload, DecodeError> {
        let text = std::str::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })?;
        let mut reader = LineReader::new(text);

        let (header_line, header) = reader.next_line().ok_or(DecodeError::UnexpectedEof {
            expected: "users header",
        })?;
        let field = parse_field(header, header_line)?;
        if field.key != "users" {
            return Err(malformed(header_line, "expected 'users' array header"));
        }
        let header = field
            .array
            .ok_or_else(|| malformed(header_line, "'users' requires an array header"))?;
        if !field.value.is_empty() {
            return Err(malformed(header_line, "unexpected inline values for 'users'"));
        }

        let mut users = Vec::with_capacity(header.len.min(reader.remaining()));
        while let Some((_, line)) = reader.peek() {
            if !line.starts_with(self.item_prefix.as_str()) {
                break;
            }
            users.push(self.parse_user(&mut reader)?);
        }

        if users.len() != header.len {
            return Err(DecodeError::LengthMismatch {
                field: "users",
                line: header_line,
                declared: header.len,
                actual: users.len(),
            });
        }
        if let Some((line, _)) = reader.next_line() {
            return Err(DecodeError::TrailingContent { line });
        }

        Ok(Payload { users })
    }
}

/// Whether a string value must be quoted to survive decoding unchanged.
fn needs_quotes(value: &str, delimiter: char) -> bool {
    if value.is_empty() || value.trim() != value {
        return true;
    }
    if matches!(value, "true" | "false" | "null") || value.parse::<f64>().is_ok() {
        return true;
    }
    if value.starts_with(['-', '[', '{']) {
        return true;
    }
    value
        .chars()
        .any(|c| c == delimiter || matches!(c, ':' | '"' | '\\') || c.is_control())
}

/// Line cursor with 1-based line numbers.
struct LineReader<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        let mut lines: Vec<&str> = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        Self { lines, pos: 0 }
    }

    fn peek(&self) -> Option<(usize, &'a str)> {
        self.lines.get(self.pos).map(|line| (self.pos + 1, *line))
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        let item = self.peek();
        if item.is_some() {
            self.advance();
        }
        item
    }

    fn remaining(&self) -> usize {
        self.lines.len() - self.pos
    }
}

#[derive(Debug, Clone, Copy)]
struct ArrayHeader {
    len: usize,
    delimiter: Delimiter,
}

/// One `key: value` or `key[N]: values` line, indentation already stripped.
#[derive(Debug)]
struct FieldLine<'a> {
    key: &'a str,
    array: Option<ArrayHeader>,
    value: &'a str,
}

impl FieldLine<'_> {
    fn expect_scalar(&self, line: usize) -> Result<(), DecodeError> {
        if self.array.is_some() {
            return Err(malformed(line, format!("'{}' is not an array", self.key)));
        }
        Ok(())
    }
}

fn parse_field(text: &str, line: usize) -> Result<FieldLine<'_>, DecodeError> {
    let end = text
        .find([':', '['])
        .ok_or_else(|| malformed(line, "expected 'key: value'"))?;
    let key = &text[..end];
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(malformed(line, format!("invalid key '{}'", key)));
    }

    let mut rest = &text[end..];
    let array = if let Some(inner) = rest.strip_prefix('[') {
        let close = inner
            .find(']')
            .ok_or_else(|| malformed(line, "unterminated array header"))?;
        let header = parse_array_header(&inner[..close], line)?;
        rest = &inner[close + 1..];
        Some(header)
    } else {
        None
    };

    let rest = rest
        .strip_prefix(':')
        .ok_or_else(|| malformed(line, "expected ':' after key"))?;
    let value = if rest.is_empty() {
        rest
    } else {
        rest.strip_prefix(' ')
            .ok_or_else(|| malformed(line, "expected a space after ':'"))?
    };

    Ok(FieldLine { key, array, value })
}

fn parse_array_header(inner: &str, line: usize) -> Result<ArrayHeader, DecodeError> {
    let inner = inner.strip_prefix('#').unwrap_or(inner);
    let digits_end = inner
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(inner.len());
    let (digits, marker) = inner.split_at(digits_end);

    let len = digits
        .parse::<usize>()
        .map_err(|_| malformed(line, format!("invalid array length '{}'", digits)))?;
    let delimiter = match marker {
        "" => Delimiter::Comma,
        "\t" => Delimiter::Tab,
        "|" => Delimiter::Pipe,
        other => {
            return Err(malformed(
                line,
                format!("unsupported array delimiter '{}'", other.escape_debug()),
            ))
        }
    };

    Ok(ArrayHeader { len, delimiter })
}

/// Parse a quoted string at the start of `s`, returning it and the remainder.
fn parse_quoted(s: &str, line: usize) -> Result<(String, &str), DecodeError> {
    let mut out = String::new();
    let mut chars = s.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, &s[i + 1..])),
            '\\' => {
                let (_, escaped) = chars
                    .next()
                    .ok_or_else(|| malformed(line, "unterminated escape"))?;
                out.push(match escaped {
                    '"' => '"',
                    '\\' => '\\',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    other => {
                        return Err(malformed(line, format!("invalid escape '\\{}'", other)))
                    }
                });
            }
            _ => out.push(c),
        }
    }
    Err(malformed(line, "unterminated string"))
}

fn parse_string(value: &str, line: usize) -> Result<String, DecodeError> {
    if value.starts_with('"') {
        let (parsed, rest) = parse_quoted(value, line)?;
        if !rest.is_empty() {
            return Err(malformed(line, "unexpected content after closing quote"));
        }
        Ok(parsed)
    } else if value.is_empty() {
        Err(malformed(line, "missing value"))
    } else {
        Ok(value.to_string())
    }
}

fn parse_delimited(value: &str, delimiter: char, line: usize) -> Result<Vec<String>, DecodeError> {
    let mut items = Vec::new();
    if value.is_empty() {
        return Ok(items);
    }

    let mut rest = value;
    loop {
        let after = if rest.starts_with('"') {
            let (item, after) = parse_quoted(rest, line)?;
            items.push(item);
            after
        } else {
            let end = rest.find(delimiter).unwrap_or(rest.len());
            if end == 0 {
                return Err(malformed(line, "empty array item"));
            }
            items.push(rest[..end].to_string());
            &rest[end..]
        };

        if after.is_empty() {
            return Ok(items);
        }
        rest = after
            .strip_prefix(delimiter)
            .ok_or_else(|| malformed(line, "expected delimiter between array items"))?;
    }
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<T, DecodeError> {
    value
        .parse()
        .map_err(|_| malformed(line, format!("invalid {} value '{}'", field, value)))
}

fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    field: &'static str,
    line: usize,
) -> Result<(), DecodeError> {
    if slot.is_some() {
        return Err(DecodeError::DuplicateField {
            field: field.to_string(),
            line,
        });
    }
    *slot = Some(value);
    Ok(())
}

fn require<T>(slot: Option<T>, field: &'static str, line: usize) -> Result<T, DecodeError> {
    slot.ok_or(DecodeError::MissingField { field, line })
}

fn malformed(line: usize, reason: impl Into<String>) -> DecodeError {
    DecodeError::Malformed {
        line,
        reason: reason.into(),
    }
}

/// Fields collected for one list item.
#[derive(Default)]
struct UserFields {
    id: Option<u64>,
    name: Option<String>,
    email: Option<String>,
    role: Option<String>,
    tags: Option<Vec<String>>,
    profile: Option<Profile>,
}

impl UserFields {
    fn finish(self, start: usize) -> Result<User, DecodeError> {
        Ok(User {
            id: require(self.id, "id", start)?,
            name: require(self.name, "name", start)?,
            email: require(self.email, "email", start)?,
            role: require(self.role, "role", start)?,
            tags: require(self.tags, "tags", start)?,
            profile: self.profile,
        })
    }
}
