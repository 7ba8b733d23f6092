//! Via ヘッダー値 (RFC 9110 Section 7.6.3)
//!
//! ## 概要
//!
//! ```text
//! Via = #( received-protocol RWS received-by [ RWS comment ] )
//! received-protocol = [ protocol-name "/" ] protocol-version
//! received-by = pseudonym [ ":" port ] / host [ ":" port ]
//! ```
//!
//! `received-by` はトークン (仮名)、`host[:port]`、`[IPv6]:port` を受け付けます。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::via::ViaHeaderValue;
//!
//! let via = ViaHeaderValue::parse("HTTP/1.1 [::1] (cache)").unwrap();
//! assert_eq!(via.protocol_name(), Some("HTTP"));
//! assert_eq!(via.protocol_version(), "1.1");
//! assert_eq!(via.received_by(), "[::1]");
//! assert_eq!(via.comment(), Some("(cache)"));
//! ```

use core::fmt;

use crate::error::HeaderError;
use crate::grammar;
use crate::name_value::check_token;
use crate::parser::parse_exact;

/// Via ヘッダー値
#[derive(Debug, Clone)]
pub struct ViaHeaderValue {
    protocol_name: Option<String>,
    protocol_version: String,
    received_by: String,
    comment: Option<String>,
}

impl ViaHeaderValue {
    /// プロトコルバージョンと受信者から作成
    pub fn new(protocol_version: &str, received_by: &str) -> Result<Self, HeaderError> {
        check_token(protocol_version)?;
        check_received_by(received_by)?;
        Ok(ViaHeaderValue {
            protocol_name: None,
            protocol_version: protocol_version.to_string(),
            received_by: received_by.to_string(),
            comment: None,
        })
    }

    /// プロトコル名を設定
    pub fn with_protocol_name(mut self, protocol_name: &str) -> Result<Self, HeaderError> {
        check_token(protocol_name)?;
        self.protocol_name = Some(protocol_name.to_string());
        Ok(self)
    }

    /// コメント (括弧を含む) を設定
    pub fn with_comment(mut self, comment: &str) -> Result<Self, HeaderError> {
        if !grammar::is_comment(comment) {
            return Err(HeaderError::InvalidValue(comment.to_string()));
        }
        self.comment = Some(comment.to_string());
        Ok(self)
    }

    /// 値を 1 つパース
    pub fn parse(input: &str) -> Result<Self, HeaderError> {
        parse_exact("via", input, scan_via)
    }

    /// プロトコル名
    pub fn protocol_name(&self) -> Option<&str> {
        self.protocol_name.as_deref()
    }

    /// プロトコルバージョン
    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// 受信者
    pub fn received_by(&self) -> &str {
        &self.received_by
    }

    /// コメント (括弧を含む)
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

impl PartialEq for ViaHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        let names_equal = match (&self.protocol_name, &other.protocol_name) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        names_equal
            && self
                .protocol_version
                .eq_ignore_ascii_case(&other.protocol_version)
            && self.received_by.eq_ignore_ascii_case(&other.received_by)
            && self.comment == other.comment
    }
}

impl fmt::Display for ViaHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.protocol_name {
            write!(f, "{}/", name)?;
        }
        write!(f, "{} {}", self.protocol_version, self.received_by)?;
        if let Some(comment) = &self.comment {
            write!(f, " {}", comment)?;
        }
        Ok(())
    }
}

pub(crate) fn scan_via(input: &str, start: usize) -> Option<(usize, ViaHeaderValue)> {
    let bytes = input.as_bytes();

    let (mut current, protocol_name, protocol_version) = scan_received_protocol(input, start)?;
    if current >= bytes.len() {
        return None;
    }

    let received_by_length = grammar::scan_host(input, current, true);
    if received_by_length == 0 {
        return None;
    }
    let received_by = input[current..current + received_by_length].to_string();
    current = grammar::skip_whitespace(input, current + received_by_length);

    let mut comment = None;
    if current < bytes.len() && bytes[current] == b'(' {
        let comment_length = grammar::scan_comment(input, current);
        if comment_length == 0 {
            return None;
        }
        comment = Some(input[current..current + comment_length].to_string());
        current = grammar::skip_whitespace(input, current + comment_length);
    }

    Some((
        current - start,
        ViaHeaderValue {
            protocol_name,
            protocol_version,
            received_by,
            comment,
        },
    ))
}

/// `[protocol-name "/"] protocol-version RWS` をスキャン
///
/// 受信者の前に少なくとも 1 つの空白が必要。
fn scan_received_protocol(
    input: &str,
    start: usize,
) -> Option<(usize, Option<String>, String)> {
    let bytes = input.as_bytes();

    let first_length = grammar::scan_token(input, start);
    if first_length == 0 {
        return None;
    }
    let first = input[start..start + first_length].to_string();
    let mut current = start + first_length;
    let mut whitespace_start = current;
    current = grammar::skip_whitespace(input, current);
    if current >= bytes.len() {
        return None;
    }

    let (protocol_name, protocol_version) = if bytes[current] == b'/' {
        current = grammar::skip_whitespace(input, current + 1);
        let version_length = grammar::scan_token(input, current);
        if version_length == 0 {
            return None;
        }
        let version = input[current..current + version_length].to_string();
        current += version_length;
        whitespace_start = current;
        current = grammar::skip_whitespace(input, current);
        (Some(first), version)
    } else {
        (None, first)
    };

    if current == whitespace_start {
        return None;
    }

    Some((current, protocol_name, protocol_version))
}

fn check_received_by(received_by: &str) -> Result<(), HeaderError> {
    if received_by.is_empty() {
        return Err(HeaderError::MissingValue);
    }
    if grammar::scan_host(received_by, 0, true) != received_by.len() {
        return Err(HeaderError::InvalidValue(received_by.to_string()));
    }
    Ok(())
}
