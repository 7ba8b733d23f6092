//! Warning ヘッダー値 (RFC 7234 Section 5.5)
//!
//! ## 概要
//!
//! ```text
//! warning-value = warn-code SP warn-agent SP warn-text [ SP warn-date ]
//! warn-code = 3DIGIT
//! warn-agent = ( uri-host [ ":" port ] ) / pseudonym
//! warn-date = DQUOTE HTTP-date DQUOTE
//! ```
//!
//! パース時の `warn-code` は 1 から 3 桁を受け付け、出力は常に 3 桁です。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::warning::WarningHeaderValue;
//!
//! let w = WarningHeaderValue::parse(
//!     "112 - \"network down\" \"Sun, 06 Nov 1994 08:49:37 GMT\"",
//! )
//! .unwrap();
//! assert_eq!(w.code(), 112);
//! assert_eq!(w.agent(), "-");
//! assert_eq!(w.text(), "\"network down\"");
//! assert!(w.date().is_some());
//! ```

use core::fmt;

use crate::date::HttpDate;
use crate::error::HeaderError;
use crate::grammar;
use crate::parser::parse_exact;

/// Warning ヘッダー値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningHeaderValue {
    code: u16,
    agent: String,
    text: String,
    date: Option<HttpDate>,
}

impl WarningHeaderValue {
    /// コード、エージェント、テキスト (引用符付き文字列) から作成
    pub fn new(code: u16, agent: &str, text: &str) -> Result<Self, HeaderError> {
        if code > 999 {
            return Err(HeaderError::InvalidValue(code.to_string()));
        }
        if agent.is_empty() || text.is_empty() {
            return Err(HeaderError::MissingValue);
        }
        if grammar::scan_host(agent, 0, true) != agent.len() {
            return Err(HeaderError::InvalidValue(agent.to_string()));
        }
        if !grammar::is_quoted_string(text) {
            return Err(HeaderError::InvalidValue(text.to_string()));
        }
        Ok(WarningHeaderValue {
            code,
            agent: agent.to_string(),
            text: text.to_string(),
            date: None,
        })
    }

    /// 日付を設定
    pub fn with_date(mut self, date: HttpDate) -> Self {
        self.date = Some(date);
        self
    }

    /// 値を 1 つパース
    pub fn parse(input: &str) -> Result<Self, HeaderError> {
        parse_exact("warning", input, scan_warning)
    }

    /// 警告コード
    pub fn code(&self) -> u16 {
        self.code
    }

    /// エージェント
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// テキスト (引用符を含む)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 日付
    pub fn date(&self) -> Option<&HttpDate> {
        self.date.as_ref()
    }
}

impl fmt::Display for WarningHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03} {} {}", self.code, self.agent, self.text)?;
        if let Some(date) = &self.date {
            write!(f, " \"{}\"", date)?;
        }
        Ok(())
    }
}

pub(crate) fn scan_warning(input: &str, start: usize) -> Option<(usize, WarningHeaderValue)> {
    let bytes = input.as_bytes();

    // warn-code
    let code_length = grammar::scan_number(input, start, false);
    if code_length == 0 || code_length > 3 {
        return None;
    }
    let code = input[start..start + code_length].parse::<u16>().ok()?;
    let mut current = require_whitespace(input, start + code_length)?;

    // warn-agent
    let agent_length = grammar::scan_host(input, current, true);
    if agent_length == 0 {
        return None;
    }
    let agent = input[current..current + agent_length].to_string();
    current = require_whitespace(input, current + agent_length)?;

    // warn-text
    let text_length = grammar::scan_quoted_string(input, current);
    if text_length == 0 {
        return None;
    }
    let text = input[current..current + text_length].to_string();
    current += text_length;

    // warn-date
    let whitespace_start = current;
    current = grammar::skip_whitespace(input, current);
    let mut date = None;
    if current < bytes.len() && bytes[current] == b'"' {
        if current == whitespace_start {
            return None;
        }
        let date_start = current + 1;
        let (date_length, parsed) = grammar::scan_date(input, date_start)?;
        let date_end = date_start + date_length;
        if bytes.get(date_end) != Some(&b'"') {
            return None;
        }
        date = Some(parsed);
        current = grammar::skip_whitespace(input, date_end + 1);
    }

    Some((
        current - start,
        WarningHeaderValue {
            code,
            agent,
            text,
            date,
        },
    ))
}

/// 1 つ以上の空白をスキップし、後続の値があることを確認する
fn require_whitespace(input: &str, start: usize) -> Option<usize> {
    let current = grammar::skip_whitespace(input, start);
    if current == start || current >= input.len() {
        return None;
    }
    Some(current)
}
