//! 品質値付き文字列 (RFC 9110 Section 12.4.2)
//!
//! ## 概要
//!
//! `Accept-Charset`、`Accept-Encoding`、`Accept-Language` で使われる
//! `token [; q=qvalue]` 形式の値を扱います。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::quality::StringWithQualityHeaderValue;
//!
//! let v = StringWithQualityHeaderValue::parse("gzip;q=0.5").unwrap();
//! assert_eq!(v.value(), "gzip");
//! assert_eq!(v.quality(), Some(0.5));
//! assert_eq!(v.to_string(), "gzip; q=0.5");
//! ```

use core::fmt;

use crate::error::HeaderError;
use crate::grammar;
use crate::name_value::check_token;
use crate::parser::parse_exact;

/// 品質値付き文字列
#[derive(Debug, Clone, PartialEq)]
pub struct StringWithQualityHeaderValue {
    value: String,
    quality: Option<f64>,
}

impl StringWithQualityHeaderValue {
    /// 品質値なしで作成
    pub fn new(value: &str) -> Result<Self, HeaderError> {
        check_token(value)?;
        Ok(StringWithQualityHeaderValue {
            value: value.to_string(),
            quality: None,
        })
    }

    /// 品質値付きで作成
    pub fn with_quality(value: &str, quality: f64) -> Result<Self, HeaderError> {
        check_token(value)?;
        check_quality(quality)?;
        Ok(StringWithQualityHeaderValue {
            value: value.to_string(),
            quality: Some(quality),
        })
    }

    /// 値を 1 つパース
    pub fn parse(input: &str) -> Result<Self, HeaderError> {
        parse_exact("string-with-quality", input, scan_string_with_quality)
    }

    /// 値を取得
    pub fn value(&self) -> &str {
        &self.value
    }

    /// 品質値を取得
    pub fn quality(&self) -> Option<f64> {
        self.quality
    }
}

impl fmt::Display for StringWithQualityHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(q) = self.quality {
            write!(f, "; q={}", format_quality(q))?;
        }
        Ok(())
    }
}

pub(crate) fn scan_string_with_quality(
    input: &str,
    start: usize,
) -> Option<(usize, StringWithQualityHeaderValue)> {
    let bytes = input.as_bytes();

    let length = grammar::scan_token(input, start);
    if length == 0 {
        return None;
    }
    let value = input[start..start + length].to_string();
    let mut current = grammar::skip_whitespace(input, start + length);

    if current >= bytes.len() || bytes[current] != b';' {
        return Some((
            current - start,
            StringWithQualityHeaderValue {
                value,
                quality: None,
            },
        ));
    }

    current = grammar::skip_whitespace(input, current + 1);
    if current >= bytes.len() || !bytes[current].eq_ignore_ascii_case(&b'q') {
        return None;
    }
    current = grammar::skip_whitespace(input, current + 1);
    if current >= bytes.len() || bytes[current] != b'=' {
        return None;
    }
    current = grammar::skip_whitespace(input, current + 1);

    let number_length = grammar::scan_number(input, current, true);
    if number_length == 0 {
        return None;
    }
    let quality = parse_quality(&input[current..current + number_length])?;
    current = grammar::skip_whitespace(input, current + number_length);

    Some((
        current - start,
        StringWithQualityHeaderValue {
            value,
            quality: Some(quality),
        },
    ))
}

/// qvalue をパース
///
/// ```text
/// qvalue = ( "0" [ "." 0*3DIGIT ] ) / ( "1" [ "." 0*3("0") ] )
/// ```
pub(crate) fn parse_quality(s: &str) -> Option<f64> {
    let (integer, fraction) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    if fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    match integer {
        "0" => {}
        "1" if fraction.bytes().all(|b| b == b'0') => {}
        _ => return None,
    }

    s.parse::<f64>().ok()
}

/// qvalue を文字列化 (`1.0`、`0.5`、`0.123`)
pub(crate) fn format_quality(q: f64) -> String {
    let mut s = format!("{:.3}", q);
    while s.ends_with('0') && !s.ends_with(".0") {
        s.pop();
    }
    s
}

pub(crate) fn check_quality(q: f64) -> Result<(), HeaderError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(HeaderError::InvalidValue(q.to_string()));
    }
    Ok(())
}
