//! 名前/値ペア (RFC 9110 Section 5.6.6)
//!
//! ## 概要
//!
//! `name` または `name=value` 形式の値を扱います。
//! 値はトークンまたは引用符付き文字列で、引用符を含めてそのまま保持します。
//! `Pragma` ヘッダーの値や、メディアタイプなどのパラメータとして使われます。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::name_value::NameValueHeaderValue;
//!
//! let nv = NameValueHeaderValue::parse("charset = \"utf-8\"").unwrap();
//! assert_eq!(nv.name(), "charset");
//! assert_eq!(nv.value(), Some("\"utf-8\""));
//! assert_eq!(nv.to_string(), "charset=\"utf-8\"");
//!
//! // API での生成は空白を含む形式を受け付けない
//! assert!(NameValueHeaderValue::with_value("charset", " utf-8").is_err());
//! ```

use core::fmt;

use crate::error::HeaderError;
use crate::grammar;
use crate::parser::parse_exact;

/// 名前/値ペア
#[derive(Debug, Clone, Eq)]
pub struct NameValueHeaderValue {
    name: String,
    value: Option<String>,
}

impl NameValueHeaderValue {
    /// 値なしの名前/値ペアを作成
    pub fn new(name: &str) -> Result<Self, HeaderError> {
        check_token(name)?;
        Ok(NameValueHeaderValue {
            name: name.to_string(),
            value: None,
        })
    }

    /// 値付きの名前/値ペアを作成
    ///
    /// 値はトークンまたは引用符付き文字列でなければならない。
    pub fn with_value(name: &str, value: &str) -> Result<Self, HeaderError> {
        let mut nv = NameValueHeaderValue::new(name)?;
        nv.set_value(Some(value))?;
        Ok(nv)
    }

    /// 名前/値ペアを 1 つパース
    pub fn parse(input: &str) -> Result<Self, HeaderError> {
        parse_exact("name-value", input, scan_name_value)
    }

    /// 名前を取得
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 値を取得 (引用符付き文字列の場合は引用符を含む)
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// 値を設定
    ///
    /// 空文字列または None は値なしとして扱う。
    pub fn set_value(&mut self, value: Option<&str>) -> Result<(), HeaderError> {
        match value {
            None | Some("") => self.value = None,
            Some(value) => {
                check_value(value)?;
                self.value = Some(value.to_string());
            }
        }
        Ok(())
    }

    pub(crate) fn from_parts(name: String, value: Option<String>) -> Self {
        NameValueHeaderValue { name, value }
    }
}

impl PartialEq for NameValueHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        if !self.name.eq_ignore_ascii_case(&other.name) {
            return false;
        }

        match (&self.value, &other.value) {
            (None, None) => true,
            // 引用符付き文字列は大文字小文字を区別する
            (Some(a), Some(b)) if a.starts_with('"') => a == b,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

impl fmt::Display for NameValueHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}

/// 名前/値ペアの長さを取得 (後続の空白を含む)
///
/// 呼び出し側で先頭の空白を取り除いておくこと。
pub(crate) fn scan_name_value(input: &str, start: usize) -> Option<(usize, NameValueHeaderValue)> {
    let bytes = input.as_bytes();

    let name_length = grammar::scan_token(input, start);
    if name_length == 0 {
        return None;
    }
    let name = input[start..start + name_length].to_string();
    let mut current = grammar::skip_whitespace(input, start + name_length);

    if current >= bytes.len() || bytes[current] != b'=' {
        // 名前のみ
        return Some((
            current - start,
            NameValueHeaderValue::from_parts(name, None),
        ));
    }

    current = grammar::skip_whitespace(input, current + 1);

    let value_length = scan_value(input, current);
    if value_length == 0 {
        return None;
    }
    let value = input[current..current + value_length].to_string();
    current = grammar::skip_whitespace(input, current + value_length);

    Some((
        current - start,
        NameValueHeaderValue::from_parts(name, Some(value)),
    ))
}

/// 値 (トークンまたは引用符付き文字列) の長さを取得
pub(crate) fn scan_value(input: &str, start: usize) -> usize {
    if start >= input.len() {
        return 0;
    }
    match grammar::scan_token(input, start) {
        0 => grammar::scan_quoted_string(input, start),
        length => length,
    }
}

/// `delimiter` で区切られたパラメータ列の長さを取得
///
/// 例: `a=b; c=d` は 2 つのパラメータ。少なくとも 1 つのパラメータが必要。
pub(crate) fn scan_parameters(
    input: &str,
    start: usize,
    delimiter: u8,
) -> Option<(usize, Vec<NameValueHeaderValue>)> {
    let bytes = input.as_bytes();
    if start >= bytes.len() {
        return None;
    }

    let mut parameters = Vec::new();
    let mut current = grammar::skip_whitespace(input, start);

    loop {
        let (length, parameter) = scan_name_value(input, current)?;
        parameters.push(parameter);
        current = grammar::skip_whitespace(input, current + length);

        if current >= bytes.len() || bytes[current] != delimiter {
            return Some((current - start, parameters));
        }

        current = grammar::skip_whitespace(input, current + 1);
    }
}

/// 名前でパラメータを検索 (大文字小文字を区別しない、最初の一致)
pub(crate) fn find_parameter<'a>(
    parameters: &'a [NameValueHeaderValue],
    name: &str,
) -> Option<&'a NameValueHeaderValue> {
    parameters
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

/// パラメータを設定
///
/// 値が None の場合は最初の一致を削除する。既存のパラメータがなければ追加する。
pub(crate) fn set_parameter(
    parameters: &mut Vec<NameValueHeaderValue>,
    name: &str,
    value: Option<&str>,
) -> Result<(), HeaderError> {
    let position = parameters
        .iter()
        .position(|p| p.name.eq_ignore_ascii_case(name));

    match (position, value) {
        (Some(pos), None) => {
            parameters.remove(pos);
        }
        (None, None) => {}
        (Some(pos), Some(value)) => {
            parameters[pos].set_value(Some(value))?;
        }
        (None, Some(value)) => {
            parameters.push(NameValueHeaderValue::with_value(name, value)?);
        }
    }

    Ok(())
}

/// パラメータ列を順序に依存せずに比較
pub(crate) fn parameters_equal(a: &[NameValueHeaderValue], b: &[NameValueHeaderValue]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut used = vec![false; b.len()];
    a.iter().all(|x| {
        match b
            .iter()
            .enumerate()
            .position(|(i, y)| !used[i] && x == y)
        {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// パラメータ列を `; name=value` 形式で出力
pub(crate) fn write_parameters(
    f: &mut fmt::Formatter<'_>,
    parameters: &[NameValueHeaderValue],
) -> fmt::Result {
    for parameter in parameters {
        write!(f, "; {}", parameter)?;
    }
    Ok(())
}

pub(crate) fn check_token(value: &str) -> Result<(), HeaderError> {
    if value.is_empty() {
        return Err(HeaderError::MissingValue);
    }
    if !grammar::is_valid_token(value) {
        return Err(HeaderError::InvalidValue(value.to_string()));
    }
    Ok(())
}

fn check_value(value: &str) -> Result<(), HeaderError> {
    if scan_value(value, 0) != value.len() {
        return Err(HeaderError::InvalidValue(value.to_string()));
    }
    Ok(())
}
