//! 転送コーディング (RFC 9112 Section 7)
//!
//! ## 概要
//!
//! `Transfer-Encoding` と `TE` で使われる `coding *( ; parameter )` 形式の値を扱います。
//! コーディング名は大文字小文字を区別せずに比較します。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::transfer_coding::TransferCodingHeaderValue;
//!
//! let tc = TransferCodingHeaderValue::parse("gzip; q=0.5").unwrap();
//! assert_eq!(tc.value(), "gzip");
//! assert_eq!(tc.parameters().len(), 1);
//! assert!(TransferCodingHeaderValue::chunked().is_chunked());
//! ```

use core::fmt;

use crate::error::HeaderError;
use crate::grammar;
use crate::name_value::{
    NameValueHeaderValue, check_token, parameters_equal, scan_parameters, write_parameters,
};
use crate::parser::parse_exact;

/// `chunked` 転送コーディング名
pub const CHUNKED: &str = "chunked";

/// 転送コーディング
#[derive(Debug, Clone)]
pub struct TransferCodingHeaderValue {
    value: String,
    parameters: Vec<NameValueHeaderValue>,
}

impl TransferCodingHeaderValue {
    /// コーディング名から作成
    pub fn new(value: &str) -> Result<Self, HeaderError> {
        check_token(value)?;
        Ok(TransferCodingHeaderValue {
            value: value.to_string(),
            parameters: Vec::new(),
        })
    }

    /// `chunked` を作成
    pub fn chunked() -> Self {
        TransferCodingHeaderValue {
            value: CHUNKED.to_string(),
            parameters: Vec::new(),
        }
    }

    /// 値を 1 つパース
    pub fn parse(input: &str) -> Result<Self, HeaderError> {
        parse_exact("transfer-coding", input, scan_transfer_coding)
    }

    /// コーディング名
    pub fn value(&self) -> &str {
        &self.value
    }

    /// パラメータ
    pub fn parameters(&self) -> &[NameValueHeaderValue] {
        &self.parameters
    }

    /// パラメータを可変参照で取得
    pub fn parameters_mut(&mut self) -> &mut Vec<NameValueHeaderValue> {
        &mut self.parameters
    }

    /// パラメータなしの `chunked` かどうか
    pub fn is_chunked(&self) -> bool {
        self.value.eq_ignore_ascii_case(CHUNKED) && self.parameters.is_empty()
    }
}

impl PartialEq for TransferCodingHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        self.value.eq_ignore_ascii_case(&other.value)
            && parameters_equal(&self.parameters, &other.parameters)
    }
}

impl fmt::Display for TransferCodingHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        write_parameters(f, &self.parameters)
    }
}

pub(crate) fn scan_transfer_coding(
    input: &str,
    start: usize,
) -> Option<(usize, TransferCodingHeaderValue)> {
    let bytes = input.as_bytes();

    let length = grammar::scan_token(input, start);
    if length == 0 {
        return None;
    }
    let value = input[start..start + length].to_string();
    let mut current = grammar::skip_whitespace(input, start + length);

    let mut parameters = Vec::new();
    if current < bytes.len() && bytes[current] == b';' {
        let (params_length, params) = scan_parameters(input, current + 1, b';')?;
        parameters = params;
        current += 1 + params_length;
    }

    Some((
        current - start,
        TransferCodingHeaderValue { value, parameters },
    ))
}
