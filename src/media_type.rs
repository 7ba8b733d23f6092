//! メディアタイプ (RFC 9110 Section 8.3.1)
//!
//! ## 概要
//!
//! `Content-Type` で使われる `type/subtype *( ; parameter )` 形式と、
//! `Accept` で使われる品質値付きのメディアタイプを扱います。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::media_type::MediaTypeHeaderValue;
//!
//! let mt = MediaTypeHeaderValue::parse("text/html; charset=\"UTF-8\"").unwrap();
//! assert_eq!(mt.media_type(), "text/html");
//! assert_eq!(mt.charset().as_deref(), Some("UTF-8"));
//!
//! let mut mt = MediaTypeHeaderValue::new("application/json").unwrap();
//! mt.set_charset(Some("utf-8")).unwrap();
//! assert_eq!(mt.to_string(), "application/json; charset=utf-8");
//! ```

use core::fmt;

use crate::error::HeaderError;
use crate::grammar;
use crate::name_value::{
    NameValueHeaderValue, find_parameter, parameters_equal, scan_parameters, set_parameter,
    write_parameters,
};
use crate::parser::parse_exact;
use crate::quality::{check_quality, format_quality, parse_quality};

/// メディアタイプ
#[derive(Debug, Clone)]
pub struct MediaTypeHeaderValue {
    media_type: String,
    parameters: Vec<NameValueHeaderValue>,
}

impl MediaTypeHeaderValue {
    /// `type/subtype` からメディアタイプを作成
    pub fn new(media_type: &str) -> Result<Self, HeaderError> {
        check_media_type(media_type)?;
        Ok(MediaTypeHeaderValue {
            media_type: media_type.to_string(),
            parameters: Vec::new(),
        })
    }

    /// メディアタイプを 1 つパース
    pub fn parse(input: &str) -> Result<Self, HeaderError> {
        parse_exact("media-type", input, scan_media_type)
    }

    /// `type/subtype` を取得
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// `type/subtype` を設定
    pub fn set_media_type(&mut self, media_type: &str) -> Result<(), HeaderError> {
        check_media_type(media_type)?;
        self.media_type = media_type.to_string();
        Ok(())
    }

    /// パラメータを取得
    pub fn parameters(&self) -> &[NameValueHeaderValue] {
        &self.parameters
    }

    /// パラメータを可変参照で取得
    pub fn parameters_mut(&mut self) -> &mut Vec<NameValueHeaderValue> {
        &mut self.parameters
    }

    /// パラメータを名前で取得 (値は引用符を含む)
    pub fn parameter(&self, name: &str) -> Option<&str> {
        find_parameter(&self.parameters, name).and_then(|p| p.value())
    }

    /// パラメータを設定 (None で削除)
    pub fn set_parameter(&mut self, name: &str, value: Option<&str>) -> Result<(), HeaderError> {
        set_parameter(&mut self.parameters, name, value)
    }

    /// `charset` パラメータを取得 (引用符は外す)
    pub fn charset(&self) -> Option<String> {
        self.parameter("charset").map(grammar::unquote)
    }

    /// `charset` パラメータを設定 (None で削除)
    pub fn set_charset(&mut self, charset: Option<&str>) -> Result<(), HeaderError> {
        self.set_parameter("charset", charset)
    }
}

impl PartialEq for MediaTypeHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        self.media_type.eq_ignore_ascii_case(&other.media_type)
            && parameters_equal(&self.parameters, &other.parameters)
    }
}

impl fmt::Display for MediaTypeHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.media_type)?;
        write_parameters(f, &self.parameters)
    }
}

/// 品質値付きメディアタイプ
///
/// 品質値は `q` パラメータから導出する。
#[derive(Debug, Clone, PartialEq)]
pub struct MediaTypeWithQualityHeaderValue {
    inner: MediaTypeHeaderValue,
}

impl MediaTypeWithQualityHeaderValue {
    /// 品質値なしで作成
    pub fn new(media_type: &str) -> Result<Self, HeaderError> {
        Ok(MediaTypeWithQualityHeaderValue {
            inner: MediaTypeHeaderValue::new(media_type)?,
        })
    }

    /// 品質値付きで作成
    pub fn with_quality(media_type: &str, quality: f64) -> Result<Self, HeaderError> {
        let mut value = MediaTypeWithQualityHeaderValue::new(media_type)?;
        value.set_quality(Some(quality))?;
        Ok(value)
    }

    /// 値を 1 つパース
    pub fn parse(input: &str) -> Result<Self, HeaderError> {
        parse_exact("media-type", input, scan_media_type_with_quality)
    }

    /// メディアタイプ部分を取得
    pub fn inner(&self) -> &MediaTypeHeaderValue {
        &self.inner
    }

    /// メディアタイプ部分を可変参照で取得
    pub fn inner_mut(&mut self) -> &mut MediaTypeHeaderValue {
        &mut self.inner
    }

    /// `type/subtype` を取得
    pub fn media_type(&self) -> &str {
        self.inner.media_type()
    }

    /// 品質値を取得
    ///
    /// `q` パラメータがない、または不正な場合は None。
    pub fn quality(&self) -> Option<f64> {
        self.inner.parameter("q").and_then(parse_quality)
    }

    /// 品質値を設定 (None で削除)
    pub fn set_quality(&mut self, quality: Option<f64>) -> Result<(), HeaderError> {
        match quality {
            Some(q) => {
                check_quality(q)?;
                self.inner.set_parameter("q", Some(&format_quality(q)))
            }
            None => self.inner.set_parameter("q", None),
        }
    }
}

impl fmt::Display for MediaTypeWithQualityHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

/// メディアタイプの長さを取得 (後続の空白を含む)
pub(crate) fn scan_media_type(input: &str, start: usize) -> Option<(usize, MediaTypeHeaderValue)> {
    let bytes = input.as_bytes();
    let (length, media_type) = scan_type_subtype(input, start)?;
    let mut current = start + length;

    let mut parameters = Vec::new();
    if current < bytes.len() && bytes[current] == b';' {
        let (params_length, params) = scan_parameters(input, current + 1, b';')?;
        parameters = params;
        current += 1 + params_length;
    }

    Some((
        current - start,
        MediaTypeHeaderValue {
            media_type,
            parameters,
        },
    ))
}

pub(crate) fn scan_media_type_with_quality(
    input: &str,
    start: usize,
) -> Option<(usize, MediaTypeWithQualityHeaderValue)> {
    let (length, inner) = scan_media_type(input, start)?;
    Some((length, MediaTypeWithQualityHeaderValue { inner }))
}

/// `type / subtype` をスキャンし、空白を除いた `type/subtype` を返す
fn scan_type_subtype(input: &str, start: usize) -> Option<(usize, String)> {
    let bytes = input.as_bytes();

    let type_length = grammar::scan_token(input, start);
    if type_length == 0 {
        return None;
    }
    let mut current = grammar::skip_whitespace(input, start + type_length);

    if current >= bytes.len() || bytes[current] != b'/' {
        return None;
    }
    current = grammar::skip_whitespace(input, current + 1);

    let subtype_length = grammar::scan_token(input, current);
    if subtype_length == 0 {
        return None;
    }

    let media_type = format!(
        "{}/{}",
        &input[start..start + type_length],
        &input[current..current + subtype_length]
    );
    current = grammar::skip_whitespace(input, current + subtype_length);

    Some((current - start, media_type))
}

fn check_media_type(media_type: &str) -> Result<(), HeaderError> {
    if media_type.is_empty() {
        return Err(HeaderError::MissingValue);
    }
    match media_type.split_once('/') {
        Some((t, s)) if grammar::is_valid_token(t) && grammar::is_valid_token(s) => Ok(()),
        _ => Err(HeaderError::InvalidValue(media_type.to_string())),
    }
}
