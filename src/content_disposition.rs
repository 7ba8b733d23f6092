//! Content-Disposition ヘッダー値 (RFC 6266)
//!
//! ## 概要
//!
//! ディスポジションタイプとパラメータ列を保持します。
//! `name`、`filename`、`filename*`、各種日付、`size` はすべてパラメータ列から
//! 導出するアクセサで、パラメータ列が唯一の正です。
//!
//! - `filename*` は RFC 5987 の `charset'lang'pct-encoded` をデコードする
//!   (UTF-8 / ISO-8859-1 / US-ASCII)
//! - `filename` / `name` は MIME encoded-word (`=?utf-8?B?...?=`) をデコードする
//! - `filename*0`、`filename*1` のような継続パラメータは結合せず、そのまま保持する
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::content_disposition::ContentDispositionHeaderValue;
//!
//! let cd = ContentDispositionHeaderValue::parse(
//!     "attachment; filename*=UTF-8''%E6%97%A5%E6%9C%AC.txt",
//! )
//! .unwrap();
//! assert_eq!(cd.disposition_type(), "attachment");
//! assert_eq!(cd.file_name_star().as_deref(), Some("日本.txt"));
//!
//! let mut cd = ContentDispositionHeaderValue::new("form-data").unwrap();
//! cd.set_name(Some("field")).unwrap();
//! cd.set_file_name(Some("my file.txt")).unwrap();
//! assert_eq!(cd.to_string(), "form-data; name=field; filename=\"my file.txt\"");
//! ```

use core::fmt;

use crate::byte_array::{base64_decode, base64_encode};
use crate::date::HttpDate;
use crate::error::HeaderError;
use crate::grammar;
use crate::name_value::{
    NameValueHeaderValue, check_token, find_parameter, parameters_equal, scan_parameters,
    set_parameter, write_parameters,
};
use crate::parser::parse_exact;

const NAME: &str = "name";
const FILE_NAME: &str = "filename";
const FILE_NAME_STAR: &str = "filename*";
const CREATION_DATE: &str = "creation-date";
const MODIFICATION_DATE: &str = "modification-date";
const READ_DATE: &str = "read-date";
const SIZE: &str = "size";

/// Content-Disposition ヘッダー値
#[derive(Debug, Clone)]
pub struct ContentDispositionHeaderValue {
    disposition_type: String,
    parameters: Vec<NameValueHeaderValue>,
}

impl ContentDispositionHeaderValue {
    /// ディスポジションタイプを指定して作成
    pub fn new(disposition_type: &str) -> Result<Self, HeaderError> {
        check_token(disposition_type)?;
        Ok(ContentDispositionHeaderValue {
            disposition_type: disposition_type.to_string(),
            parameters: Vec::new(),
        })
    }

    /// 値を 1 つパース
    pub fn parse(input: &str) -> Result<Self, HeaderError> {
        parse_exact("content-disposition", input, scan_content_disposition)
    }

    /// ディスポジションタイプを取得
    pub fn disposition_type(&self) -> &str {
        &self.disposition_type
    }

    /// ディスポジションタイプを設定
    pub fn set_disposition_type(&mut self, disposition_type: &str) -> Result<(), HeaderError> {
        check_token(disposition_type)?;
        self.disposition_type = disposition_type.to_string();
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

    /// `name` パラメータを取得
    pub fn name(&self) -> Option<String> {
        self.get_name(NAME)
    }

    /// `name` パラメータを設定 (None で削除)
    pub fn set_name(&mut self, value: Option<&str>) -> Result<(), HeaderError> {
        self.set_name_parameter(NAME, value)
    }

    /// `filename` パラメータを取得
    pub fn file_name(&self) -> Option<String> {
        self.get_name(FILE_NAME)
    }

    /// `filename` パラメータを設定 (None で削除)
    pub fn set_file_name(&mut self, value: Option<&str>) -> Result<(), HeaderError> {
        self.set_name_parameter(FILE_NAME, value)
    }

    /// `filename*` パラメータを取得
    ///
    /// 未対応の文字コードやデコードに失敗した場合は None を返す。
    /// その場合もパラメータ自体は保持される。
    pub fn file_name_star(&self) -> Option<String> {
        self.get_name(FILE_NAME_STAR)
    }

    /// `filename*` パラメータを設定 (None で削除)
    ///
    /// `utf-8''` 形式でパーセントエンコードする。
    pub fn set_file_name_star(&mut self, value: Option<&str>) -> Result<(), HeaderError> {
        self.set_name_parameter(FILE_NAME_STAR, value)
    }

    /// `creation-date` パラメータを取得
    pub fn creation_date(&self) -> Option<HttpDate> {
        self.get_date(CREATION_DATE)
    }

    /// `creation-date` パラメータを設定 (None で削除)
    pub fn set_creation_date(&mut self, date: Option<&HttpDate>) -> Result<(), HeaderError> {
        self.set_date(CREATION_DATE, date)
    }

    /// `modification-date` パラメータを取得
    pub fn modification_date(&self) -> Option<HttpDate> {
        self.get_date(MODIFICATION_DATE)
    }

    /// `modification-date` パラメータを設定 (None で削除)
    pub fn set_modification_date(&mut self, date: Option<&HttpDate>) -> Result<(), HeaderError> {
        self.set_date(MODIFICATION_DATE, date)
    }

    /// `read-date` パラメータを取得
    pub fn read_date(&self) -> Option<HttpDate> {
        self.get_date(READ_DATE)
    }

    /// `read-date` パラメータを設定 (None で削除)
    pub fn set_read_date(&mut self, date: Option<&HttpDate>) -> Result<(), HeaderError> {
        self.set_date(READ_DATE, date)
    }

    /// `size` パラメータを取得
    pub fn size(&self) -> Option<u64> {
        let value = find_parameter(&self.parameters, SIZE)?.value()?;
        grammar::parse_non_negative(&grammar::unquote(value))
    }

    /// `size` パラメータを設定 (None で削除)
    pub fn set_size(&mut self, size: Option<u64>) -> Result<(), HeaderError> {
        let value = size.map(|s| s.to_string());
        set_parameter(&mut self.parameters, SIZE, value.as_deref())
    }

    fn get_name(&self, parameter: &str) -> Option<String> {
        let value = find_parameter(&self.parameters, parameter)?.value()?;

        if parameter.ends_with('*') {
            return decode_ext_value(&grammar::unquote(value));
        }

        match decode_mime(value) {
            Some(decoded) => Some(decoded),
            None => Some(grammar::unquote(value)),
        }
    }

    fn set_name_parameter(&mut self, parameter: &str, value: Option<&str>) -> Result<(), HeaderError> {
        let encoded = match value {
            None => None,
            Some(v) if parameter.ends_with('*') => Some(encode_ext_value(v)),
            Some(v) => Some(encode_and_quote_mime(v)),
        };
        set_parameter(&mut self.parameters, parameter, encoded.as_deref())
    }

    fn get_date(&self, parameter: &str) -> Option<HttpDate> {
        let value = find_parameter(&self.parameters, parameter)?.value()?;
        HttpDate::parse(&grammar::unquote(value)).ok()
    }

    fn set_date(&mut self, parameter: &str, date: Option<&HttpDate>) -> Result<(), HeaderError> {
        let value = date.map(|d| format!("\"{}\"", d));
        set_parameter(&mut self.parameters, parameter, value.as_deref())
    }
}

impl PartialEq for ContentDispositionHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        self.disposition_type
            .eq_ignore_ascii_case(&other.disposition_type)
            && parameters_equal(&self.parameters, &other.parameters)
    }
}

impl fmt::Display for ContentDispositionHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.disposition_type)?;
        write_parameters(f, &self.parameters)
    }
}

pub(crate) fn scan_content_disposition(
    input: &str,
    start: usize,
) -> Option<(usize, ContentDispositionHeaderValue)> {
    let bytes = input.as_bytes();

    let type_length = grammar::scan_token(input, start);
    if type_length == 0 {
        return None;
    }
    let disposition_type = input[start..start + type_length].to_string();
    let mut current = grammar::skip_whitespace(input, start + type_length);

    let mut parameters = Vec::new();
    if current < bytes.len() && bytes[current] == b';' {
        let (length, params) = scan_parameters(input, current + 1, b';')?;
        parameters = params;
        current += 1 + length;
    }

    Some((
        current - start,
        ContentDispositionHeaderValue {
            disposition_type,
            parameters,
        },
    ))
}

/// RFC 5987 ext-value をデコード
///
/// ```text
/// ext-value = charset "'" [ language ] "'" value-chars
/// ```
fn decode_ext_value(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;

    let bytes = percent_decode(encoded)?;
    decode_charset(charset, bytes)
}

/// MIME encoded-word (RFC 2047) をデコード
///
/// ```text
/// encoded-word = "=?" charset "?" encoding "?" encoded-text "?="
/// ```
fn decode_mime(value: &str) -> Option<String> {
    let value = if grammar::is_quoted_string(value) {
        &value[1..value.len() - 1]
    } else {
        value
    };

    let inner = value.strip_prefix("=?")?.strip_suffix("?=")?;
    let mut parts = inner.split('?');
    let charset = parts.next()?;
    let encoding = parts.next()?;
    let text = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let bytes = if encoding.eq_ignore_ascii_case("b") {
        base64_decode(text)?
    } else if encoding.eq_ignore_ascii_case("q") {
        q_decode(text)?
    } else {
        return None;
    };

    decode_charset(charset, bytes)
}

fn decode_charset(charset: &str, bytes: Vec<u8>) -> Option<String> {
    if charset.eq_ignore_ascii_case("utf-8") {
        String::from_utf8(bytes).ok()
    } else if charset.eq_ignore_ascii_case("iso-8859-1") {
        Some(bytes.into_iter().map(char::from).collect())
    } else if charset.eq_ignore_ascii_case("us-ascii") {
        if bytes.is_ascii() {
            String::from_utf8(bytes).ok()
        } else {
            None
        }
    } else {
        None
    }
}

/// パーセントデコード
fn percent_decode(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            result.push(hi << 4 | lo);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Some(result)
}

/// MIME Q エンコーディングのデコード (`_` は空白)
fn q_decode(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'=' => {
                let hi = hex_value(*bytes.get(i + 1)?)?;
                let lo = hex_value(*bytes.get(i + 2)?)?;
                result.push(hi << 4 | lo);
                i += 3;
            }
            b'_' => {
                result.push(b' ');
                i += 1;
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }

    Some(result)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// RFC 5987 ext-value 用にエンコード
fn encode_ext_value(s: &str) -> String {
    let mut result = String::from("utf-8''");
    for byte in s.bytes() {
        if is_attr_char(byte) {
            result.push(byte as char);
        } else {
            result.push_str(&format!("%{:02X}", byte));
        }
    }
    result
}

/// トークンならそのまま、そうでなければ引用符で囲む
///
/// ASCII 以外を含む場合は MIME encoded-word (B エンコーディング) にする。
/// 既に引用符付き文字列の場合はそのまま使う。
fn encode_and_quote_mime(value: &str) -> String {
    if grammar::is_quoted_string(value) {
        return value.to_string();
    }
    if !value.is_ascii() {
        return format!("\"=?utf-8?B?{}?=\"", base64_encode(value.as_bytes()));
    }
    if grammar::needs_quoting(value) {
        return grammar::quote(value);
    }
    value.to_string()
}

/// RFC 5987 attr-char
fn is_attr_char(b: u8) -> bool {
    matches!(b,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
        b'!' | b'#' | b'$' | b'&' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'|' | b'~'
    )
}
