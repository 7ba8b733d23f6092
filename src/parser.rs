//! ヘッダーパーサー
//!
//! ## 概要
//!
//! [`HeaderParser`] はヘッダーの種類ごとのパーサーを閉じた列挙型で表します。
//! 各パーサーは次の性質を持ちます。
//!
//! - 複数値をサポートするか (`supports_multiple_values`)
//! - 値の区切り文字 (`list_separator`、`ProductInfo` のみ空白、それ以外はカンマ)
//! - 値の比較方法 (`comparer`、None の場合は `PartialEq`)
//!
//! [`HeaderParser::try_parse_value`] は位置 `index` から値を 1 つ読み、
//! 区切りを含めた次の位置を返します。失敗した場合は None を返し、位置は進みません。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::parser::HeaderParser;
//!
//! let parser = HeaderParser::TransferCoding;
//! let input = "gzip, chunked";
//! let (next, value) = parser.try_parse_value(input, None, 0).unwrap();
//! assert_eq!(next, 6);
//! assert_eq!(value.unwrap().to_string(), "gzip");
//!
//! let values = parser.parse_value(input).unwrap();
//! assert_eq!(values.len(), 2);
//! assert!(HeaderParser::MediaType.parse_value("text/plain, text/html").is_err());
//! ```

use crate::byte_array::scan_byte_array;
use crate::cache_control::scan_cache_control;
use crate::content_disposition::scan_content_disposition;
use crate::date::HttpDate;
use crate::error::HeaderError;
use crate::grammar;
use crate::media_type::{scan_media_type, scan_media_type_with_quality};
use crate::name_value::scan_name_value;
use crate::product_info::scan_product_info;
use crate::quality::scan_string_with_quality;
use crate::transfer_coding::scan_transfer_coding;
use crate::value::HeaderValue;
use crate::via::scan_via;
use crate::warning::scan_warning;

/// パース済み値の比較関数
pub type Comparer = fn(&HeaderValue, &HeaderValue) -> bool;

/// ヘッダーパーサー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderParser {
    /// カンマ区切りのトークン (`Connection`、`Vary` など)
    Token,
    /// 転送コーディング (`Transfer-Encoding`、`TE`)
    TransferCoding,
    /// 単一のメディアタイプ (`Content-Type`)
    MediaType,
    /// 品質値付きメディアタイプ (`Accept`)
    MediaTypeWithQuality,
    /// 品質値付き文字列 (`Accept-Charset`、`Accept-Encoding`、`Accept-Language`)
    StringWithQuality,
    /// 名前/値ペア (`Pragma`)
    NameValue,
    /// 単一の Content-Disposition
    ContentDisposition,
    /// Cache-Control (複数の出現を 1 つの値に畳み込む)
    CacheControl,
    /// Via
    Via,
    /// Warning
    Warning,
    /// 単一の Base64 バイト列 (`Content-MD5`)
    ByteArray,
    /// 単一の HTTP-date (`Date`、`Expires` など)
    Date,
    /// 単一の非負整数 (`Content-Length`、`Age` など)
    Int64,
    /// 空白区切りの製品情報 (`User-Agent`、`Server`)
    ProductInfo,
}

impl HeaderParser {
    /// 複数値をサポートするか
    pub fn supports_multiple_values(&self) -> bool {
        !matches!(
            self,
            HeaderParser::MediaType
                | HeaderParser::ContentDisposition
                | HeaderParser::ByteArray
                | HeaderParser::Date
                | HeaderParser::Int64
        )
    }

    /// 値の区切り文字
    ///
    /// Via と Warning の値はカンマで区切る。空白は 1 つの値の中の要素
    /// (プロトコル、受信者、コメントなど) の区切りで、値どうしの区切りではない。
    pub fn list_separator(&self) -> char {
        match self {
            HeaderParser::ProductInfo => ' ',
            HeaderParser::Via | HeaderParser::Warning => ',',
            _ => ',',
        }
    }

    /// 値の比較関数
    ///
    /// None の場合は [`HeaderValue`] の `PartialEq` を使う。
    pub fn comparer(&self) -> Option<Comparer> {
        match self {
            HeaderParser::Token => Some(token_comparer),
            _ => None,
        }
    }

    /// 既存のパース済み値に畳み込むか
    ///
    /// true の場合、`try_parse_value` に渡した `store_value` の複製を更新した値を返す。
    pub fn folds_into_store_value(&self) -> bool {
        matches!(self, HeaderParser::CacheControl)
    }

    /// 2 つのパース済み値が等しいか
    pub fn values_equal(&self, a: &HeaderValue, b: &HeaderValue) -> bool {
        match self.comparer() {
            Some(comparer) => comparer(a, b),
            None => a == b,
        }
    }

    /// 値の種類がこのパーサーの出力と一致するか
    pub fn accepts(&self, value: &HeaderValue) -> bool {
        match (self, value) {
            (HeaderParser::Token, HeaderValue::Token(token)) => grammar::is_valid_token(token),
            (HeaderParser::TransferCoding, HeaderValue::TransferCoding(_))
            | (HeaderParser::MediaType, HeaderValue::MediaType(_))
            | (HeaderParser::MediaTypeWithQuality, HeaderValue::MediaTypeWithQuality(_))
            | (HeaderParser::StringWithQuality, HeaderValue::StringWithQuality(_))
            | (HeaderParser::NameValue, HeaderValue::NameValue(_))
            | (HeaderParser::ContentDisposition, HeaderValue::ContentDisposition(_))
            | (HeaderParser::CacheControl, HeaderValue::CacheControl(_))
            | (HeaderParser::Via, HeaderValue::Via(_))
            | (HeaderParser::Warning, HeaderValue::Warning(_))
            | (HeaderParser::ByteArray, HeaderValue::ByteArray(_))
            | (HeaderParser::Date, HeaderValue::Date(_))
            | (HeaderParser::ProductInfo, HeaderValue::ProductInfo(_)) => true,
            (HeaderParser::Int64, HeaderValue::Int64(n)) => *n >= 0,
            _ => false,
        }
    }

    /// 位置 `index` から値を 1 つパース
    ///
    /// 成功した場合は (区切りを含めた次の位置, 値) を返す。
    /// 複数値パーサーで空白と区切りしか残っていない場合、値は None になる。
    pub fn try_parse_value(
        &self,
        input: &str,
        store_value: Option<&HeaderValue>,
        index: usize,
    ) -> Option<(usize, Option<HeaderValue>)> {
        if index > input.len() {
            return None;
        }

        let multiple = self.supports_multiple_values();

        let (current, separator_found) = self.next_index(input, index);
        if separator_found && !multiple {
            return None;
        }
        if current >= input.len() {
            return multiple.then_some((current, None));
        }

        let (length, value) = self.scan(input, current, store_value)?;
        let end = current + length;

        if *self == HeaderParser::ProductInfo {
            // 後続の値とは空白で区切られていなければならない
            if end < input.len() && !grammar::is_ows(input.as_bytes()[end - 1]) {
                return None;
            }
            return Some((end, Some(value)));
        }

        let (next, separator_found) = self.next_index(input, end);
        if (separator_found && !multiple) || (!separator_found && next < input.len()) {
            return None;
        }

        Some((next, Some(value)))
    }

    /// 文字列全体を厳密にパース
    ///
    /// 複数値パーサーでは空文字列は値なしとして空の Vec を返す。
    /// 日付の場合は [`HeaderError::Date`] で失敗の理由を返す。
    pub fn parse_value(&self, input: &str) -> Result<Vec<HeaderValue>, HeaderError> {
        self.parse_values(input, None).ok_or_else(|| {
            self.date_error(input)
                .unwrap_or_else(|| HeaderError::InvalidValue(input.to_string()))
        })
    }

    /// 日付パーサーの失敗を [`HeaderError::Date`] に変換
    pub(crate) fn date_error(&self, input: &str) -> Option<HeaderError> {
        match self {
            HeaderParser::Date => HttpDate::parse(input).err().map(HeaderError::from),
            _ => None,
        }
    }

    /// 文字列全体をパースし、含まれるすべての値を返す
    pub(crate) fn parse_values(
        &self,
        input: &str,
        store_value: Option<&HeaderValue>,
    ) -> Option<Vec<HeaderValue>> {
        let mut values = Vec::new();
        let mut index = 0;

        loop {
            let (next, value) = self.try_parse_value(input, store_value, index)?;
            if let Some(value) = value {
                values.push(value);
            }
            if next >= input.len() {
                break;
            }
            if next <= index {
                return None;
            }
            index = next;
        }

        Some(values)
    }

    /// 空白と区切りをスキップする
    fn next_index(&self, input: &str, start: usize) -> (usize, bool) {
        match self {
            HeaderParser::ProductInfo => {
                let next = grammar::skip_whitespace(input, start);
                (next, false)
            }
            _ => grammar::next_value_index(input, start, self.supports_multiple_values()),
        }
    }

    fn scan(
        &self,
        input: &str,
        start: usize,
        store_value: Option<&HeaderValue>,
    ) -> Option<(usize, HeaderValue)> {
        match self {
            HeaderParser::Token => {
                let length = grammar::scan_token(input, start);
                if length == 0 {
                    return None;
                }
                Some((
                    length,
                    HeaderValue::Token(input[start..start + length].to_string()),
                ))
            }
            HeaderParser::TransferCoding => map(scan_transfer_coding(input, start)),
            HeaderParser::MediaType => map(scan_media_type(input, start)),
            HeaderParser::MediaTypeWithQuality => map(scan_media_type_with_quality(input, start)),
            HeaderParser::StringWithQuality => map(scan_string_with_quality(input, start)),
            HeaderParser::NameValue => map(scan_name_value(input, start)),
            HeaderParser::ContentDisposition => map(scan_content_disposition(input, start)),
            HeaderParser::CacheControl => {
                let store_value = match store_value {
                    Some(HeaderValue::CacheControl(cc)) => Some(cc),
                    _ => None,
                };
                map(scan_cache_control(input, start, store_value))
            }
            HeaderParser::Via => map(scan_via(input, start)),
            HeaderParser::Warning => map(scan_warning(input, start)),
            HeaderParser::ByteArray => map(scan_byte_array(input, start)),
            HeaderParser::Date => {
                let rest = &input[start..];
                let date = HttpDate::parse(rest).ok()?;
                Some((rest.len(), HeaderValue::Date(date)))
            }
            HeaderParser::Int64 => {
                let length = grammar::scan_number(input, start, false);
                if length == 0 {
                    return None;
                }
                let n = input[start..start + length].parse::<i64>().ok()?;
                Some((length, HeaderValue::Int64(n)))
            }
            HeaderParser::ProductInfo => map(scan_product_info(input, start)),
        }
    }
}

fn map<T: Into<HeaderValue>>(scanned: Option<(usize, T)>) -> Option<(usize, HeaderValue)> {
    scanned.map(|(length, value)| (length, value.into()))
}

fn token_comparer(a: &HeaderValue, b: &HeaderValue) -> bool {
    match (a, b) {
        (HeaderValue::Token(a), HeaderValue::Token(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// 値を 1 つだけ含む文字列をパースする
///
/// 前後の空白は許可する。値の後に別の値や区切りがある場合は失敗する。
pub(crate) fn parse_exact<T>(
    what: &str,
    input: &str,
    scan: impl Fn(&str, usize) -> Option<(usize, T)>,
) -> Result<T, HeaderError> {
    let start = grammar::skip_whitespace(input, 0);
    let error = || HeaderError::invalid_format(what, input);
    if start >= input.len() {
        return Err(error());
    }

    let (length, value) = scan(input, start).ok_or_else(error)?;
    if grammar::skip_whitespace(input, start + length) != input.len() {
        return Err(error());
    }

    Ok(value)
}
