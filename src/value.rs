//! パース済みヘッダー値
//!
//! ## 概要
//!
//! [`HeaderValue`] はストアが保持するすべてのパース済み値を表す列挙型です。
//! 登録されていない (カスタム) ヘッダーの値は [`HeaderValue::Text`] として保持します。
//! `Clone` は値の完全な複製です。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::value::HeaderValue;
//! use shiguredo_http_headers::transfer_coding::TransferCodingHeaderValue;
//!
//! let v = HeaderValue::from(TransferCodingHeaderValue::chunked());
//! assert_eq!(v.to_string(), "chunked");
//! assert_eq!(HeaderValue::Int64(42).to_string(), "42");
//! ```

use core::fmt;

use crate::byte_array::ByteArrayHeaderValue;
use crate::cache_control::CacheControlHeaderValue;
use crate::content_disposition::ContentDispositionHeaderValue;
use crate::date::HttpDate;
use crate::media_type::{MediaTypeHeaderValue, MediaTypeWithQualityHeaderValue};
use crate::name_value::NameValueHeaderValue;
use crate::product_info::ProductInfoHeaderValue;
use crate::quality::StringWithQualityHeaderValue;
use crate::transfer_coding::TransferCodingHeaderValue;
use crate::via::ViaHeaderValue;
use crate::warning::WarningHeaderValue;

/// パース済みヘッダー値
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    /// トークン (`Connection`、`Vary` など)
    Token(String),
    /// カスタムヘッダーの文字列 (空文字列も有効)
    Text(String),
    /// 転送コーディング
    TransferCoding(TransferCodingHeaderValue),
    /// メディアタイプ
    MediaType(MediaTypeHeaderValue),
    /// 品質値付きメディアタイプ
    MediaTypeWithQuality(MediaTypeWithQualityHeaderValue),
    /// 品質値付き文字列
    StringWithQuality(StringWithQualityHeaderValue),
    /// 名前/値ペア
    NameValue(NameValueHeaderValue),
    /// Content-Disposition
    ContentDisposition(ContentDispositionHeaderValue),
    /// Cache-Control
    CacheControl(CacheControlHeaderValue),
    /// Via
    Via(ViaHeaderValue),
    /// Warning
    Warning(WarningHeaderValue),
    /// Base64 バイト列
    ByteArray(ByteArrayHeaderValue),
    /// HTTP-date
    Date(HttpDate),
    /// 非負整数
    Int64(i64),
    /// 製品情報
    ProductInfo(ProductInfoHeaderValue),
}

impl HeaderValue {
    /// トークン値を文字列として取得
    pub fn as_token(&self) -> Option<&str> {
        match self {
            HeaderValue::Token(s) => Some(s),
            _ => None,
        }
    }

    /// カスタムヘッダーの文字列を取得
    pub fn as_text(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 出力が空文字列になる値かどうか
    ///
    /// カスタムヘッダーの空文字列は有効な値なので false を返す。
    pub fn is_empty_value(&self) -> bool {
        match self {
            HeaderValue::Token(v) => v.is_empty(),
            HeaderValue::CacheControl(v) => v.is_empty(),
            HeaderValue::ByteArray(v) => v.as_bytes().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Token(v) | HeaderValue::Text(v) => f.write_str(v),
            HeaderValue::TransferCoding(v) => fmt::Display::fmt(v, f),
            HeaderValue::MediaType(v) => fmt::Display::fmt(v, f),
            HeaderValue::MediaTypeWithQuality(v) => fmt::Display::fmt(v, f),
            HeaderValue::StringWithQuality(v) => fmt::Display::fmt(v, f),
            HeaderValue::NameValue(v) => fmt::Display::fmt(v, f),
            HeaderValue::ContentDisposition(v) => fmt::Display::fmt(v, f),
            HeaderValue::CacheControl(v) => fmt::Display::fmt(v, f),
            HeaderValue::Via(v) => fmt::Display::fmt(v, f),
            HeaderValue::Warning(v) => fmt::Display::fmt(v, f),
            HeaderValue::ByteArray(v) => fmt::Display::fmt(v, f),
            HeaderValue::Date(v) => fmt::Display::fmt(v, f),
            HeaderValue::Int64(v) => write!(f, "{}", v),
            HeaderValue::ProductInfo(v) => fmt::Display::fmt(v, f),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for HeaderValue {
                fn from(value: $ty) -> Self {
                    HeaderValue::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    TransferCodingHeaderValue => TransferCoding,
    MediaTypeHeaderValue => MediaType,
    MediaTypeWithQualityHeaderValue => MediaTypeWithQuality,
    StringWithQualityHeaderValue => StringWithQuality,
    NameValueHeaderValue => NameValue,
    ContentDispositionHeaderValue => ContentDisposition,
    CacheControlHeaderValue => CacheControl,
    ViaHeaderValue => Via,
    WarningHeaderValue => Warning,
    ByteArrayHeaderValue => ByteArray,
    HttpDate => Date,
    i64 => Int64,
    ProductInfoHeaderValue => ProductInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(HeaderValue::Token("close".to_string()).to_string(), "close");
        assert_eq!(HeaderValue::Text(String::new()).to_string(), "");
        assert_eq!(
            HeaderValue::from(ByteArrayHeaderValue::new(vec![1])).to_string(),
            "AQ=="
        );
        let date = HttpDate::parse("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(
            HeaderValue::from(date).to_string(),
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
    }

    #[test]
    fn test_clone_is_deep() {
        let mut cc = CacheControlHeaderValue::new();
        cc.set_max_age(Some(10));
        let original = HeaderValue::from(cc);
        let mut copy = original.clone();
        if let HeaderValue::CacheControl(cc) = &mut copy {
            cc.set_max_age(Some(20));
        }
        assert_eq!(original.to_string(), "max-age=10");
        assert_eq!(copy.to_string(), "max-age=20");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(HeaderValue::Token("a".to_string()).as_token(), Some("a"));
        assert_eq!(HeaderValue::Token("a".to_string()).as_text(), None);
        assert_eq!(HeaderValue::Text("b".to_string()).as_text(), Some("b"));
    }
}
