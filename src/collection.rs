//! 型付きヘッダー値コレクション
//!
//! ## 概要
//!
//! [`HeaderValueCollection`] は 1 つのヘッダー名に束縛されたストアのビューです。
//! 値はストアが保持し、コレクションは型付きで追加、削除、列挙するだけです。
//!
//! 特別値 (`Transfer-Encoding` の `chunked`、`Connection` の `close` など) を
//! 指定すると、その値の有無を真偽値として扱えます。
//! 特別値は通常の値と区別しないため、2 回追加すると 2 つの値になります。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::store::HeaderStore;
//!
//! let mut headers = HeaderStore::default();
//! assert_eq!(headers.transfer_encoding_chunked(), None);
//!
//! headers.add("Transfer-Encoding", "gzip").unwrap();
//! headers.set_transfer_encoding_chunked(Some(true)).unwrap();
//! assert_eq!(headers.transfer_encoding_chunked(), Some(true));
//! assert_eq!(
//!     headers.header_string("Transfer-Encoding").as_deref(),
//!     Some("gzip, chunked")
//! );
//!
//! let mut connection = headers.connection();
//! connection.parse_add("keep-alive").unwrap();
//! assert_eq!(connection.values(), vec!["keep-alive".to_string()]);
//! ```

use crate::byte_array::ByteArrayHeaderValue;
use crate::cache_control::CacheControlHeaderValue;
use crate::content_disposition::ContentDispositionHeaderValue;
use crate::date::HttpDate;
use crate::error::HeaderError;
use crate::media_type::{MediaTypeHeaderValue, MediaTypeWithQualityHeaderValue};
use crate::name::HeaderName;
use crate::name_value::NameValueHeaderValue;
use crate::product_info::ProductInfoHeaderValue;
use crate::quality::StringWithQualityHeaderValue;
use crate::registry::{CACHE_CONTROL, CONNECTION, CONTENT_DISPOSITION, CONTENT_TYPE, TRANSFER_ENCODING};
use crate::store::{HeaderStore, ParsedValues};
use crate::transfer_coding::TransferCodingHeaderValue;
use crate::value::HeaderValue;
use crate::via::ViaHeaderValue;
use crate::warning::WarningHeaderValue;

/// コレクションで扱える値の型
pub trait TypedHeaderValue: Clone {
    /// [`HeaderValue`] に変換
    fn into_header_value(self) -> HeaderValue;

    /// [`HeaderValue`] から参照を取り出す (種類が異なる場合は None)
    fn from_header_value(value: &HeaderValue) -> Option<&Self>;

    /// 値がない扱いか
    fn is_empty_value(&self) -> bool {
        false
    }
}

/// トークンとして扱う
impl TypedHeaderValue for String {
    fn into_header_value(self) -> HeaderValue {
        HeaderValue::Token(self)
    }

    fn from_header_value(value: &HeaderValue) -> Option<&Self> {
        match value {
            HeaderValue::Token(v) => Some(v),
            _ => None,
        }
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

macro_rules! impl_typed_header_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl TypedHeaderValue for $ty {
                fn into_header_value(self) -> HeaderValue {
                    HeaderValue::$variant(self)
                }

                fn from_header_value(value: &HeaderValue) -> Option<&Self> {
                    match value {
                        HeaderValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_typed_header_value! {
    TransferCodingHeaderValue => TransferCoding,
    MediaTypeHeaderValue => MediaType,
    MediaTypeWithQualityHeaderValue => MediaTypeWithQuality,
    StringWithQualityHeaderValue => StringWithQuality,
    NameValueHeaderValue => NameValue,
    ContentDispositionHeaderValue => ContentDisposition,
    CacheControlHeaderValue => CacheControl,
    ViaHeaderValue => Via,
    WarningHeaderValue => Warning,
    ProductInfoHeaderValue => ProductInfo,
    HttpDate => Date,
}

impl TypedHeaderValue for ByteArrayHeaderValue {
    fn into_header_value(self) -> HeaderValue {
        HeaderValue::ByteArray(self)
    }

    fn from_header_value(value: &HeaderValue) -> Option<&Self> {
        match value {
            HeaderValue::ByteArray(v) => Some(v),
            _ => None,
        }
    }

    fn is_empty_value(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// 1 つのヘッダーに束縛された型付きコレクション
#[derive(Debug)]
pub struct HeaderValueCollection<'a, T: TypedHeaderValue> {
    store: &'a mut HeaderStore,
    name: HeaderName,
    special_value: Option<T>,
}

impl<'a, T: TypedHeaderValue> HeaderValueCollection<'a, T> {
    /// コレクションを作成
    pub fn new(store: &'a mut HeaderStore, name: &str) -> Result<Self, HeaderError> {
        Ok(HeaderValueCollection {
            store,
            name: HeaderName::new(name)?,
            special_value: None,
        })
    }

    /// 特別値を指定
    pub fn with_special_value(mut self, value: T) -> Self {
        self.special_value = Some(value);
        self
    }

    /// 束縛しているヘッダー名
    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    /// パース済み値の数 (特別値も 1 つの値として数える)
    pub fn count(&mut self) -> usize {
        self.store.parsed_value_count(self.name.as_str())
    }

    /// 値を追加
    pub fn add(&mut self, value: T) -> Result<(), HeaderError> {
        if value.is_empty_value() {
            return Err(HeaderError::MissingValue);
        }
        self.store
            .add_parsed_value(self.name.as_str(), value.into_header_value())
    }

    /// 文字列をヘッダーのパーサーでパースして追加
    pub fn parse_add(&mut self, input: &str) -> Result<(), HeaderError> {
        self.store.add(self.name.as_str(), input)
    }

    /// 文字列をパースして追加 (失敗してもエラーを返さない)
    pub fn try_parse_add(&mut self, input: &str) -> bool {
        self.store.try_add(self.name.as_str(), input)
    }

    /// 最初に一致した値を削除
    pub fn remove(&mut self, value: &T) -> Result<bool, HeaderError> {
        self.store
            .remove_parsed_value(self.name.as_str(), &value.clone().into_header_value())
    }

    /// 値を含むか
    pub fn contains(&mut self, value: &T) -> bool {
        self.store
            .contains_parsed_value(self.name.as_str(), &value.clone().into_header_value())
    }

    /// ヘッダーを削除
    pub fn clear(&mut self) -> Result<(), HeaderError> {
        self.store.remove(self.name.as_str())?;
        Ok(())
    }

    /// パース済み値を列挙
    pub fn values(&mut self) -> Vec<T> {
        self.store
            .get_parsed_values(self.name.as_str())
            .map(ParsedValues::into_vec)
            .unwrap_or_default()
            .iter()
            .filter_map(T::from_header_value)
            .cloned()
            .collect()
    }

    /// 特別値が含まれるか
    pub fn is_special_value_set(&mut self) -> bool {
        match self.special_value.clone() {
            Some(special) => self.contains(&special),
            None => false,
        }
    }

    /// 特別値を追加 (既に含まれる場合は何もしない)
    pub fn set_special_value(&mut self) -> Result<(), HeaderError> {
        let Some(special) = self.special_value.clone() else {
            return Ok(());
        };
        if self.contains(&special) {
            return Ok(());
        }
        self.add(special)
    }

    /// 最初の特別値を削除
    pub fn remove_special_value(&mut self) -> Result<bool, HeaderError> {
        match self.special_value.clone() {
            Some(special) => self.remove(&special),
            None => Ok(false),
        }
    }

    /// 特別値の状態
    ///
    /// ストアに一度も値が追加されていない場合のみ None。
    pub fn special_value_state(&mut self) -> Option<bool> {
        if !self.store.is_initialized() {
            return None;
        }
        Some(self.is_special_value_set())
    }
}

impl HeaderStore {
    /// `Transfer-Encoding` のコレクション (特別値は `chunked`)
    pub fn transfer_encoding(&mut self) -> HeaderValueCollection<'_, TransferCodingHeaderValue> {
        HeaderValueCollection {
            store: self,
            name: HeaderName::from_static(TRANSFER_ENCODING),
            special_value: Some(TransferCodingHeaderValue::chunked()),
        }
    }

    /// `Connection` のコレクション (特別値は `close`)
    pub fn connection(&mut self) -> HeaderValueCollection<'_, String> {
        HeaderValueCollection {
            store: self,
            name: HeaderName::from_static(CONNECTION),
            special_value: Some("close".to_string()),
        }
    }

    /// `Transfer-Encoding: chunked` の状態
    pub fn transfer_encoding_chunked(&mut self) -> Option<bool> {
        self.transfer_encoding().special_value_state()
    }

    /// `Transfer-Encoding: chunked` を設定
    ///
    /// `Some(true)` で追加し、それ以外は最初の `chunked` を削除する。
    pub fn set_transfer_encoding_chunked(&mut self, value: Option<bool>) -> Result<(), HeaderError> {
        let mut collection = self.transfer_encoding();
        if value == Some(true) {
            collection.set_special_value()
        } else {
            collection.remove_special_value().map(|_| ())
        }
    }

    /// `Connection: close` の状態
    pub fn connection_close(&mut self) -> Option<bool> {
        self.connection().special_value_state()
    }

    /// `Connection: close` を設定
    ///
    /// `Some(true)` で追加し、それ以外は最初の `close` を削除する。
    pub fn set_connection_close(&mut self, value: Option<bool>) -> Result<(), HeaderError> {
        let mut collection = self.connection();
        if value == Some(true) {
            collection.set_special_value()
        } else {
            collection.remove_special_value().map(|_| ())
        }
    }

    /// `Cache-Control` を取得
    pub fn cache_control(&mut self) -> Option<CacheControlHeaderValue> {
        self.first_parsed(CACHE_CONTROL)
    }

    /// `Cache-Control` を設定 (None で削除)
    pub fn set_cache_control(
        &mut self,
        value: Option<CacheControlHeaderValue>,
    ) -> Result<(), HeaderError> {
        self.set_typed(CACHE_CONTROL, value)
    }

    /// `Content-Type` を取得
    pub fn content_type(&mut self) -> Option<MediaTypeHeaderValue> {
        self.first_parsed(CONTENT_TYPE)
    }

    /// `Content-Type` を設定 (None で削除)
    pub fn set_content_type(&mut self, value: Option<MediaTypeHeaderValue>) -> Result<(), HeaderError> {
        self.set_typed(CONTENT_TYPE, value)
    }

    /// `Content-Disposition` を取得
    pub fn content_disposition(&mut self) -> Option<ContentDispositionHeaderValue> {
        self.first_parsed(CONTENT_DISPOSITION)
    }

    /// `Content-Disposition` を設定 (None で削除)
    pub fn set_content_disposition(
        &mut self,
        value: Option<ContentDispositionHeaderValue>,
    ) -> Result<(), HeaderError> {
        self.set_typed(CONTENT_DISPOSITION, value)
    }

    fn first_parsed<T: TypedHeaderValue>(&mut self, name: &str) -> Option<T> {
        let values = self.get_parsed_values(name)?.into_vec();
        values.first().and_then(T::from_header_value).cloned()
    }

    fn set_typed<T: TypedHeaderValue>(&mut self, name: &str, value: Option<T>) -> Result<(), HeaderError> {
        match value {
            Some(value) => self.set_parsed_value(name, value.into_header_value()),
            None => self.remove(name).map(|_| ()),
        }
    }
}
