//! ヘッダーパーサーの登録
//!
//! ## 概要
//!
//! [`HeaderRegistry`] はストアごとの不変な設定です。
//!
//! - 既知のヘッダー名と [`HeaderParser`] の対応
//! - このストアで扱えないヘッダー名 (例: リクエストヘッダーのストアに対する `Server`)
//!
//! 既知ヘッダーの表から、用途ごとのプリセットを作成できます。
//! ストアには `Arc<HeaderRegistry>` として渡し、複数のストアで共有します。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::parser::HeaderParser;
//! use shiguredo_http_headers::registry::{HeaderCategory, HeaderRegistry};
//!
//! let registry = HeaderRegistry::request();
//! assert_eq!(registry.label(), "request");
//! assert_eq!(registry.parser_for("accept"), Some(HeaderParser::MediaTypeWithQuality));
//! assert!(registry.is_disallowed_name("Server"));
//! assert_eq!(HeaderRegistry::category_of("Server"), Some(HeaderCategory::Response));
//!
//! let registry = HeaderRegistry::custom_only()
//!     .with_parser("X-Flags", HeaderParser::Token)
//!     .unwrap();
//! assert_eq!(registry.parser_for("x-flags"), Some(HeaderParser::Token));
//! ```

use indexmap::{IndexMap, IndexSet};

use crate::error::HeaderError;
use crate::name::HeaderName;
use crate::parser::HeaderParser;

/// 既知ヘッダーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderCategory {
    /// リクエストとレスポンスの両方で使うヘッダー
    General,
    /// リクエストヘッダー
    Request,
    /// レスポンスヘッダー
    Response,
    /// コンテンツ (表現) ヘッダー
    Content,
}

pub const ACCEPT: &str = "Accept";
pub const ACCEPT_CHARSET: &str = "Accept-Charset";
pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
pub const ACCEPT_LANGUAGE: &str = "Accept-Language";
pub const ACCEPT_RANGES: &str = "Accept-Ranges";
pub const AGE: &str = "Age";
pub const ALLOW: &str = "Allow";
pub const CACHE_CONTROL: &str = "Cache-Control";
pub const CONNECTION: &str = "Connection";
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
pub const CONTENT_ENCODING: &str = "Content-Encoding";
pub const CONTENT_LANGUAGE: &str = "Content-Language";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_MD5: &str = "Content-MD5";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const DATE: &str = "Date";
pub const EXPIRES: &str = "Expires";
pub const IF_MODIFIED_SINCE: &str = "If-Modified-Since";
pub const IF_UNMODIFIED_SINCE: &str = "If-Unmodified-Since";
pub const LAST_MODIFIED: &str = "Last-Modified";
pub const MAX_FORWARDS: &str = "Max-Forwards";
pub const PRAGMA: &str = "Pragma";
pub const SERVER: &str = "Server";
pub const TE: &str = "TE";
pub const TRAILER: &str = "Trailer";
pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";
pub const USER_AGENT: &str = "User-Agent";
pub const VARY: &str = "Vary";
pub const VIA: &str = "Via";
pub const WARNING: &str = "Warning";

/// 既知ヘッダーの表
const KNOWN_HEADERS: &[(&str, HeaderParser, HeaderCategory)] = &[
    // General
    (CACHE_CONTROL, HeaderParser::CacheControl, HeaderCategory::General),
    (CONNECTION, HeaderParser::Token, HeaderCategory::General),
    (DATE, HeaderParser::Date, HeaderCategory::General),
    (PRAGMA, HeaderParser::NameValue, HeaderCategory::General),
    (TRAILER, HeaderParser::Token, HeaderCategory::General),
    (TRANSFER_ENCODING, HeaderParser::TransferCoding, HeaderCategory::General),
    (VIA, HeaderParser::Via, HeaderCategory::General),
    (WARNING, HeaderParser::Warning, HeaderCategory::General),
    // Request
    (ACCEPT, HeaderParser::MediaTypeWithQuality, HeaderCategory::Request),
    (ACCEPT_CHARSET, HeaderParser::StringWithQuality, HeaderCategory::Request),
    (ACCEPT_ENCODING, HeaderParser::StringWithQuality, HeaderCategory::Request),
    (ACCEPT_LANGUAGE, HeaderParser::StringWithQuality, HeaderCategory::Request),
    (IF_MODIFIED_SINCE, HeaderParser::Date, HeaderCategory::Request),
    (IF_UNMODIFIED_SINCE, HeaderParser::Date, HeaderCategory::Request),
    (MAX_FORWARDS, HeaderParser::Int64, HeaderCategory::Request),
    (TE, HeaderParser::TransferCoding, HeaderCategory::Request),
    (USER_AGENT, HeaderParser::ProductInfo, HeaderCategory::Request),
    // Response
    (ACCEPT_RANGES, HeaderParser::Token, HeaderCategory::Response),
    (AGE, HeaderParser::Int64, HeaderCategory::Response),
    (SERVER, HeaderParser::ProductInfo, HeaderCategory::Response),
    (VARY, HeaderParser::Token, HeaderCategory::Response),
    // Content
    (ALLOW, HeaderParser::Token, HeaderCategory::Content),
    (CONTENT_DISPOSITION, HeaderParser::ContentDisposition, HeaderCategory::Content),
    (CONTENT_ENCODING, HeaderParser::Token, HeaderCategory::Content),
    (CONTENT_LANGUAGE, HeaderParser::Token, HeaderCategory::Content),
    (CONTENT_LENGTH, HeaderParser::Int64, HeaderCategory::Content),
    (CONTENT_MD5, HeaderParser::ByteArray, HeaderCategory::Content),
    (CONTENT_TYPE, HeaderParser::MediaType, HeaderCategory::Content),
    (EXPIRES, HeaderParser::Date, HeaderCategory::Content),
    (LAST_MODIFIED, HeaderParser::Date, HeaderCategory::Content),
];

/// ヘッダーパーサーの登録
#[derive(Debug, Clone)]
pub struct HeaderRegistry {
    label: &'static str,
    parsers: IndexMap<HeaderName, HeaderParser>,
    disallowed: IndexSet<HeaderName>,
}

impl HeaderRegistry {
    /// 何も登録されていない設定を作成
    pub fn new(label: &'static str) -> Self {
        HeaderRegistry {
            label,
            parsers: IndexMap::new(),
            disallowed: IndexSet::new(),
        }
    }

    /// すべての既知ヘッダーを登録し、何も禁止しない
    pub fn standard() -> Self {
        Self::from_categories(
            "standard",
            &[
                HeaderCategory::General,
                HeaderCategory::Request,
                HeaderCategory::Response,
                HeaderCategory::Content,
            ],
        )
    }

    /// リクエストヘッダー用 (レスポンスとコンテンツのヘッダーは禁止)
    pub fn request() -> Self {
        Self::from_categories(
            "request",
            &[HeaderCategory::General, HeaderCategory::Request],
        )
    }

    /// レスポンスヘッダー用 (リクエストとコンテンツのヘッダーは禁止)
    pub fn response() -> Self {
        Self::from_categories(
            "response",
            &[HeaderCategory::General, HeaderCategory::Response],
        )
    }

    /// コンテンツヘッダー用 (それ以外の既知ヘッダーは禁止)
    pub fn content() -> Self {
        Self::from_categories("content", &[HeaderCategory::Content])
    }

    /// パーサーを登録しない (すべてカスタムヘッダーとして扱う)
    pub fn custom_only() -> Self {
        Self::new("custom")
    }

    fn from_categories(label: &'static str, allowed: &[HeaderCategory]) -> Self {
        let mut registry = Self::new(label);
        for &(name, parser, category) in KNOWN_HEADERS {
            let name = HeaderName::from_static(name);
            if allowed.contains(&category) {
                registry.parsers.insert(name, parser);
            } else {
                registry.disallowed.insert(name);
            }
        }
        registry
    }

    /// パーサーを登録 (既存の登録を置き換える)
    pub fn with_parser(mut self, name: &str, parser: HeaderParser) -> Result<Self, HeaderError> {
        let name = HeaderName::new(name)?;
        self.disallowed.shift_remove(&name);
        self.parsers.insert(name, parser);
        Ok(self)
    }

    /// ヘッダー名を禁止する
    pub fn with_disallowed(mut self, name: &str) -> Result<Self, HeaderError> {
        let name = HeaderName::new(name)?;
        self.parsers.shift_remove(&name);
        self.disallowed.insert(name);
        Ok(self)
    }

    /// ラベル (エラーメッセージに使う)
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// ヘッダー名に対応するパーサー
    pub fn parser(&self, name: &HeaderName) -> Option<HeaderParser> {
        self.parsers.get(name).copied()
    }

    /// 文字列のヘッダー名に対応するパーサー
    pub fn parser_for(&self, name: &str) -> Option<HeaderParser> {
        HeaderName::new(name).ok().and_then(|name| self.parser(&name))
    }

    /// 禁止されたヘッダー名か
    pub fn is_disallowed(&self, name: &HeaderName) -> bool {
        self.disallowed.contains(name)
    }

    /// 文字列のヘッダー名が禁止されているか
    pub fn is_disallowed_name(&self, name: &str) -> bool {
        HeaderName::new(name).is_ok_and(|name| self.is_disallowed(&name))
    }

    /// 登録されているヘッダー名
    pub fn known_names(&self) -> impl Iterator<Item = &HeaderName> {
        self.parsers.keys()
    }

    /// 既知ヘッダーの分類
    pub fn category_of(name: &str) -> Option<HeaderCategory> {
        KNOWN_HEADERS
            .iter()
            .find(|(known, _, _)| known.eq_ignore_ascii_case(name))
            .map(|&(_, _, category)| category)
    }
}

impl Default for HeaderRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
