//! # shiguredo_http_headers
//!
//! HTTP ヘッダー値のストアとパーサー
//!
//! ## 特徴
//!
//! - **遅延パース**: 検証なしで追加した値は最初の読み取り時に一度だけパースする
//! - **型付きの値**: Cache-Control、Content-Disposition、メディアタイプ、Via、Warning など
//! - **不正な値の保持**: パースできなかった値は破棄せずにそのまま出力する
//! - **ヘッダー分割の拒否**: 改行の直後が空白でない値は保持しない
//!
//! ## 使い方
//!
//! ### 受信したヘッダーを読む
//!
//! ```rust
//! use shiguredo_http_headers::{HeaderStore, HeaderValue, ParsedValues};
//!
//! let mut headers = HeaderStore::default();
//! headers.add_without_validation("Cache-Control", "no-cache, max-age=0").unwrap();
//! headers.add_without_validation("Via", "1.1 proxy.example.com").unwrap();
//! headers.add_without_validation("Via", "garbage").unwrap();
//!
//! let cc = headers.cache_control().unwrap();
//! assert!(cc.no_cache());
//! assert_eq!(cc.max_age(), Some(0));
//!
//! // パースできなかった値はそのまま残る
//! assert_eq!(
//!     headers.get_values("via").unwrap(),
//!     vec!["1.1 proxy.example.com", "garbage"]
//! );
//! assert!(matches!(
//!     headers.get_parsed_values("Via"),
//!     Some(ParsedValues::Single(HeaderValue::Via(_)))
//! ));
//! ```
//!
//! ### 送信するヘッダーを組み立てる
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use shiguredo_http_headers::{HeaderRegistry, HeaderStore, MediaTypeHeaderValue};
//!
//! let mut headers = HeaderStore::new(Arc::new(HeaderRegistry::response()));
//! let mut content_type = MediaTypeHeaderValue::new("text/html").unwrap();
//! content_type.set_charset(Some("utf-8")).unwrap();
//! headers.set_content_type(Some(content_type)).unwrap();
//! headers.set_transfer_encoding_chunked(Some(true)).unwrap();
//! headers.add("Server", "example/1.0").unwrap();
//!
//! // レスポンス用のストアにリクエストヘッダーは追加できない
//! assert!(headers.add("User-Agent", "curl/8.0").is_err());
//!
//! assert_eq!(
//!     headers.to_string(),
//!     "Content-Type: text/html; charset=utf-8\r\n\
//!      Transfer-Encoding: chunked\r\n\
//!      Server: example/1.0\r\n"
//! );
//! ```

pub mod byte_array;
pub mod cache_control;
pub mod collection;
pub mod content_disposition;
pub mod date;
pub mod error;
pub mod grammar;
pub mod media_type;
pub mod name;
pub mod name_value;
pub mod parser;
pub mod product_info;
pub mod quality;
pub mod registry;
pub mod store;
pub mod transfer_coding;
pub mod value;
pub mod via;
pub mod warning;

pub use byte_array::ByteArrayHeaderValue;
pub use cache_control::CacheControlHeaderValue;
pub use collection::{HeaderValueCollection, TypedHeaderValue};
pub use content_disposition::ContentDispositionHeaderValue;
pub use date::{DateError, HttpDate};
pub use error::{ErrorKind, HeaderError};
pub use media_type::{MediaTypeHeaderValue, MediaTypeWithQualityHeaderValue};
pub use name::HeaderName;
pub use name_value::NameValueHeaderValue;
pub use parser::HeaderParser;
pub use product_info::ProductInfoHeaderValue;
pub use quality::StringWithQualityHeaderValue;
pub use registry::{HeaderCategory, HeaderRegistry};
pub use store::{HeaderStore, ParsedValues};
pub use transfer_coding::TransferCodingHeaderValue;
pub use value::HeaderValue;
pub use via::ViaHeaderValue;
pub use warning::WarningHeaderValue;
