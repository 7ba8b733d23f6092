//! ヘッダー名
//!
//! ## 概要
//!
//! ヘッダー名はトークンで、大文字小文字を区別せずに比較・ハッシュします。
//! 出力には最初に使われた綴りを保持します。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::name::HeaderName;
//!
//! let a = HeaderName::new("Content-Type").unwrap();
//! let b = HeaderName::new("content-type").unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "Content-Type");
//! assert!(HeaderName::new("Bad Name").is_err());
//! ```

use core::fmt;
use core::hash::{Hash, Hasher};

use crate::error::HeaderError;
use crate::grammar;

/// ヘッダー名
#[derive(Debug, Clone)]
pub struct HeaderName(String);

impl HeaderName {
    /// ヘッダー名を作成
    ///
    /// 空の場合は [`HeaderError::EmptyName`]、トークンでない場合は
    /// [`HeaderError::InvalidName`] を返す。
    pub fn new(name: &str) -> Result<Self, HeaderError> {
        if name.is_empty() {
            return Err(HeaderError::EmptyName);
        }
        if !grammar::is_valid_token(name) {
            return Err(HeaderError::InvalidName(name.to_string()));
        }
        Ok(HeaderName(name.to_string()))
    }

    /// 静的なヘッダー名から作成 (検証しない)
    pub(crate) fn from_static(name: &'static str) -> Self {
        HeaderName(name.to_string())
    }

    /// ヘッダー名を文字列として取得
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for HeaderName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for HeaderName {}

impl PartialEq<str> for HeaderName {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for HeaderName {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl Hash for HeaderName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_usize(self.0.len());
    }
}

impl AsRef<str> for HeaderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
