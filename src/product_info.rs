//! 製品情報 (RFC 9110 Section 10.1.5)
//!
//! ## 概要
//!
//! `User-Agent` と `Server` で使われる値です。
//! 各要素は `product[/version]` またはコメントで、空白で区切られます。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::product_info::ProductInfoHeaderValue;
//!
//! let p = ProductInfoHeaderValue::parse("curl/8.0").unwrap();
//! assert_eq!(p.to_string(), "curl/8.0");
//!
//! let c = ProductInfoHeaderValue::comment("(X11; Linux)").unwrap();
//! assert_eq!(c.to_string(), "(X11; Linux)");
//! ```

use core::fmt;

use crate::error::HeaderError;
use crate::grammar;
use crate::name_value::check_token;
use crate::parser::parse_exact;

/// 製品情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductInfoHeaderValue {
    /// `product[/version]`
    Product {
        /// 製品名
        name: String,
        /// バージョン
        version: Option<String>,
    },
    /// コメント (括弧を含む)
    Comment(String),
}

impl ProductInfoHeaderValue {
    /// 製品名とバージョンから作成
    pub fn product(name: &str, version: Option<&str>) -> Result<Self, HeaderError> {
        check_token(name)?;
        if let Some(version) = version {
            check_token(version)?;
        }
        Ok(ProductInfoHeaderValue::Product {
            name: name.to_string(),
            version: version.map(str::to_string),
        })
    }

    /// コメントから作成
    pub fn comment(comment: &str) -> Result<Self, HeaderError> {
        if !grammar::is_comment(comment) {
            return Err(HeaderError::InvalidValue(comment.to_string()));
        }
        Ok(ProductInfoHeaderValue::Comment(comment.to_string()))
    }

    /// 値を 1 つパース
    pub fn parse(input: &str) -> Result<Self, HeaderError> {
        parse_exact("product-info", input, scan_product_info)
    }
}

impl fmt::Display for ProductInfoHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductInfoHeaderValue::Product {
                name,
                version: Some(version),
            } => write!(f, "{}/{}", name, version),
            ProductInfoHeaderValue::Product {
                name,
                version: None,
            } => write!(f, "{}", name),
            ProductInfoHeaderValue::Comment(comment) => write!(f, "{}", comment),
        }
    }
}

pub(crate) fn scan_product_info(
    input: &str,
    start: usize,
) -> Option<(usize, ProductInfoHeaderValue)> {
    let bytes = input.as_bytes();
    if start >= bytes.len() {
        return None;
    }

    if bytes[start] == b'(' {
        let length = grammar::scan_comment(input, start);
        if length == 0 {
            return None;
        }
        let comment = input[start..start + length].to_string();
        let current = grammar::skip_whitespace(input, start + length);
        return Some((current - start, ProductInfoHeaderValue::Comment(comment)));
    }

    let name_length = grammar::scan_token(input, start);
    if name_length == 0 {
        return None;
    }
    let name = input[start..start + name_length].to_string();
    let mut current = grammar::skip_whitespace(input, start + name_length);

    let mut version = None;
    if current < bytes.len() && bytes[current] == b'/' {
        current = grammar::skip_whitespace(input, current + 1);
        let version_length = grammar::scan_token(input, current);
        if version_length == 0 {
            return None;
        }
        version = Some(input[current..current + version_length].to_string());
        current = grammar::skip_whitespace(input, current + version_length);
    }

    Some((
        current - start,
        ProductInfoHeaderValue::Product { name, version },
    ))
}
