//! Base64 で表現されるバイト列 (`Content-MD5` など)
//!
//! ## 概要
//!
//! ヘッダー値の残り全体を標準 Base64 (RFC 4648 Section 4) としてデコードします。
//! 空白は無視しますが、パディングは厳密に検査します。
//! 末尾にカンマなど Base64 以外の文字がある場合は失敗します。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::byte_array::ByteArrayHeaderValue;
//!
//! let v = ByteArrayHeaderValue::parse("AQ==").unwrap();
//! assert_eq!(v.as_bytes(), &[1]);
//! assert!(ByteArrayHeaderValue::parse("AQ==,").is_err());
//! ```

use core::fmt;

use crate::error::HeaderError;

/// Base64 で表現されるバイト列
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ByteArrayHeaderValue(Vec<u8>);

impl ByteArrayHeaderValue {
    /// バイト列から作成
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        ByteArrayHeaderValue(bytes.into())
    }

    /// Base64 文字列をパース
    pub fn parse(input: &str) -> Result<Self, HeaderError> {
        scan_byte_array(input, 0)
            .map(|(_, v)| v)
            .ok_or_else(|| HeaderError::invalid_format("byte-array", input))
    }

    /// バイト列を取得
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// バイト列に変換
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for ByteArrayHeaderValue {
    fn from(bytes: Vec<u8>) -> Self {
        ByteArrayHeaderValue(bytes)
    }
}

impl fmt::Display for ByteArrayHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base64_encode(&self.0))
    }
}

/// `start` 以降の残り全体を Base64 としてデコード
///
/// 成功した場合は入力の終端までの長さを返す。
pub(crate) fn scan_byte_array(input: &str, start: usize) -> Option<(usize, ByteArrayHeaderValue)> {
    let rest = input.get(start..)?;
    if rest.is_empty() {
        return None;
    }
    let bytes = base64_decode(rest)?;
    Some((rest.len(), ByteArrayHeaderValue(bytes)))
}

const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Base64 エンコード
pub(crate) fn base64_encode(input: &[u8]) -> String {
    let mut result = String::with_capacity(input.len().div_ceil(3) * 4);

    for chunk in input.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied().unwrap_or(0);
        let b2 = chunk.get(2).copied().unwrap_or(0);

        let n = ((b0 as u32) << 16) | ((b1 as u32) << 8) | (b2 as u32);

        result.push(BASE64_ALPHABET[(n >> 18 & 0x3F) as usize] as char);
        result.push(BASE64_ALPHABET[(n >> 12 & 0x3F) as usize] as char);

        if chunk.len() > 1 {
            result.push(BASE64_ALPHABET[(n >> 6 & 0x3F) as usize] as char);
        } else {
            result.push('=');
        }

        if chunk.len() > 2 {
            result.push(BASE64_ALPHABET[(n & 0x3F) as usize] as char);
        } else {
            result.push('=');
        }
    }

    result
}

/// Base64 デコード
///
/// 空白 (SP / HTAB / CR / LF) は無視する。
/// 空白を除いた長さが 4 の倍数でない場合、パディングが末尾以外にある場合、
/// 空白しかない場合は None を返す。
pub(crate) fn base64_decode(input: &str) -> Option<Vec<u8>> {
    let symbols: Vec<u8> = input
        .bytes()
        .filter(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        .collect();

    if symbols.is_empty() || symbols.len() % 4 != 0 {
        return None;
    }

    let padding = symbols.iter().rev().take_while(|&&b| b == b'=').count();
    if padding > 2 {
        return None;
    }
    let data = &symbols[..symbols.len() - padding];

    let mut result = Vec::with_capacity(data.len() * 3 / 4);
    let mut buf: u32 = 0;
    let mut bits: u32 = 0;

    for &b in data {
        let val = match b {
            b'A'..=b'Z' => b - b'A',
            b'a'..=b'z' => b - b'a' + 26,
            b'0'..=b'9' => b - b'0' + 52,
            b'+' => 62,
            b'/' => 63,
            _ => return None,
        };

        buf = (buf << 6) | val as u32;
        bits += 6;

        if bits >= 8 {
            bits -= 8;
            result.push((buf >> bits) as u8);
            buf &= (1 << bits) - 1;
        }
    }

    Some(result)
}
