//! ヘッダー値の文法プリミティブ (RFC 9110 Section 5.6)
//!
//! ## 概要
//!
//! すべてのヘッダーパーサーが利用する前方スキャナーを提供します。
//! どの関数も入力文字列と開始位置 (バイトオフセット) を受け取り、
//! 消費したバイト数 (または次の位置) を返します。
//! 一致しなかった場合は 0 を返し、部分的な結果は返しません。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::grammar;
//!
//! let input = "token \"quoted \\\" string\" (comment)";
//! assert_eq!(grammar::scan_token(input, 0), 5);
//! let pos = grammar::skip_whitespace(input, 5);
//! assert_eq!(grammar::scan_quoted_string(input, pos), 18);
//! ```

pub use crate::date::scan_date;

/// コメントのネストの最大深さ
pub const MAX_COMMENT_DEPTH: usize = 5;

/// 空白 (SP / HTAB) をスキップして次の位置を返す
///
/// 改行はスキップしない。
pub fn skip_whitespace(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut i = start;
    while i < bytes.len() && is_ows(bytes[i]) {
        i += 1;
    }
    i
}

/// トークンの長さを取得
///
/// ```text
/// token = 1*tchar
/// ```
pub fn scan_token(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut i = start;
    while i < bytes.len() && is_token_char(bytes[i]) {
        i += 1;
    }
    i.saturating_sub(start)
}

/// 引用符付き文字列の長さを取得 (両端の引用符を含む)
///
/// ```text
/// quoted-string = DQUOTE *( qdtext / quoted-pair ) DQUOTE
/// ```
///
/// 閉じ引用符がない場合、または制御文字を含む場合は 0 を返す。
pub fn scan_quoted_string(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    if start >= bytes.len() || bytes[start] != b'"' {
        return 0;
    }

    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return i + 1 - start,
            b'\\' => {
                if i + 1 < bytes.len() && is_quoted_pair_char(bytes[i + 1]) {
                    i += 2;
                } else {
                    return 0;
                }
            }
            b if is_qdtext(b) => i += 1,
            _ => return 0,
        }
    }

    0
}

/// コメントの長さを取得 (両端の括弧を含む)
///
/// ```text
/// comment = "(" *( ctext / quoted-pair / comment ) ")"
/// ```
///
/// ネストは [`MAX_COMMENT_DEPTH`] 段まで。CR / LF は許可しない。
pub fn scan_comment(input: &str, start: usize) -> usize {
    scan_comment_nested(input.as_bytes(), start, 1).unwrap_or(0)
}

fn scan_comment_nested(bytes: &[u8], start: usize, depth: usize) -> Option<usize> {
    if start >= bytes.len() || bytes[start] != b'(' || depth > MAX_COMMENT_DEPTH {
        return None;
    }

    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b')' => return Some(i + 1 - start),
            b'(' => {
                let nested = scan_comment_nested(bytes, i, depth + 1)?;
                i += nested;
            }
            b'\\' => {
                if i + 1 < bytes.len() && is_quoted_pair_char(bytes[i + 1]) {
                    i += 2;
                } else {
                    return None;
                }
            }
            b if is_qdtext(b) || b == b'"' => i += 1,
            _ => return None,
        }
    }

    None
}

/// 数値の長さを取得
///
/// `allow_decimal` が true の場合は 1 つの小数点を許可する。
pub fn scan_number(input: &str, start: usize, allow_decimal: bool) -> usize {
    let bytes = input.as_bytes();
    let mut i = start;
    let mut have_dot = !allow_decimal;

    if i >= bytes.len() || !bytes[i].is_ascii_digit() {
        return 0;
    }

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_digit() {
            i += 1;
        } else if b == b'.' && !have_dot {
            have_dot = true;
            i += 1;
        } else {
            break;
        }
    }

    i - start
}

/// ホスト (host[:port]、`[IPv6]`[:port]) の長さを取得
///
/// 空白、CR、カンマで終端する。`/` を含む場合は 0 を返す。
/// `allow_token` が true の場合はトークン (仮名) も受け付ける。
pub fn scan_host(input: &str, start: usize, allow_token: bool) -> usize {
    let bytes = input.as_bytes();
    let mut i = start;
    let mut is_token = true;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'/' {
            return 0;
        }
        if b == b' ' || b == b'\t' || b == b'\r' || b == b',' {
            break;
        }
        is_token = is_token && is_token_char(b);
        i += 1;
    }

    let length = i.saturating_sub(start);
    if length == 0 {
        return 0;
    }

    let host = &input[start..i];
    if (!allow_token || !is_token) && !is_valid_host(host) {
        return 0;
    }

    length
}

/// 次の値の開始位置を取得
///
/// 空白とリスト区切り (`,`) をスキップし、(次の位置, 区切りが見つかったか) を返す。
/// `skip_empty_values` が true の場合は連続する区切り (空要素) もスキップする。
pub fn next_value_index(input: &str, start: usize, skip_empty_values: bool) -> (usize, bool) {
    let bytes = input.as_bytes();
    let mut current = skip_whitespace(input, start);

    if current >= bytes.len() || bytes[current] != b',' {
        return (current, false);
    }

    current += 1;
    current = skip_whitespace(input, current);

    if skip_empty_values {
        while current < bytes.len() && bytes[current] == b',' {
            current += 1;
            current = skip_whitespace(input, current);
        }
    }

    (current, true)
}

/// ヘッダー分割となる改行を含むかどうか
///
/// 改行の直後が SP / HTAB 以外 (または文字列の終端) の場合に true を返す。
/// `\r\n ` のような行継続 (obs-fold) は分割とみなさない。
/// LF が続かない CR は行末として扱う受信側があるため、常に分割とみなす。
pub fn contains_header_splitting(value: &str) -> bool {
    let bytes = value.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\r' => {
                if bytes.get(i + 1) != Some(&b'\n') {
                    return true;
                }
            }
            b'\n' => match bytes.get(i + 1) {
                Some(next) if is_ows(*next) => {}
                _ => return true,
            },
            _ => {}
        }
    }
    false
}

/// 有効なホスト名かどうか
///
/// reg-name / IPv4address / `[IPv6address]` と、オプションのポートを受け付ける。
pub fn is_valid_host(host: &str) -> bool {
    if host.is_empty() {
        return false;
    }

    let port = if let Some(rest) = host.strip_prefix('[') {
        let Some(close) = rest.find(']') else {
            return false;
        };
        let literal = &rest[..close];
        if literal.is_empty()
            || !literal.contains(':')
            || !literal
                .bytes()
                .all(|b| b.is_ascii_hexdigit() || b == b':' || b == b'.')
        {
            return false;
        }
        let after = &rest[close + 1..];
        if after.is_empty() {
            return true;
        }
        match after.strip_prefix(':') {
            Some(port) => port,
            None => return false,
        }
    } else {
        let (name, port) = match host.find(':') {
            Some(pos) => (&host[..pos], Some(&host[pos + 1..])),
            None => (host, None),
        };
        if name.is_empty() || !name.bytes().all(is_reg_name_char) {
            return false;
        }
        match port {
            Some(port) => port,
            None => return true,
        }
    };

    !port.is_empty() && port.len() <= 5 && parse_non_negative(port).is_some_and(|p| p <= 65535)
}

/// RFC 9110 のトークン文字
pub fn is_token_char(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'0'..=b'9' | b'A'..=b'Z' | b'^' | b'_' | b'`' | b'a'..=b'z' | b'|' | b'~'
    )
}

/// 有効なトークンかどうか
pub fn is_valid_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

/// 文字列全体が 1 つの引用符付き文字列かどうか
pub fn is_quoted_string(s: &str) -> bool {
    !s.is_empty() && scan_quoted_string(s, 0) == s.len()
}

/// 文字列全体が 1 つのコメントかどうか
pub fn is_comment(s: &str) -> bool {
    !s.is_empty() && scan_comment(s, 0) == s.len()
}

/// 引用符で囲む必要があるかどうか
pub fn needs_quoting(s: &str) -> bool {
    s.is_empty() || s.bytes().any(|b| !is_token_char(b))
}

/// 引用符付き文字列を生成
pub fn quote(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            result.push('\\');
        }
        result.push(c);
    }
    result.push('"');
    result
}

/// 引用符付き文字列の引用符を外し、quoted-pair を展開する
///
/// 引用符付き文字列でない場合はそのまま返す。
pub fn unquote(s: &str) -> String {
    if !is_quoted_string(s) {
        return s.to_string();
    }

    let inner = &s[1..s.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// 数字のみの文字列を非負整数としてパース
///
/// 符号、空白、引用符は許可しない。
pub fn parse_non_negative(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u64>().ok()
}

pub(crate) fn is_ows(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn is_qdtext(b: u8) -> bool {
    b == b'\t' || b == b' ' || b == 0x21 || (0x23..=0x5B).contains(&b) || (0x5D..=0x7E).contains(&b)
        || b >= 0x80
}

fn is_quoted_pair_char(b: u8) -> bool {
    b == b'\t' || (0x20..=0x7E).contains(&b) || b >= 0x80
}

fn is_reg_name_char(b: u8) -> bool {
    matches!(b,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
        b'-' | b'.' | b'_' | b'~' | b'%' | b'!' | b'$' | b'&' | b'\'' |
        b'(' | b')' | b'*' | b'+' | b';' | b'='
    )
}
