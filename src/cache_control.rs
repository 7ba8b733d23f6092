//! Cache-Control ヘッダー値 (RFC 9111 Section 5.2)
//!
//! ## 概要
//!
//! Cache-Control は 1 つの値に複数のディレクティブを集約します。
//! 同じヘッダーが複数回現れた場合も 1 つの値に畳み込みます。
//!
//! - 既知のディレクティブが重複した場合は後勝ち
//! - `no-cache="..."` と `private="..."` のフィールド名リストは蓄積する
//! - 不正なディレクティブ値が 1 つでもあれば、その文字列全体が失敗する
//! - 未知のディレクティブは拡張として保持する
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::cache_control::CacheControlHeaderValue;
//!
//! let cc = CacheControlHeaderValue::parse("no-store, max-age=70, max-stale").unwrap();
//! assert!(cc.no_store());
//! assert_eq!(cc.max_age(), Some(70));
//! assert!(cc.max_stale());
//! assert_eq!(cc.max_stale_limit(), None);
//! assert_eq!(cc.to_string(), "no-store, max-age=70, max-stale");
//! ```

use core::fmt;

use crate::error::HeaderError;
use crate::grammar;
use crate::name_value::{NameValueHeaderValue, check_token, parameters_equal, scan_name_value};
use crate::parser::parse_exact;

const NO_CACHE: &str = "no-cache";
const NO_STORE: &str = "no-store";
const MAX_AGE: &str = "max-age";
const S_MAXAGE: &str = "s-maxage";
const MAX_STALE: &str = "max-stale";
const MIN_FRESH: &str = "min-fresh";
const NO_TRANSFORM: &str = "no-transform";
const ONLY_IF_CACHED: &str = "only-if-cached";
const PUBLIC: &str = "public";
const PRIVATE: &str = "private";
const MUST_REVALIDATE: &str = "must-revalidate";
const PROXY_REVALIDATE: &str = "proxy-revalidate";

/// Cache-Control ヘッダー値
#[derive(Debug, Clone, Default)]
pub struct CacheControlHeaderValue {
    no_cache: bool,
    no_cache_headers: Vec<String>,
    no_store: bool,
    max_age: Option<u64>,
    shared_max_age: Option<u64>,
    max_stale: bool,
    max_stale_limit: Option<u64>,
    min_fresh: Option<u64>,
    no_transform: bool,
    only_if_cached: bool,
    public: bool,
    private: bool,
    private_headers: Vec<String>,
    must_revalidate: bool,
    proxy_revalidate: bool,
    extensions: Vec<NameValueHeaderValue>,
}

impl CacheControlHeaderValue {
    /// ディレクティブなしで作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 出力するディレクティブが 1 つもないかどうか
    ///
    /// フラグが立っていない no-cache / private のフィールド名リストは出力されない。
    pub fn is_empty(&self) -> bool {
        !(self.no_cache
            || self.no_store
            || self.max_age.is_some()
            || self.shared_max_age.is_some()
            || self.max_stale
            || self.min_fresh.is_some()
            || self.no_transform
            || self.only_if_cached
            || self.public
            || self.private
            || self.must_revalidate
            || self.proxy_revalidate
            || !self.extensions.is_empty())
    }

    /// ディレクティブ列をパース
    pub fn parse(input: &str) -> Result<Self, HeaderError> {
        parse_exact("cache-control", input, |input, start| {
            scan_cache_control(input, start, None)
        })
    }

    /// no-cache
    pub fn no_cache(&self) -> bool {
        self.no_cache
    }

    /// no-cache を設定
    pub fn set_no_cache(&mut self, value: bool) {
        self.no_cache = value;
    }

    /// `no-cache="..."` のフィールド名リスト
    ///
    /// `no-cache` フラグが立っている場合のみ出力される。
    pub fn no_cache_headers(&self) -> &[String] {
        &self.no_cache_headers
    }

    /// `no-cache` のフィールド名を追加
    pub fn add_no_cache_header(&mut self, name: &str) -> Result<(), HeaderError> {
        check_token(name)?;
        push_unique(&mut self.no_cache_headers, name);
        Ok(())
    }

    /// no-store
    pub fn no_store(&self) -> bool {
        self.no_store
    }

    /// no-store を設定
    pub fn set_no_store(&mut self, value: bool) {
        self.no_store = value;
    }

    /// max-age (秒)
    pub fn max_age(&self) -> Option<u64> {
        self.max_age
    }

    /// max-age を設定
    pub fn set_max_age(&mut self, seconds: Option<u64>) {
        self.max_age = seconds;
    }

    /// s-maxage (秒)
    pub fn shared_max_age(&self) -> Option<u64> {
        self.shared_max_age
    }

    /// s-maxage を設定
    pub fn set_shared_max_age(&mut self, seconds: Option<u64>) {
        self.shared_max_age = seconds;
    }

    /// max-stale
    pub fn max_stale(&self) -> bool {
        self.max_stale
    }

    /// max-stale を設定
    pub fn set_max_stale(&mut self, value: bool) {
        self.max_stale = value;
    }

    /// max-stale の上限 (秒)
    ///
    /// `max-stale` フラグが立っている場合のみ出力される。
    pub fn max_stale_limit(&self) -> Option<u64> {
        self.max_stale_limit
    }

    /// max-stale の上限を設定
    pub fn set_max_stale_limit(&mut self, seconds: Option<u64>) {
        self.max_stale_limit = seconds;
    }

    /// min-fresh (秒)
    pub fn min_fresh(&self) -> Option<u64> {
        self.min_fresh
    }

    /// min-fresh を設定
    pub fn set_min_fresh(&mut self, seconds: Option<u64>) {
        self.min_fresh = seconds;
    }

    /// no-transform
    pub fn no_transform(&self) -> bool {
        self.no_transform
    }

    /// no-transform を設定
    pub fn set_no_transform(&mut self, value: bool) {
        self.no_transform = value;
    }

    /// only-if-cached
    pub fn only_if_cached(&self) -> bool {
        self.only_if_cached
    }

    /// only-if-cached を設定
    pub fn set_only_if_cached(&mut self, value: bool) {
        self.only_if_cached = value;
    }

    /// public
    pub fn public(&self) -> bool {
        self.public
    }

    /// public を設定
    pub fn set_public(&mut self, value: bool) {
        self.public = value;
    }

    /// private
    pub fn private(&self) -> bool {
        self.private
    }

    /// private を設定
    pub fn set_private(&mut self, value: bool) {
        self.private = value;
    }

    /// `private="..."` のフィールド名リスト
    pub fn private_headers(&self) -> &[String] {
        &self.private_headers
    }

    /// `private` のフィールド名を追加
    pub fn add_private_header(&mut self, name: &str) -> Result<(), HeaderError> {
        check_token(name)?;
        push_unique(&mut self.private_headers, name);
        Ok(())
    }

    /// must-revalidate
    pub fn must_revalidate(&self) -> bool {
        self.must_revalidate
    }

    /// must-revalidate を設定
    pub fn set_must_revalidate(&mut self, value: bool) {
        self.must_revalidate = value;
    }

    /// proxy-revalidate
    pub fn proxy_revalidate(&self) -> bool {
        self.proxy_revalidate
    }

    /// proxy-revalidate を設定
    pub fn set_proxy_revalidate(&mut self, value: bool) {
        self.proxy_revalidate = value;
    }

    /// 拡張ディレクティブ
    pub fn extensions(&self) -> &[NameValueHeaderValue] {
        &self.extensions
    }

    /// 拡張ディレクティブを追加
    pub fn add_extension(&mut self, extension: NameValueHeaderValue) {
        self.extensions.push(extension);
    }

    /// ディレクティブ列をこの値に畳み込む
    ///
    /// 失敗した場合、この値は途中まで変更されている可能性がある。
    /// 呼び出し側は複製に対して適用すること。
    fn apply(&mut self, directives: Vec<NameValueHeaderValue>) -> bool {
        for directive in directives {
            let name = directive.name().to_ascii_lowercase();
            let ok = match name.as_str() {
                NO_CACHE => set_optional_token_list(
                    &directive,
                    &mut self.no_cache,
                    &mut self.no_cache_headers,
                ),
                PRIVATE => set_optional_token_list(
                    &directive,
                    &mut self.private,
                    &mut self.private_headers,
                ),
                NO_STORE => set_token_only(&directive, &mut self.no_store),
                NO_TRANSFORM => set_token_only(&directive, &mut self.no_transform),
                ONLY_IF_CACHED => set_token_only(&directive, &mut self.only_if_cached),
                PUBLIC => set_token_only(&directive, &mut self.public),
                MUST_REVALIDATE => set_token_only(&directive, &mut self.must_revalidate),
                PROXY_REVALIDATE => set_token_only(&directive, &mut self.proxy_revalidate),
                MAX_AGE => set_seconds(&directive, &mut self.max_age),
                S_MAXAGE => set_seconds(&directive, &mut self.shared_max_age),
                MIN_FRESH => set_seconds(&directive, &mut self.min_fresh),
                MAX_STALE => {
                    let ok = directive.value().is_none()
                        || set_seconds(&directive, &mut self.max_stale_limit);
                    if ok {
                        self.max_stale = true;
                    }
                    ok
                }
                _ => {
                    self.extensions.push(directive);
                    true
                }
            };
            if !ok {
                return false;
            }
        }
        true
    }
}

impl PartialEq for CacheControlHeaderValue {
    fn eq(&self, other: &Self) -> bool {
        self.no_cache == other.no_cache
            && self.no_store == other.no_store
            && self.max_age == other.max_age
            && self.shared_max_age == other.shared_max_age
            && self.max_stale == other.max_stale
            && self.max_stale_limit == other.max_stale_limit
            && self.min_fresh == other.min_fresh
            && self.no_transform == other.no_transform
            && self.only_if_cached == other.only_if_cached
            && self.public == other.public
            && self.private == other.private
            && self.must_revalidate == other.must_revalidate
            && self.proxy_revalidate == other.proxy_revalidate
            && token_lists_equal(&self.no_cache_headers, &other.no_cache_headers)
            && token_lists_equal(&self.private_headers, &other.private_headers)
            && parameters_equal(&self.extensions, &other.extensions)
    }
}

impl fmt::Display for CacheControlHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();

        for (flag, name) in [
            (self.no_store, NO_STORE),
            (self.no_transform, NO_TRANSFORM),
            (self.only_if_cached, ONLY_IF_CACHED),
            (self.public, PUBLIC),
            (self.must_revalidate, MUST_REVALIDATE),
            (self.proxy_revalidate, PROXY_REVALIDATE),
        ] {
            if flag {
                parts.push(name.to_string());
            }
        }

        if self.no_cache {
            parts.push(with_token_list(NO_CACHE, &self.no_cache_headers));
        }
        if let Some(seconds) = self.max_age {
            parts.push(format!("{}={}", MAX_AGE, seconds));
        }
        if let Some(seconds) = self.shared_max_age {
            parts.push(format!("{}={}", S_MAXAGE, seconds));
        }
        if self.max_stale {
            match self.max_stale_limit {
                Some(seconds) => parts.push(format!("{}={}", MAX_STALE, seconds)),
                None => parts.push(MAX_STALE.to_string()),
            }
        }
        if let Some(seconds) = self.min_fresh {
            parts.push(format!("{}={}", MIN_FRESH, seconds));
        }
        if self.private {
            parts.push(with_token_list(PRIVATE, &self.private_headers));
        }
        for extension in &self.extensions {
            parts.push(extension.to_string());
        }

        write!(f, "{}", parts.join(", "))
    }
}

/// Cache-Control ディレクティブ列をスキャン
///
/// 残りのカンマ区切りリスト全体を 1 つの値として読む。
/// `store_value` がある場合はその複製に畳み込んだ結果を返す。
pub(crate) fn scan_cache_control(
    input: &str,
    start: usize,
    store_value: Option<&CacheControlHeaderValue>,
) -> Option<(usize, CacheControlHeaderValue)> {
    let mut directives = Vec::new();
    let mut current = start;

    loop {
        let (length, directive) = scan_name_value(input, current)?;
        directives.push(directive);
        current += length;

        let (next, separator_found) = grammar::next_value_index(input, current, true);
        current = next;
        if !separator_found || current >= input.len() {
            break;
        }
    }

    let mut value = store_value.cloned().unwrap_or_default();
    if !value.apply(directives) {
        return None;
    }

    Some((current - start, value))
}

fn set_token_only(directive: &NameValueHeaderValue, field: &mut bool) -> bool {
    if directive.value().is_some() {
        return false;
    }
    *field = true;
    true
}

/// delta-seconds (数字のみ) を設定
fn set_seconds(directive: &NameValueHeaderValue, field: &mut Option<u64>) -> bool {
    match directive.value().and_then(grammar::parse_non_negative) {
        Some(seconds) => {
            *field = Some(seconds);
            true
        }
        None => false,
    }
}

/// 値なし、または引用符付きのトークンリスト (1 つ以上) を受け付ける
fn set_optional_token_list(
    directive: &NameValueHeaderValue,
    flag: &mut bool,
    destination: &mut Vec<String>,
) -> bool {
    let Some(value) = directive.value() else {
        *flag = true;
        return true;
    };

    if value.len() < 3 || !value.starts_with('"') || !value.ends_with('"') {
        return false;
    }

    let inner = &value[1..value.len() - 1];
    let mut tokens = Vec::new();
    let mut current = 0;
    while current < inner.len() {
        let (next, _) = grammar::next_value_index(inner, current, true);
        current = if next == current {
            grammar::skip_whitespace(inner, current)
        } else {
            next
        };
        if current >= inner.len() {
            break;
        }
        let length = grammar::scan_token(inner, current);
        if length == 0 {
            return false;
        }
        tokens.push(&inner[current..current + length]);
        current += length;
    }

    if tokens.is_empty() {
        return false;
    }

    for token in tokens {
        push_unique(destination, token);
    }
    *flag = true;
    true
}

fn push_unique(list: &mut Vec<String>, token: &str) {
    if !list.iter().any(|t| t.eq_ignore_ascii_case(token)) {
        list.push(token.to_string());
    }
}

fn with_token_list(name: &str, tokens: &[String]) -> String {
    if tokens.is_empty() {
        name.to_string()
    } else {
        format!("{}=\"{}\"", name, tokens.join(", "))
    }
}

fn token_lists_equal(a: &[String], b: &[String]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|x| b.iter().any(|y| x.eq_ignore_ascii_case(y)))
}
