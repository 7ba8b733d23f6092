//! ヘッダーストア
//!
//! ## 概要
//!
//! ヘッダー名ごとに 3 種類の値を保持します。
//!
//! - 未パースの文字列 (`add_without_validation` で追加した値)
//! - パース済みの値
//! - パースに失敗した文字列 (そのまま保持する)
//!
//! 未パースの値は、そのヘッダーを最初に読んだときに一度だけパースします。
//! 読み取りで遅延パースが起こるため、読み取り系のメソッドも `&mut self` を取ります。
//! `Display` は複製に対してパースするため、ストアを変更しません。
//!
//! 改行の直後が空白でない値 (ヘッダー分割) はパース時に破棄します。
//! パース後に値が 1 つも残らないヘッダーは削除します。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::store::HeaderStore;
//!
//! let mut headers = HeaderStore::default();
//! headers.add_without_validation("Cache-Control", "no-store").unwrap();
//! headers.add("Content-Type", "text/plain").unwrap();
//! headers.add_without_validation("X-Custom", "anything").unwrap();
//!
//! assert!(headers.add("Content-Type", "text/html").is_err());
//! assert_eq!(headers.get_values("cache-control").unwrap(), vec!["no-store"]);
//! assert_eq!(
//!     headers.to_string(),
//!     "Cache-Control: no-store\r\nContent-Type: text/plain\r\nX-Custom: anything\r\n"
//! );
//! ```

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::HeaderError;
use crate::grammar;
use crate::name::HeaderName;
use crate::parser::HeaderParser;
use crate::registry::HeaderRegistry;
use crate::value::HeaderValue;

/// パース済み値の取得結果
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValues {
    /// 値が 1 つ
    Single(HeaderValue),
    /// 値が 2 つ以上 (ストア内の順序)
    Multiple(Vec<HeaderValue>),
}

impl ParsedValues {
    /// Vec に変換
    pub fn into_vec(self) -> Vec<HeaderValue> {
        match self {
            ParsedValues::Single(value) => vec![value],
            ParsedValues::Multiple(values) => values,
        }
    }
}

/// ヘッダー 1 つ分の値
#[derive(Debug, Clone)]
struct HeaderEntry {
    parser: Option<HeaderParser>,
    raw_values: Vec<String>,
    parsed_values: Vec<HeaderValue>,
    invalid_values: Vec<String>,
}

impl HeaderEntry {
    fn new(parser: Option<HeaderParser>) -> Self {
        HeaderEntry {
            parser,
            raw_values: Vec::new(),
            parsed_values: Vec::new(),
            invalid_values: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.raw_values.is_empty() && self.parsed_values.is_empty() && self.invalid_values.is_empty()
    }

    /// パース済み値を追加できるか
    ///
    /// 単一値ヘッダーは、パース済み値も不正な値もまだない場合のみ追加できる。
    fn can_add_parsed(&self) -> bool {
        match self.parser {
            Some(parser) if !parser.supports_multiple_values() => {
                self.parsed_values.is_empty() && self.invalid_values.is_empty()
            }
            _ => true,
        }
    }

    /// 畳み込み先となる既存の値
    fn store_value(&self) -> Option<&HeaderValue> {
        match self.parser {
            Some(parser) if parser.folds_into_store_value() => self.parsed_values.first(),
            _ => None,
        }
    }

    /// パースした値を反映する
    fn commit(&mut self, values: Vec<HeaderValue>) {
        let folds = self.parser.is_some_and(|p| p.folds_into_store_value());
        if folds && !self.parsed_values.is_empty() {
            if let Some(folded) = values.into_iter().last() {
                self.parsed_values[0] = folded;
            }
        } else {
            self.parsed_values.extend(values);
        }
    }

    /// 未パースの値をすべてパースする
    fn parse_raw_values(&mut self, name: &HeaderName) {
        if self.raw_values.is_empty() {
            return;
        }

        for raw in std::mem::take(&mut self.raw_values) {
            if grammar::contains_header_splitting(&raw) {
                debug!(header = %name, "dropping value containing header splitting");
                continue;
            }

            let Some(parser) = self.parser else {
                self.parsed_values.push(HeaderValue::Text(raw));
                continue;
            };

            if !self.can_add_parsed() {
                trace!(header = %name, value = %raw, "single value header already has a value");
                self.invalid_values.push(raw);
                continue;
            }

            match parser.parse_values(&raw, self.store_value()) {
                Some(values) => self.commit(values),
                None => {
                    trace!(header = %name, value = %raw, "failed to parse header value");
                    self.invalid_values.push(raw);
                }
            }
        }
    }

    fn value_count(&self) -> usize {
        self.parsed_values.len() + self.invalid_values.len()
    }

    /// パース済み値、不正な値の順で文字列化
    ///
    /// 出力が空になるパース済み値は含めない。
    fn value_strings(&self) -> Vec<String> {
        self.parsed_values
            .iter()
            .filter(|v| !v.is_empty_value())
            .map(|v| v.to_string())
            .chain(self.invalid_values.iter().cloned())
            .collect()
    }

    fn separator(&self) -> &'static str {
        match self.parser.map(|p| p.list_separator()) {
            Some(' ') => " ",
            _ => ", ",
        }
    }

    fn joined_values(&self) -> String {
        self.value_strings().join(self.separator())
    }

    fn position_of(&self, value: &HeaderValue) -> Option<usize> {
        self.parsed_values.iter().position(|v| match self.parser {
            Some(parser) => parser.values_equal(v, value),
            None => v == value,
        })
    }
}

/// ヘッダーストア
#[derive(Debug, Clone)]
pub struct HeaderStore {
    registry: Arc<HeaderRegistry>,
    // 一度も値を追加していない場合は None
    entries: Option<IndexMap<HeaderName, HeaderEntry>>,
}

impl Default for HeaderStore {
    fn default() -> Self {
        HeaderStore::new(Arc::new(HeaderRegistry::standard()))
    }
}

impl HeaderStore {
    /// 設定を指定してストアを作成
    pub fn new(registry: Arc<HeaderRegistry>) -> Self {
        HeaderStore {
            registry,
            entries: None,
        }
    }

    /// 設定を取得
    pub fn registry(&self) -> &Arc<HeaderRegistry> {
        &self.registry
    }

    /// 一度でも値が追加されたか
    pub fn is_initialized(&self) -> bool {
        self.entries.is_some()
    }

    /// ヘッダーの数 (未パースのヘッダーを含む)
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |e| e.len())
    }

    /// ヘッダーが 1 つもないか
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 値を検証せずに追加
    ///
    /// None は空文字列として扱う。値のパースは最初の読み取りまで遅延する。
    pub fn add_without_validation<'a>(
        &mut self,
        name: &str,
        value: impl Into<Option<&'a str>>,
    ) -> Result<(), HeaderError> {
        let name = self.check_name(name)?;
        let value = value.into().unwrap_or_default();
        self.entry_mut(name).raw_values.push(value.to_string());
        Ok(())
    }

    /// 値をパースして追加
    ///
    /// パースに失敗した場合はエラーを返し、ストアは呼び出し前の状態のまま。
    /// 単一値ヘッダーに既に値がある場合は [`HeaderError::SingleValueHeader`] を返す。
    pub fn add<'a>(
        &mut self,
        name: &str,
        value: impl Into<Option<&'a str>>,
    ) -> Result<(), HeaderError> {
        let name = self.check_name(name)?;
        let value = value.into().unwrap_or_default();
        self.parse_entry(&name);

        if grammar::contains_header_splitting(value) {
            return Err(HeaderError::InvalidNewLine(name.to_string()));
        }

        let Some(parser) = self.registry.parser(&name) else {
            self.entry_mut(name)
                .parsed_values
                .push(HeaderValue::Text(value.to_string()));
            return Ok(());
        };

        let existing = self.entries.as_ref().and_then(|e| e.get(&name));
        if let Some(entry) = existing {
            if !entry.can_add_parsed() {
                return Err(HeaderError::SingleValueHeader(name.to_string()));
            }
        }

        let store_value = existing.and_then(|entry| entry.store_value());
        let values = parser
            .parse_values(value, store_value)
            .ok_or_else(|| {
                parser
                    .date_error(value)
                    .unwrap_or_else(|| HeaderError::invalid_format(name.as_str(), value))
            })?;

        if values.is_empty() {
            return Ok(());
        }
        self.entry_mut(name).commit(values);
        Ok(())
    }

    /// 値をパースして追加 (失敗してもエラーを返さない)
    pub fn try_add<'a>(&mut self, name: &str, value: impl Into<Option<&'a str>>) -> bool {
        self.add(name, value).is_ok()
    }

    /// ヘッダーを削除
    ///
    /// ヘッダーが存在した場合は true を返す。
    pub fn remove(&mut self, name: &str) -> Result<bool, HeaderError> {
        let name = self.check_name(name)?;
        Ok(self
            .entries
            .as_mut()
            .is_some_and(|entries| entries.shift_remove(&name).is_some()))
    }

    /// すべてのヘッダーを削除
    pub fn clear(&mut self) {
        if let Some(entries) = self.entries.as_mut() {
            entries.clear();
        }
    }

    /// ヘッダーが存在するか
    ///
    /// 未パースの値をパースし、値が残っている場合に true を返す。
    pub fn contains(&mut self, name: &str) -> bool {
        match HeaderName::new(name) {
            Ok(name) => self.parse_entry(&name),
            Err(_) => false,
        }
    }

    /// ヘッダーの値を文字列で取得 (パース済み値、不正な値の順)
    pub fn get_values(&mut self, name: &str) -> Result<Vec<String>, HeaderError> {
        let name = self.check_name(name)?;
        self.try_get_values(name.as_str())
            .ok_or_else(|| HeaderError::NotFound(name.to_string()))
    }

    /// ヘッダーの値を文字列で取得 (存在しない場合は None)
    pub fn try_get_values(&mut self, name: &str) -> Option<Vec<String>> {
        let name = HeaderName::new(name).ok()?;
        self.parse_entry(&name);
        self.entry(&name).map(|entry| entry.value_strings())
    }

    /// ヘッダーの値を 1 行分の文字列で取得
    pub fn header_string(&mut self, name: &str) -> Option<String> {
        let name = HeaderName::new(name).ok()?;
        self.parse_entry(&name);
        self.entry(&name).map(|entry| entry.joined_values())
    }

    /// パース済み値を取得
    ///
    /// 1 つの場合は [`ParsedValues::Single`]、2 つ以上の場合は
    /// [`ParsedValues::Multiple`]、パース済み値がない場合は None。
    pub fn get_parsed_values(&mut self, name: &str) -> Option<ParsedValues> {
        let name = HeaderName::new(name).ok()?;
        self.parse_entry(&name);
        let entry = self.entry(&name)?;
        match entry.parsed_values.as_slice() {
            [] => None,
            [value] => Some(ParsedValues::Single(value.clone())),
            values => Some(ParsedValues::Multiple(values.to_vec())),
        }
    }

    /// パース済み値の数
    pub fn parsed_value_count(&mut self, name: &str) -> usize {
        let Ok(name) = HeaderName::new(name) else {
            return 0;
        };
        self.parse_entry(&name);
        self.entry(&name).map_or(0, |entry| entry.parsed_values.len())
    }

    /// パース済み値を追加
    ///
    /// 値の種類はヘッダーのパーサーと一致しなければならない。
    /// カスタムヘッダーには [`HeaderValue::Text`] のみ追加できる。
    pub fn add_parsed_value(&mut self, name: &str, value: HeaderValue) -> Result<(), HeaderError> {
        let name = self.check_name(name)?;
        self.check_value_kind(&name, &value)?;
        self.parse_entry(&name);

        if self.entry(&name).is_some_and(|entry| !entry.can_add_parsed()) {
            return Err(HeaderError::SingleValueHeader(name.to_string()));
        }
        self.entry_mut(name).parsed_values.push(value);
        Ok(())
    }

    /// パース済み値で置き換える (既存の値はすべて削除する)
    pub fn set_parsed_value(&mut self, name: &str, value: HeaderValue) -> Result<(), HeaderError> {
        let name = self.check_name(name)?;
        self.check_value_kind(&name, &value)?;

        let entry = self.entry_mut(name);
        entry.raw_values.clear();
        entry.invalid_values.clear();
        entry.parsed_values.clear();
        entry.parsed_values.push(value);
        Ok(())
    }

    /// パース済み値を 1 つ削除
    ///
    /// ヘッダーの比較関数で最初に一致した値を削除し、削除した場合は true を返す。
    /// 値がなくなったヘッダーは削除する。
    pub fn remove_parsed_value(
        &mut self,
        name: &str,
        value: &HeaderValue,
    ) -> Result<bool, HeaderError> {
        let name = self.check_name(name)?;
        if !self.parse_entry(&name) {
            return Ok(false);
        }

        let Some(entries) = self.entries.as_mut() else {
            return Ok(false);
        };
        let Some(entry) = entries.get_mut(&name) else {
            return Ok(false);
        };
        let Some(position) = entry.position_of(value) else {
            return Ok(false);
        };

        entry.parsed_values.remove(position);
        if entry.value_count() == 0 {
            entries.shift_remove(&name);
        }
        Ok(true)
    }

    /// パース済み値を含むか
    pub fn contains_parsed_value(&mut self, name: &str, value: &HeaderValue) -> bool {
        let Ok(name) = HeaderName::new(name) else {
            return false;
        };
        self.parse_entry(&name);
        self.entry(&name)
            .is_some_and(|entry| entry.position_of(value).is_some())
    }

    /// 別のストアのヘッダーを追加
    ///
    /// 既にこのストアにあるヘッダー名はコピーしない (値は結合しない)。
    /// コピー元の未パースの値は先にパースし、値が残らなかったヘッダーは
    /// コピー元からも削除する。このストアで禁止されているヘッダーはスキップする。
    pub fn add_headers(&mut self, source: &mut HeaderStore) {
        let Some(source_entries) = source.entries.as_mut() else {
            return;
        };

        let mut emptied = Vec::new();
        for (name, source_entry) in source_entries.iter_mut() {
            if self
                .entries
                .as_ref()
                .is_some_and(|entries| entries.contains_key(name))
            {
                continue;
            }

            source_entry.parse_raw_values(name);
            if source_entry.is_empty() {
                emptied.push(name.clone());
                continue;
            }

            if self.registry.is_disallowed(name) {
                debug!(
                    header = %name,
                    category = self.registry.label(),
                    "skipping header disallowed in destination"
                );
                continue;
            }

            let parser = self.registry.parser(name);
            if parser == source_entry.parser {
                let entry = self.entry_mut(name.clone());
                entry.parsed_values = source_entry.parsed_values.clone();
                entry.invalid_values = source_entry.invalid_values.clone();
            } else {
                // パーサーが異なる場合は文字列として渡し、このストアのパーサーでパースする
                let entry = self.entry_mut(name.clone());
                entry.raw_values = source_entry.value_strings();
            }
        }

        for name in emptied {
            debug!(header = %name, "removing empty header after parsing");
            source_entries.shift_remove(&name);
        }
    }

    /// すべてのヘッダーを (名前, 値) で列挙
    ///
    /// 未パースの値をすべてパースし、値が残らなかったヘッダーは削除する。
    pub fn iter(&mut self) -> impl Iterator<Item = (&HeaderName, Vec<String>)> + '_ {
        self.parse_all();
        self.entries
            .iter()
            .flat_map(|entries| entries.iter())
            .map(|(name, entry)| (name, entry.value_strings()))
    }

    fn parse_all(&mut self) {
        let Some(entries) = self.entries.as_mut() else {
            return;
        };
        entries.retain(|name, entry| {
            entry.parse_raw_values(name);
            if entry.is_empty() {
                debug!(header = %name, "removing empty header after parsing");
                return false;
            }
            true
        });
    }

    /// ヘッダーの未パースの値をパースし、ヘッダーが残っているかを返す
    fn parse_entry(&mut self, name: &HeaderName) -> bool {
        let Some(entries) = self.entries.as_mut() else {
            return false;
        };
        let Some(entry) = entries.get_mut(name) else {
            return false;
        };

        entry.parse_raw_values(name);
        if entry.is_empty() {
            debug!(header = %name, "removing empty header after parsing");
            entries.shift_remove(name);
            return false;
        }
        true
    }

    fn entry(&self, name: &HeaderName) -> Option<&HeaderEntry> {
        self.entries.as_ref()?.get(name)
    }

    fn entry_mut(&mut self, name: HeaderName) -> &mut HeaderEntry {
        let parser = self.registry.parser(&name);
        self.entries
            .get_or_insert_with(IndexMap::new)
            .entry(name)
            .or_insert_with(|| HeaderEntry::new(parser))
    }

    fn check_name(&self, name: &str) -> Result<HeaderName, HeaderError> {
        let name = HeaderName::new(name)?;
        if self.registry.is_disallowed(&name) {
            return Err(HeaderError::Disallowed {
                name: name.to_string(),
                category: self.registry.label(),
            });
        }
        Ok(name)
    }

    fn check_value_kind(&self, name: &HeaderName, value: &HeaderValue) -> Result<(), HeaderError> {
        if value.is_empty_value() {
            return Err(HeaderError::MissingValue);
        }
        let accepted = match self.registry.parser(name) {
            Some(parser) => parser.accepts(value),
            None => matches!(value, HeaderValue::Text(text) if !grammar::contains_header_splitting(text)),
        };
        if !accepted {
            return Err(HeaderError::ValueKindMismatch(name.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for HeaderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(entries) = &self.entries else {
            return Ok(());
        };

        for (name, entry) in entries {
            let mut entry = entry.clone();
            entry.parse_raw_values(name);
            let values = entry.value_strings();
            if values.is_empty() {
                continue;
            }
            write!(f, "{}: {}\r\n", name, values.join(entry.separator()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_array::ByteArrayHeaderValue;
    use crate::cache_control::CacheControlHeaderValue;
    use crate::error::ErrorKind;
    use crate::transfer_coding::TransferCodingHeaderValue;
    use tracing_test::traced_test;

    fn store() -> HeaderStore {
        HeaderStore::default()
    }

    #[test]
    fn test_uninitialized() {
        let mut headers = store();
        assert!(!headers.is_initialized());
        assert!(headers.is_empty());
        assert!(!headers.contains("Via"));
        assert_eq!(headers.to_string(), "");
    }

    #[test]
    fn test_case_insensitive_names() {
        let mut headers = store();
        headers
            .add_without_validation("Content-Type", "text/plain")
            .unwrap();
        assert!(headers.contains("content-type"));
        assert!(headers.contains("CONTENT-TYPE"));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.to_string(), "Content-Type: text/plain\r\n");
        assert!(headers.remove("CONTENT-type").unwrap());
        assert!(!headers.contains("Content-Type"));
    }

    #[test]
    fn test_invalid_names() {
        let mut headers = store();
        assert_eq!(
            headers.add_without_validation("", "x").unwrap_err().kind(),
            ErrorKind::Argument
        );
        assert_eq!(
            headers.add("Bad Name", "x").unwrap_err(),
            HeaderError::InvalidName("Bad Name".to_string())
        );
        assert!(headers.remove("a:b").is_err());
        assert!(!headers.is_initialized());
    }

    #[test]
    fn test_disallowed_names() {
        let mut headers = HeaderStore::new(Arc::new(HeaderRegistry::request()));
        let err = headers.add("Server", "nginx").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert_eq!(
            err,
            HeaderError::Disallowed {
                name: "Server".to_string(),
                category: "request",
            }
        );
        assert!(headers.add_without_validation("server", "nginx").is_err());
        assert!(headers.add("User-Agent", "curl/8.0").is_ok());
    }

    #[test]
    fn test_lazy_parsing() {
        let mut headers = store();
        headers.add_without_validation("Via", "1.1 a, 1.0 b").unwrap();
        headers.add_without_validation("Via", "2 c").unwrap();
        assert_eq!(headers.parsed_value_count("Via"), 3);
        assert_eq!(
            headers.header_string("via").unwrap(),
            "1.1 a, 1.0 b, 2 c"
        );
    }

    #[test]
    fn test_invalid_value_is_kept_verbatim() {
        let mut headers = store();
        headers.add_without_validation("Via", "1.1 a").unwrap();
        headers.add_without_validation("Via", "garbage").unwrap();
        headers.add_without_validation("Via", "1.0 b").unwrap();
        assert_eq!(
            headers.get_values("Via").unwrap(),
            vec!["1.1 a", "1.0 b", "garbage"]
        );
        assert_eq!(headers.to_string(), "Via: 1.1 a, 1.0 b, garbage\r\n");
    }

    #[test]
    fn test_one_invalid_item_invalidates_raw_string() {
        let mut headers = store();
        headers
            .add_without_validation("Connection", "keep-alive, ba d")
            .unwrap();
        assert_eq!(headers.parsed_value_count("Connection"), 0);
        assert_eq!(
            headers.get_values("Connection").unwrap(),
            vec!["keep-alive, ba d"]
        );
    }

    #[test]
    fn test_single_value_header() {
        let mut headers = store();
        headers
            .add_without_validation("Content-Type", "text/plain")
            .unwrap();
        headers
            .add_without_validation("Content-Type", "text/html")
            .unwrap();
        let values = headers.get_values("Content-Type").unwrap();
        assert_eq!(values, vec!["text/plain", "text/html"]);
        assert_eq!(headers.parsed_value_count("Content-Type"), 1);

        let mut headers = store();
        headers.add("Content-Type", "text/plain").unwrap();
        let err = headers.add("Content-Type", "text/html").unwrap_err();
        assert_eq!(err, HeaderError::SingleValueHeader("Content-Type".to_string()));
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(headers.get_values("Content-Type").unwrap(), vec!["text/plain"]);
    }

    #[test]
    fn test_strict_add_is_atomic() {
        let mut headers = store();
        headers.add("Connection", "close").unwrap();
        let err = headers.add("Connection", "keep-alive, a b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(headers.get_values("Connection").unwrap(), vec!["close"]);

        // 新しいヘッダーは作成されない
        assert!(headers.add("Via", "garbage").is_err());
        assert!(!headers.contains("Via"));
        assert!(!headers.try_add("Content-Length", "-1"));
        assert!(!headers.contains("Content-Length"));
    }

    #[test]
    fn test_add_parses_pending_values_first() {
        let mut headers = store();
        headers
            .add_without_validation("Content-Type", "text/plain")
            .unwrap();
        assert!(headers.add("Content-Type", "text/html").is_err());
    }

    #[test]
    fn test_header_splitting() {
        let mut headers = store();
        headers
            .add_without_validation("X-Custom", "value\r\nInjected: 1")
            .unwrap();
        headers
            .add_without_validation("Via", "1.1 a\r\nX: y")
            .unwrap();
        assert_eq!(headers.try_get_values("X-Custom"), None);
        assert_eq!(headers.try_get_values("Via"), None);
        assert_eq!(headers.to_string(), "");

        headers.add_without_validation("X-Custom", "a\r\n b").unwrap();
        assert_eq!(headers.get_values("X-Custom").unwrap(), vec!["a\r\n b"]);

        let err = headers.add("X-Other", "a\nb").unwrap_err();
        assert_eq!(err, HeaderError::InvalidNewLine("X-Other".to_string()));
        assert!(headers.add("Via", "1.1 a\r\nX: y").is_err());
        assert!(!headers.contains("Via"));

        // LF を伴わない CR
        let err = headers.add("X-A", "v\rInjected: 1").unwrap_err();
        assert_eq!(err, HeaderError::InvalidNewLine("X-A".to_string()));
        headers
            .add_without_validation("X-B", "v\rInjected: 2")
            .unwrap();
        assert!(!headers.contains("X-A"));
        assert!(!headers.contains("X-B"));
        assert_eq!(headers.to_string(), "X-Custom: a\r\n b\r\n");
    }

    #[test]
    fn test_header_splitting_keeps_other_values() {
        let mut headers = store();
        headers.add_without_validation("Via", "1.1 a").unwrap();
        headers.add_without_validation("Via", "1.1 b\nX: y").unwrap();
        assert_eq!(headers.get_values("Via").unwrap(), vec!["1.1 a"]);
    }

    #[test]
    fn test_empty_value_elision() {
        let mut headers = store();
        headers.add_without_validation("Connection", None).unwrap();
        headers.add_without_validation("Cache-Control", "").unwrap();
        headers.add("Via", "").unwrap();
        assert!(!headers.contains("Connection"));
        assert!(!headers.contains("Via"));
        assert_eq!(headers.iter().count(), 0);
        assert_eq!(headers.to_string(), "");
    }

    #[test]
    fn test_custom_header_keeps_empty_string() {
        let mut headers = store();
        headers.add_without_validation("X-Empty", None).unwrap();
        headers.add("X-Empty", "").unwrap();
        assert_eq!(headers.get_values("X-Empty").unwrap(), vec!["", ""]);
        assert_eq!(headers.to_string(), "X-Empty: , \r\n");
    }

    #[test]
    fn test_get_values_not_found() {
        let mut headers = store();
        assert_eq!(
            headers.get_values("Via").unwrap_err(),
            HeaderError::NotFound("Via".to_string())
        );
        assert_eq!(headers.try_get_values("Via"), None);
        assert_eq!(headers.header_string("Via"), None);
    }

    #[test]
    fn test_get_parsed_values() {
        let mut headers = store();
        assert_eq!(headers.get_parsed_values("Connection"), None);

        headers.add("Connection", "close").unwrap();
        assert_eq!(
            headers.get_parsed_values("Connection"),
            Some(ParsedValues::Single(HeaderValue::Token("close".to_string())))
        );

        headers.add("Connection", "upgrade").unwrap();
        let values = headers.get_parsed_values("Connection").unwrap().into_vec();
        assert_eq!(values.len(), 2);

        headers.add_without_validation("Content-Length", "abc").unwrap();
        assert_eq!(headers.get_parsed_values("Content-Length"), None);
        assert!(headers.contains("Content-Length"));
    }

    #[test]
    fn test_add_parsed_value() {
        let mut headers = store();
        headers
            .add_parsed_value("Content-Length", HeaderValue::Int64(10))
            .unwrap();
        let err = headers
            .add_parsed_value("Content-Length", HeaderValue::Int64(20))
            .unwrap_err();
        assert!(matches!(err, HeaderError::SingleValueHeader(_)));

        let err = headers
            .add_parsed_value("Via", HeaderValue::Token("x".to_string()))
            .unwrap_err();
        assert_eq!(err, HeaderError::ValueKindMismatch("Via".to_string()));

        let err = headers
            .add_parsed_value("X-Custom", HeaderValue::Int64(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        headers
            .add_parsed_value("X-Custom", HeaderValue::Text("v".to_string()))
            .unwrap();
        assert_eq!(headers.get_values("X-Custom").unwrap(), vec!["v"]);
    }

    #[test]
    fn test_parsed_value_rendering_empty_rejected() {
        let mut headers = store();
        let empty_cc = HeaderValue::CacheControl(CacheControlHeaderValue::new());
        let empty_md5 = HeaderValue::ByteArray(ByteArrayHeaderValue::new(vec![]));

        assert_eq!(
            headers.set_parsed_value("Cache-Control", empty_cc.clone()),
            Err(HeaderError::MissingValue)
        );
        assert_eq!(
            headers.add_parsed_value("Content-MD5", empty_md5),
            Err(HeaderError::MissingValue)
        );
        assert_eq!(
            headers.add_parsed_value("Connection", HeaderValue::Token(String::new())),
            Err(HeaderError::MissingValue)
        );
        assert!(!headers.contains("Cache-Control"));
        assert!(!headers.contains("Content-MD5"));
        assert_eq!(headers.to_string(), "");

        // カスタムヘッダーの空文字列は有効
        headers
            .add_parsed_value("X-Empty", HeaderValue::Text(String::new()))
            .unwrap();
        assert_eq!(headers.to_string(), "X-Empty: \r\n");

        // 出力が空の値は出力に含めない
        headers
            .entry_mut(HeaderName::new("Cache-Control").unwrap())
            .parsed_values
            .push(empty_cc);
        headers.add("Vary", "Accept").unwrap();
        headers
            .entry_mut(HeaderName::new("Vary").unwrap())
            .parsed_values
            .push(HeaderValue::Token(String::new()));
        assert_eq!(headers.header_string("Vary").as_deref(), Some("Accept"));
        assert_eq!(headers.to_string(), "X-Empty: \r\nVary: Accept\r\n");
    }

    #[test]
    fn test_set_parsed_value_replaces_everything() {
        let mut headers = store();
        headers.add_without_validation("Content-Length", "1").unwrap();
        headers.add_without_validation("Content-Length", "2").unwrap();
        headers.add_without_validation("Content-Length", "3").unwrap();
        headers
            .set_parsed_value("Content-Length", HeaderValue::Int64(42))
            .unwrap();
        assert_eq!(headers.get_values("Content-Length").unwrap(), vec!["42"]);
    }

    #[test]
    fn test_remove_parsed_value() {
        let mut headers = store();
        headers.add("Connection", "close, Upgrade, close").unwrap();
        let close = HeaderValue::Token("CLOSE".to_string());
        assert!(headers.contains_parsed_value("Connection", &close));
        assert!(headers.remove_parsed_value("Connection", &close).unwrap());
        assert_eq!(
            headers.get_values("Connection").unwrap(),
            vec!["Upgrade", "close"]
        );
        assert!(headers.remove_parsed_value("Connection", &close).unwrap());
        assert!(!headers.remove_parsed_value("Connection", &close).unwrap());

        let upgrade = HeaderValue::Token("upgrade".to_string());
        assert!(headers.remove_parsed_value("Connection", &upgrade).unwrap());
        assert!(!headers.contains("Connection"));
    }

    #[test]
    fn test_remove_parsed_value_keeps_invalid_values() {
        let mut headers = store();
        headers
            .add_without_validation("Transfer-Encoding", "chunked")
            .unwrap();
        headers
            .add_without_validation("Transfer-Encoding", "a b")
            .unwrap();
        let chunked = HeaderValue::from(TransferCodingHeaderValue::chunked());
        assert!(headers.remove_parsed_value("Transfer-Encoding", &chunked).unwrap());
        assert_eq!(
            headers.get_values("Transfer-Encoding").unwrap(),
            vec!["a b"]
        );
    }

    #[test]
    fn test_cache_control_folding() {
        let mut headers = store();
        headers
            .add_without_validation("Cache-Control", "no-cache=\"a\", max-age=1")
            .unwrap();
        headers
            .add_without_validation("Cache-Control", "no-cache=\"b\", max-age=2")
            .unwrap();
        headers
            .add_without_validation("Cache-Control", "max-age=x")
            .unwrap();
        assert_eq!(headers.parsed_value_count("Cache-Control"), 1);
        assert_eq!(
            headers.get_values("Cache-Control").unwrap(),
            vec!["no-cache=\"a, b\", max-age=2", "max-age=x"]
        );

        headers.add("Cache-Control", "no-store").unwrap();
        assert!(headers.add("Cache-Control", "max-age=-1").is_err());
        assert_eq!(
            headers.header_string("Cache-Control").unwrap(),
            "no-store, no-cache=\"a, b\", max-age=2, max-age=x"
        );
    }

    #[test]
    fn test_product_info_separator() {
        let mut headers = store();
        headers.add("User-Agent", "Mozilla/5.0").unwrap();
        headers.add("User-Agent", "(X11)").unwrap();
        assert_eq!(headers.to_string(), "User-Agent: Mozilla/5.0 (X11)\r\n");
    }

    #[test]
    fn test_render_keeps_insertion_order() {
        let mut headers = store();
        headers.add_without_validation("X-B", "2").unwrap();
        headers.add_without_validation("X-A", "1").unwrap();
        headers.add_without_validation("x-b", "3").unwrap();
        assert_eq!(headers.to_string(), "X-B: 2, 3\r\nX-A: 1\r\n");
        let names: Vec<_> = headers.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, vec!["X-B", "X-A"]);
    }

    #[test]
    fn test_display_does_not_parse_store() {
        let mut headers = store();
        headers.add_without_validation("Via", "garbage").unwrap();
        assert_eq!(headers.to_string(), "Via: garbage\r\n");
        // Display は複製をパースするため、ストアの状態は変わらない
        assert_eq!(headers.len(), 1);
        assert!(headers.contains("Via"));
    }

    #[test]
    fn test_clear() {
        let mut headers = store();
        headers.add("Via", "1.1 a").unwrap();
        headers.clear();
        assert!(headers.is_initialized());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_add_headers() {
        let mut source = store();
        source.add_without_validation("Via", "1.1 a").unwrap();
        source.add_without_validation("Via", "garbage").unwrap();
        source.add_without_validation("Connection", "close").unwrap();
        source
            .add_without_validation("X-Split", "a\r\nInjected: 1")
            .unwrap();

        let mut destination = store();
        destination.add("Connection", "keep-alive").unwrap();
        destination.add_headers(&mut source);

        assert_eq!(
            destination.get_values("Via").unwrap(),
            vec!["1.1 a", "garbage"]
        );
        assert_eq!(
            destination.get_values("Connection").unwrap(),
            vec!["keep-alive"]
        );
        assert!(!destination.contains("X-Split"));
        assert!(!source.contains("X-Split"));
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_add_headers_copies_values() {
        let mut source = store();
        source.add("Cache-Control", "max-age=1").unwrap();
        let mut destination = store();
        destination.add_headers(&mut source);
        destination.add("Cache-Control", "max-age=2").unwrap();
        assert_eq!(source.get_values("Cache-Control").unwrap(), vec!["max-age=1"]);
        assert_eq!(
            destination.get_values("Cache-Control").unwrap(),
            vec!["max-age=2"]
        );
    }

    #[traced_test]
    #[test]
    fn test_add_headers_skips_disallowed() {
        let mut source = store();
        source.add("Server", "nginx").unwrap();
        source.add("Via", "1.1 a").unwrap();

        let mut destination = HeaderStore::new(Arc::new(HeaderRegistry::request()));
        destination.add_headers(&mut source);
        assert_eq!(destination.len(), 1);
        assert!(logs_contain("skipping header disallowed in destination"));
    }

    #[test]
    fn test_add_headers_reparses_with_destination_parser() {
        let mut source = HeaderStore::new(Arc::new(HeaderRegistry::custom_only()));
        source.add_without_validation("Content-Length", "10").unwrap();
        source.add_without_validation("Content-Length", "x").unwrap();

        let mut destination = store();
        destination.add_headers(&mut source);
        assert_eq!(
            destination.get_parsed_values("Content-Length"),
            Some(ParsedValues::Single(HeaderValue::Int64(10)))
        );
        assert_eq!(
            destination.get_values("Content-Length").unwrap(),
            vec!["10", "x"]
        );
    }

    #[traced_test]
    #[test]
    fn test_invalid_value_is_traced() {
        let mut headers = store();
        headers.add_without_validation("Content-Length", "abc").unwrap();
        assert!(headers.contains("Content-Length"));
        assert!(logs_contain("failed to parse header value"));
    }
}
