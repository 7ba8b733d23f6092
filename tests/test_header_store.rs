//! ヘッダーストアの結合テスト
//!
//! 受信側 (`add_without_validation` で追加して読む) と送信側 (型付きの値を組み立てて出力する)
//! の両方のシナリオを、公開 API のみを使って確認する。

use std::sync::Arc;

use shiguredo_http_headers::{
    ByteArrayHeaderValue, CacheControlHeaderValue, ContentDispositionHeaderValue, DateError,
    ErrorKind, HeaderError, HeaderRegistry, HeaderStore, HeaderValue, HeaderValueCollection,
    NameValueHeaderValue, ParsedValues, TransferCodingHeaderValue, ViaHeaderValue,
};
use tracing_test::traced_test;

// ========================================
// Cache-Control
// ========================================

#[test]
fn test_cache_control_roundtrip() {
    let mut cc = CacheControlHeaderValue::new();
    cc.set_no_cache(true);
    cc.add_no_cache_header("Set-Cookie").unwrap();
    cc.add_no_cache_header("X-Token").unwrap();
    cc.set_max_age(Some(3600));
    cc.set_max_stale(true);
    cc.set_private(true);
    cc.add_extension(NameValueHeaderValue::with_value("community", "\"UCI\"").unwrap());

    let rendered = cc.to_string();
    assert_eq!(
        rendered,
        "no-cache=\"Set-Cookie, X-Token\", max-age=3600, max-stale, private, community=\"UCI\""
    );

    let reparsed = CacheControlHeaderValue::parse(&rendered).unwrap();
    assert_eq!(reparsed, cc);

    let mut headers = HeaderStore::default();
    headers.add_without_validation("Cache-Control", rendered.as_str()).unwrap();
    assert_eq!(headers.cache_control(), Some(cc));
    assert_eq!(headers.get_values("Cache-Control").unwrap(), vec![rendered]);
}

#[test]
fn test_cache_control_repeated_lines_fold() {
    let mut headers = HeaderStore::default();
    headers.add_without_validation("Cache-Control", "public").unwrap();
    headers
        .add_without_validation("Cache-Control", "max-age=10, s-maxage=20")
        .unwrap();
    headers.add_without_validation("Cache-Control", "max-age=30").unwrap();

    let cc = headers.cache_control().unwrap();
    assert!(cc.public());
    assert_eq!(cc.max_age(), Some(30));
    assert_eq!(cc.shared_max_age(), Some(20));
    assert_eq!(
        headers.to_string(),
        "Cache-Control: public, max-age=30, s-maxage=20\r\n"
    );
}

// ========================================
// Content-Disposition
// ========================================

#[test]
fn test_content_disposition_continuation_parameters_kept_literal() {
    let input = "attachment; filename*1=\"bar\"; filename*0=\"foo\"";
    let value = ContentDispositionHeaderValue::parse(input).unwrap();
    assert_eq!(value.disposition_type(), "attachment");
    assert_eq!(value.file_name(), None);
    assert_eq!(value.file_name_star(), None);
    assert_eq!(value.parameters().len(), 2);
    assert_eq!(value.parameters()[0].name(), "filename*1");
    assert_eq!(value.parameters()[0].value(), Some("\"bar\""));
    assert_eq!(value.to_string(), input);

    let mut headers = HeaderStore::default();
    headers.add("Content-Disposition", input).unwrap();
    assert_eq!(
        headers.get_values("Content-Disposition").unwrap(),
        vec![input]
    );
}

#[test]
fn test_content_disposition_file_name_star() {
    let mut value = ContentDispositionHeaderValue::new("attachment").unwrap();
    value.set_file_name_star(Some("résumé.pdf")).unwrap();
    let rendered = value.to_string();
    assert_eq!(rendered, "attachment; filename*=utf-8''r%C3%A9sum%C3%A9.pdf");

    let reparsed = ContentDispositionHeaderValue::parse(&rendered).unwrap();
    assert_eq!(reparsed.file_name_star().as_deref(), Some("résumé.pdf"));
}

// ========================================
// Via
// ========================================

#[test]
fn test_via_with_ipv6_received_by() {
    let via = ViaHeaderValue::parse("HTTP/1.1 [::1]").unwrap();
    assert_eq!(via.protocol_name(), Some("HTTP"));
    assert_eq!(via.protocol_version(), "1.1");
    assert_eq!(via.received_by(), "[::1]");
    assert_eq!(via.comment(), None);
    assert_eq!(via.to_string(), "HTTP/1.1 [::1]");

    let mut headers = HeaderStore::default();
    headers
        .add_without_validation("Via", "HTTP/1.1 [::1], 1.0 fred (Apache/1.1)")
        .unwrap();
    let values = headers.get_parsed_values("Via").unwrap().into_vec();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0], HeaderValue::Via(via));
}

// ========================================
// Content-MD5 (Base64)
// ========================================

#[test]
fn test_byte_array_rejects_trailing_separator() {
    assert!(ByteArrayHeaderValue::parse("AQ==,").is_err());
    assert_eq!(ByteArrayHeaderValue::parse("AQ==").unwrap().as_bytes(), &[1]);

    let mut headers = HeaderStore::default();
    let err = headers.add("Content-MD5", "AQ==,").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(!headers.contains("Content-MD5"));

    headers.add("Content-MD5", "AQ==").unwrap();
    assert_eq!(
        headers.get_parsed_values("Content-MD5"),
        Some(ParsedValues::Single(HeaderValue::ByteArray(
            ByteArrayHeaderValue::new(vec![1])
        )))
    );
}

// ========================================
// 特別値
// ========================================

#[test]
fn test_te_special_value_keeps_position() {
    let mut headers = HeaderStore::default();
    let mut te = HeaderValueCollection::<TransferCodingHeaderValue>::new(&mut headers, "TE")
        .unwrap()
        .with_special_value(TransferCodingHeaderValue::chunked());

    te.parse_add("bla1").unwrap();
    te.set_special_value().unwrap();
    te.parse_add("bla2").unwrap();
    assert_eq!(te.count(), 3);
    assert_eq!(te.special_value_state(), Some(true));

    assert_eq!(
        headers.header_string("TE").as_deref(),
        Some("bla1, chunked, bla2")
    );
}

#[test]
fn test_transfer_encoding_chunked_between_raw_values() {
    let mut headers = HeaderStore::default();
    headers
        .add_without_validation("Transfer-Encoding", "bla1")
        .unwrap();
    headers.set_transfer_encoding_chunked(Some(true)).unwrap();
    headers
        .add_without_validation("Transfer-Encoding", "bla2")
        .unwrap();

    // 後から追加した未パースの値はパース済みの値の後ろに並ぶ
    assert_eq!(
        headers.header_string("Transfer-Encoding").as_deref(),
        Some("bla1, chunked, bla2")
    );
    assert_eq!(headers.transfer_encoding_chunked(), Some(true));
    assert_eq!(headers.parsed_value_count("Transfer-Encoding"), 3);
    assert_eq!(
        headers.to_string(),
        "Transfer-Encoding: bla1, chunked, bla2\r\n"
    );

    headers.set_transfer_encoding_chunked(None).unwrap();
    assert_eq!(
        headers.header_string("Transfer-Encoding").as_deref(),
        Some("bla1, bla2")
    );
    assert_eq!(headers.transfer_encoding_chunked(), Some(false));
}

// ========================================
// 単一値ヘッダー
// ========================================

#[test]
fn test_content_type_added_twice() {
    let mut headers = HeaderStore::default();
    headers
        .add_without_validation("Content-Type", "text/plain")
        .unwrap();
    headers
        .add_without_validation("Content-Type", "text/html")
        .unwrap();

    let parsed = headers.get_parsed_values("Content-Type").unwrap();
    assert!(matches!(parsed, ParsedValues::Single(HeaderValue::MediaType(_))));
    assert_eq!(
        headers.get_values("Content-Type").unwrap(),
        vec!["text/plain", "text/html"]
    );
    assert_eq!(
        headers.content_type().unwrap().media_type(),
        "text/plain"
    );

    let mut headers = HeaderStore::default();
    headers.add("Content-Type", "text/plain").unwrap();
    assert_eq!(
        headers.add("Content-Type", "text/html").unwrap_err(),
        HeaderError::SingleValueHeader("Content-Type".to_string())
    );
}

// ========================================
// ヘッダー分割と空のヘッダー
// ========================================

#[traced_test]
#[test]
fn test_header_splitting_rejected() {
    let mut headers = HeaderStore::default();
    headers
        .add_without_validation("Location", "/ok\r\nSet-Cookie: evil=1")
        .unwrap();
    headers
        .add_without_validation("Warning", "199 - \"a\"\nX: y")
        .unwrap();
    headers
        .add_without_validation("X-Folded", "first\r\n\tsecond")
        .unwrap();

    assert!(!headers.contains("Location"));
    assert!(!headers.contains("Warning"));
    assert!(headers.contains("X-Folded"));
    assert!(logs_contain("dropping value containing header splitting"));

    assert_eq!(
        headers.add("X-Custom", "ok\r\nInjected: 1").unwrap_err().kind(),
        ErrorKind::Format
    );

    // LF を伴わない CR も分割とみなす
    assert_eq!(
        headers.add("X-A", "v\rInjected: 1").unwrap_err(),
        HeaderError::InvalidNewLine("X-A".to_string())
    );
    headers
        .add_without_validation("X-B", "v\rInjected: 2")
        .unwrap();
    assert!(!headers.contains("X-B"));
    assert_eq!(headers.to_string(), "X-Folded: first\r\n\tsecond\r\n");
}

#[traced_test]
#[test]
fn test_empty_headers_removed() {
    let mut headers = HeaderStore::default();
    headers.add_without_validation("Accept", ",,").unwrap();
    headers.add_without_validation("Vary", " ").unwrap();
    headers.add_without_validation("Allow", None).unwrap();
    headers.add_without_validation("Age", "").unwrap();

    assert_eq!(headers.len(), 4);
    assert_eq!(headers.to_string(), "Age: \r\n");
    assert_eq!(headers.iter().count(), 1);
    assert_eq!(headers.len(), 1);
    assert!(logs_contain("removing empty header after parsing"));
}

#[test]
fn test_values_rendering_empty_rejected() {
    let mut headers = HeaderStore::default();
    assert_eq!(
        headers.set_parsed_value(
            "Cache-Control",
            HeaderValue::CacheControl(CacheControlHeaderValue::new())
        ),
        Err(HeaderError::MissingValue)
    );
    assert_eq!(
        headers.add_parsed_value(
            "Content-MD5",
            HeaderValue::ByteArray(ByteArrayHeaderValue::new(vec![]))
        ),
        Err(HeaderError::MissingValue)
    );
    assert_eq!(
        headers.set_cache_control(Some(CacheControlHeaderValue::new())),
        Err(HeaderError::MissingValue)
    );
    assert_eq!(headers.to_string(), "");
}

#[test]
fn test_strict_add_reports_date_error() {
    let mut headers = HeaderStore::default();
    let err = headers
        .add("Last-Modified", "Mon, 06 Nov 1994 08:49:37 GMT")
        .unwrap_err();
    assert_eq!(err, HeaderError::Date(DateError::DayOfWeekMismatch));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(!headers.contains("Last-Modified"));

    headers
        .add("Last-Modified", "Sun, 06 Nov 1994 08:49:37 GMT")
        .unwrap();
    assert_eq!(
        headers.to_string(),
        "Last-Modified: Sun, 06 Nov 1994 08:49:37 GMT\r\n"
    );
}

// ========================================
// 設定
// ========================================

#[test]
fn test_disallowed_headers() {
    let mut request = HeaderStore::new(Arc::new(HeaderRegistry::request()));
    let err = request.add("Server", "nginx").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    assert_eq!(
        err.to_string(),
        "header Server is not allowed in request headers"
    );

    let registry = HeaderRegistry::standard().with_disallowed("X-Internal").unwrap();
    let mut headers = HeaderStore::new(Arc::new(registry));
    assert!(headers.add_without_validation("x-internal", "1").is_err());
    assert!(headers.add("Server", "nginx").is_ok());
}

#[test]
fn test_shared_registry() {
    let registry = Arc::new(HeaderRegistry::response());
    let mut a = HeaderStore::new(Arc::clone(&registry));
    let mut b = HeaderStore::new(Arc::clone(&registry));
    a.add("Age", "1").unwrap();
    b.add("Age", "2").unwrap();
    assert_eq!(a.get_values("Age").unwrap(), vec!["1"]);
    assert_eq!(b.get_values("Age").unwrap(), vec!["2"]);
    assert_eq!(Arc::strong_count(&registry), 3);
}

// ========================================
// ストア間のコピー
// ========================================

#[test]
fn test_add_headers_between_stores() {
    let mut message = HeaderStore::default();
    message.add_without_validation("Content-Length", "12").unwrap();
    message.add_without_validation("Server", "nginx").unwrap();
    message.add_without_validation("Via", "1.1 a").unwrap();

    let mut content = HeaderStore::new(Arc::new(HeaderRegistry::content()));
    content.add_headers(&mut message);

    assert_eq!(content.get_values("Content-Length").unwrap(), vec!["12"]);
    assert!(!content.contains("Via"));
    assert!(!content.contains("Server"));

    // コピー元は変わらない
    assert_eq!(message.len(), 3);
}

#[test]
fn test_add_headers_existing_names_are_not_merged() {
    let mut source = HeaderStore::default();
    source.add("Vary", "Accept").unwrap();
    source.add("Allow", "GET").unwrap();

    let mut destination = HeaderStore::default();
    destination.add("Vary", "Cookie").unwrap();
    destination.add_headers(&mut source);

    assert_eq!(
        destination.to_string(),
        "Vary: Cookie\r\nAllow: GET\r\n"
    );
}
