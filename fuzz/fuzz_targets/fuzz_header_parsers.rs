#![no_main]

use libfuzzer_sys::fuzz_target;
use shiguredo_http_headers::HeaderParser;

const PARSERS: &[HeaderParser] = &[
    HeaderParser::Token,
    HeaderParser::TransferCoding,
    HeaderParser::MediaType,
    HeaderParser::MediaTypeWithQuality,
    HeaderParser::StringWithQuality,
    HeaderParser::NameValue,
    HeaderParser::ContentDisposition,
    HeaderParser::CacheControl,
    HeaderParser::Via,
    HeaderParser::Warning,
    HeaderParser::ByteArray,
    HeaderParser::Date,
    HeaderParser::Int64,
    HeaderParser::ProductInfo,
];

fuzz_target!(|data: &[u8]| {
    // UTF-8 文字列として解釈できる場合のみテスト
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    for parser in PARSERS {
        let Ok(values) = parser.parse_value(s) else {
            continue;
        };

        if !parser.supports_multiple_values() {
            assert!(values.len() <= 1);
        }
        for value in &values {
            assert!(parser.accepts(value));
        }

        // 出力を再パースできる場合は同じ数の値になる
        let separator = if parser.list_separator() == ' ' { " " } else { ", " };
        let rendered = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(separator);
        if let Ok(reparsed) = parser.parse_value(&rendered) {
            assert_eq!(values.len(), reparsed.len());
        }
    }
});
