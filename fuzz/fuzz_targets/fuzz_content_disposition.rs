#![no_main]

use libfuzzer_sys::fuzz_target;
use shiguredo_http_headers::ContentDispositionHeaderValue;

fuzz_target!(|data: &[u8]| {
    // UTF-8 文字列として解釈できる場合のみテスト
    if let Ok(s) = std::str::from_utf8(data) {
        // Content-Disposition パース
        if let Ok(cd) = ContentDispositionHeaderValue::parse(s) {
            // 各種メソッド呼び出し
            let _ = cd.disposition_type();
            let _ = cd.name();
            let _ = cd.file_name();
            let _ = cd.file_name_star();
            let _ = cd.creation_date();
            let _ = cd.modification_date();
            let _ = cd.read_date();
            let _ = cd.size();

            // Display 実装のテスト
            let displayed = cd.to_string();

            // ラウンドトリップ
            if let Ok(reparsed) = ContentDispositionHeaderValue::parse(&displayed) {
                assert_eq!(cd.disposition_type(), reparsed.disposition_type());
                assert_eq!(cd.file_name(), reparsed.file_name());
                assert_eq!(cd.size(), reparsed.size());
            }
        }
    }
});
