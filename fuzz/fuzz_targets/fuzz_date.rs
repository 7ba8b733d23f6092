#![no_main]

use libfuzzer_sys::fuzz_target;
use shiguredo_http_headers::HttpDate;

fuzz_target!(|data: &[u8]| {
    // UTF-8 文字列として解釈できる場合のみテスト
    if let Ok(s) = std::str::from_utf8(data) {
        // HTTP-date パース
        if let Ok(date) = HttpDate::parse(s) {
            // Display は IMF-fixdate を出力し、必ず再パースできる
            let displayed = date.to_string();
            let reparsed = HttpDate::parse(&displayed).unwrap();
            assert_eq!(date, reparsed);
            assert_eq!(date.day_of_week(), reparsed.day_of_week());
        }
    }
});
