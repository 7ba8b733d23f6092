#![no_main]

use libfuzzer_sys::fuzz_target;
use shiguredo_http_headers::CacheControlHeaderValue;

fuzz_target!(|data: &[u8]| {
    // UTF-8 文字列として解釈できる場合のみテスト
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(cc) = CacheControlHeaderValue::parse(s) {
            // 各種メソッド呼び出し
            let _ = cc.no_cache();
            let _ = cc.no_cache_headers();
            let _ = cc.max_age();
            let _ = cc.shared_max_age();
            let _ = cc.max_stale_limit();
            let _ = cc.private_headers();
            let _ = cc.extensions();

            // Display 実装のテスト
            let displayed = cc.to_string();

            // ラウンドトリップ
            if let Ok(reparsed) = CacheControlHeaderValue::parse(&displayed) {
                assert_eq!(cc.max_age(), reparsed.max_age());
                assert_eq!(cc.no_store(), reparsed.no_store());
                assert_eq!(cc.max_stale(), reparsed.max_stale());
            }
        }
    }
});
