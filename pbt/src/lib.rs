//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// トークン生成 (RFC 9110 Section 5.6.2)
// ========================================

/// tchar から成るトークン (1-16 文字)
pub fn token() -> impl Strategy<Value = String> {
    "[A-Za-z0-9!#$%&'*+.^_`|~-]{1,16}".prop_map(|s| s)
}

/// ヘッダー名 (英字始まりのトークン)
pub fn header_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9-]{0,15}".prop_map(|s| s)
}

/// 大文字小文字をランダムに入れ替える
pub fn random_case(s: String) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), s.len()).prop_map(move |flags| {
        s.chars()
            .zip(flags)
            .map(|(c, upper)| {
                if upper {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    })
}

// ========================================
// 引用符付き文字列とコメント
// ========================================

/// 引用符付き文字列 (quoted-pair を含まない)
pub fn quoted_string() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ,;=/:.-]{0,16}".prop_map(|s| format!("\"{}\"", s))
}

/// コメント (入れ子なし)
pub fn comment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ;:./-]{0,16}".prop_map(|s| format!("({})", s))
}

/// ホスト名 (ドメイン、IPv4、IPv6 のいずれか)
pub fn host() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9-]{0,10}(\\.[a-z][a-z0-9-]{0,10}){0,2}".prop_map(|s| s),
        (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255)
            .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d)),
        Just("[::1]".to_string()),
    ]
}

// ========================================
// 数値
// ========================================

/// delta-seconds
pub fn delta_seconds() -> impl Strategy<Value = u64> {
    0u64..=u32::MAX as u64
}

/// 小数点以下 3 桁までの品質値
pub fn quality() -> impl Strategy<Value = f64> {
    (0u32..=1000).prop_map(|n| n as f64 / 1000.0)
}

/// 有効な日付 (年、月、日、時、分、秒)
pub fn date_parts() -> impl Strategy<Value = (u16, u8, u8, u8, u8, u8)> {
    (1970u16..=2100, 1u8..=12, 1u8..=28, 0u8..=23, 0u8..=59, 0u8..=59)
}

// ========================================
// 改行
// ========================================

/// 改行の直後が空白でない値、または LF を伴わない CR を含む値 (ヘッダー分割)
pub fn header_splitting_value() -> impl Strategy<Value = String> {
    (
        "[a-z0-9 ]{0,8}",
        prop_oneof![Just("\r\n"), Just("\n"), Just("\r")],
        "[A-Za-z][A-Za-z0-9:= ]{0,8}",
    )
        .prop_map(|(head, newline, tail)| format!("{}{}{}", head, newline, tail))
}
