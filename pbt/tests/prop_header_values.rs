//! 型付きヘッダー値のプロパティテスト
//!
//! API で組み立てた値は、出力を再パースすると同じ値になる。

use pbt::{comment, date_parts, delta_seconds, host, quality, quoted_string, token};
use proptest::prelude::*;
use shiguredo_http_headers::{
    ByteArrayHeaderValue, CacheControlHeaderValue, ContentDispositionHeaderValue, HttpDate,
    MediaTypeHeaderValue, NameValueHeaderValue, ProductInfoHeaderValue,
    StringWithQualityHeaderValue, TransferCodingHeaderValue, ViaHeaderValue, WarningHeaderValue,
};

// ========================================
// Strategy 定義
// ========================================

// パラメータ値 (トークンまたは引用符付き文字列)
fn parameter_value() -> impl Strategy<Value = String> {
    prop_oneof![token(), quoted_string()]
}

// パラメータ (名前は重複しない)
fn parameters() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec((token(), parameter_value()), 0..4).prop_map(|params| {
        let mut seen: Vec<String> = Vec::new();
        params
            .into_iter()
            .filter(|(name, _)| {
                let lower = name.to_ascii_lowercase();
                if lower == "q" || seen.contains(&lower) {
                    return false;
                }
                seen.push(lower);
                true
            })
            .collect()
    })
}

fn optional_seconds() -> impl Strategy<Value = Option<u64>> {
    proptest::option::of(delta_seconds())
}

// Cache-Control の拡張ディレクティブ (既知のディレクティブ名は除く)
fn cache_extension() -> impl Strategy<Value = NameValueHeaderValue> {
    ("x-[a-z]{1,8}", proptest::option::of(parameter_value())).prop_map(|(name, value)| {
        match value {
            Some(value) => NameValueHeaderValue::with_value(&name, &value).unwrap(),
            None => NameValueHeaderValue::new(&name).unwrap(),
        }
    })
}

prop_compose! {
    fn cache_control()(
        flags in proptest::collection::vec(any::<bool>(), 9),
        max_age in optional_seconds(),
        shared_max_age in optional_seconds(),
        max_stale_limit in optional_seconds(),
        min_fresh in optional_seconds(),
        no_cache_headers in proptest::collection::vec(token(), 0..3),
        private_headers in proptest::collection::vec(token(), 0..3),
        extensions in proptest::collection::vec(cache_extension(), 0..3),
    ) -> CacheControlHeaderValue {
        let mut cc = CacheControlHeaderValue::new();
        cc.set_no_store(flags[0]);
        cc.set_no_transform(flags[1]);
        cc.set_only_if_cached(flags[2]);
        cc.set_public(flags[3]);
        cc.set_must_revalidate(flags[4]);
        cc.set_proxy_revalidate(flags[5]);
        cc.set_max_age(max_age);
        cc.set_shared_max_age(shared_max_age);
        cc.set_min_fresh(min_fresh);
        if flags[6] {
            cc.set_max_stale(true);
            cc.set_max_stale_limit(max_stale_limit);
        }
        if flags[7] {
            cc.set_no_cache(true);
            for name in &no_cache_headers {
                cc.add_no_cache_header(name).unwrap();
            }
        }
        if flags[8] {
            cc.set_private(true);
            for name in &private_headers {
                cc.add_private_header(name).unwrap();
            }
        }
        for extension in extensions {
            cc.add_extension(extension);
        }
        cc
    }
}

// ========================================
// Cache-Control
// ========================================

proptest! {
    #[test]
    fn prop_cache_control_roundtrip(cc in cache_control()) {
        let rendered = cc.to_string();
        let parsed = CacheControlHeaderValue::parse(&rendered);
        // 何も設定されていない場合は空文字列になり、パースできない
        if rendered.is_empty() {
            prop_assert!(parsed.is_err());
        } else {
            prop_assert_eq!(parsed.unwrap(), cc);
        }
    }

    #[test]
    fn prop_cache_control_last_duration_wins(a in delta_seconds(), b in delta_seconds()) {
        let cc = CacheControlHeaderValue::parse(&format!("max-age={}, max-age={}", a, b)).unwrap();
        prop_assert_eq!(cc.max_age(), Some(b));
    }
}

// ========================================
// メディアタイプ
// ========================================

proptest! {
    #[test]
    fn prop_media_type_roundtrip(
        media_type in (token(), token()).prop_map(|(t, s)| format!("{}/{}", t, s)),
        params in parameters(),
    ) {
        let mut mt = MediaTypeHeaderValue::new(&media_type).unwrap();
        for (name, value) in &params {
            mt.set_parameter(name, Some(value)).unwrap();
        }
        let parsed = MediaTypeHeaderValue::parse(&mt.to_string()).unwrap();
        prop_assert_eq!(parsed.media_type(), media_type.as_str());
        prop_assert_eq!(parsed, mt);
    }

    #[test]
    fn prop_media_type_case_insensitive(
        t in "[a-z]{1,8}",
        s in "[a-z]{1,8}",
    ) {
        let lower = MediaTypeHeaderValue::new(&format!("{}/{}", t, s)).unwrap();
        let upper = MediaTypeHeaderValue::new(&format!("{}/{}", t, s).to_ascii_uppercase()).unwrap();
        prop_assert_eq!(lower, upper);
    }
}

// ========================================
// 品質値
// ========================================

proptest! {
    #[test]
    fn prop_string_with_quality_roundtrip(value in token(), q in quality()) {
        let v = StringWithQualityHeaderValue::with_quality(&value, q).unwrap();
        let parsed = StringWithQualityHeaderValue::parse(&v.to_string()).unwrap();
        prop_assert_eq!(parsed.value(), value.as_str());
        prop_assert_eq!(parsed.quality(), Some(q));
    }

    #[test]
    fn prop_quality_out_of_range_rejected(q in 1.001f64..100.0) {
        prop_assert!(StringWithQualityHeaderValue::with_quality("gzip", q).is_err());
    }
}

// ========================================
// 転送コーディング
// ========================================

proptest! {
    #[test]
    fn prop_transfer_coding_roundtrip(value in token(), params in parameters()) {
        let mut coding = TransferCodingHeaderValue::new(&value).unwrap();
        for (name, v) in &params {
            coding
                .parameters_mut()
                .push(NameValueHeaderValue::with_value(name, v).unwrap());
        }
        let parsed = TransferCodingHeaderValue::parse(&coding.to_string()).unwrap();
        prop_assert_eq!(parsed.is_chunked(), value.eq_ignore_ascii_case("chunked"));
        prop_assert_eq!(parsed, coding);
    }
}

// ========================================
// Via / Warning
// ========================================

proptest! {
    #[test]
    fn prop_via_roundtrip(
        protocol_name in proptest::option::of(token()),
        protocol_version in token(),
        received_by in host(),
        comment in proptest::option::of(comment()),
    ) {
        let mut via = ViaHeaderValue::new(&protocol_version, &received_by).unwrap();
        if let Some(name) = &protocol_name {
            via = via.with_protocol_name(name).unwrap();
        }
        if let Some(comment) = &comment {
            via = via.with_comment(comment).unwrap();
        }
        let parsed = ViaHeaderValue::parse(&via.to_string()).unwrap();
        prop_assert_eq!(parsed.protocol_name(), protocol_name.as_deref());
        prop_assert_eq!(parsed.received_by(), received_by.as_str());
        prop_assert_eq!(parsed, via);
    }

    #[test]
    fn prop_warning_roundtrip(
        code in 0u16..=999,
        agent in host(),
        text in quoted_string(),
        date in proptest::option::of(date_parts()),
    ) {
        let mut warning = WarningHeaderValue::new(code, &agent, &text).unwrap();
        if let Some((y, mo, d, h, mi, s)) = date {
            warning = warning.with_date(HttpDate::new(y, mo, d, h, mi, s).unwrap());
        }
        let rendered = warning.to_string();
        prop_assert_eq!(&rendered[..3], format!("{:03}", code));
        prop_assert_eq!(WarningHeaderValue::parse(&rendered).unwrap(), warning);
    }
}

// ========================================
// 製品情報
// ========================================

proptest! {
    #[test]
    fn prop_product_roundtrip(name in token(), version in proptest::option::of(token())) {
        let product = ProductInfoHeaderValue::product(&name, version.as_deref()).unwrap();
        prop_assert_eq!(ProductInfoHeaderValue::parse(&product.to_string()).unwrap(), product);
    }

    #[test]
    fn prop_product_comment_roundtrip(c in comment()) {
        let product = ProductInfoHeaderValue::comment(&c).unwrap();
        prop_assert_eq!(product.to_string(), c.clone());
        prop_assert_eq!(ProductInfoHeaderValue::parse(&c).unwrap(), product);
    }
}

// ========================================
// Content-Disposition / Base64 / HTTP-date
// ========================================

proptest! {
    #[test]
    fn prop_file_name_star_roundtrip(name in "\\PC{1,16}") {
        let mut value = ContentDispositionHeaderValue::new("attachment").unwrap();
        value.set_file_name_star(Some(&name)).unwrap();
        let parsed = ContentDispositionHeaderValue::parse(&value.to_string()).unwrap();
        prop_assert_eq!(parsed.file_name_star(), Some(name));
    }

    #[test]
    fn prop_size_roundtrip(size in any::<u64>()) {
        let mut value = ContentDispositionHeaderValue::new("inline").unwrap();
        value.set_size(Some(size)).unwrap();
        let parsed = ContentDispositionHeaderValue::parse(&value.to_string()).unwrap();
        prop_assert_eq!(parsed.size(), Some(size));
    }

    #[test]
    fn prop_byte_array_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 1..64)) {
        let value = ByteArrayHeaderValue::new(bytes.clone());
        let parsed = ByteArrayHeaderValue::parse(&value.to_string()).unwrap();
        prop_assert_eq!(parsed.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn prop_http_date_roundtrip((y, mo, d, h, mi, s) in date_parts()) {
        let date = HttpDate::new(y, mo, d, h, mi, s).unwrap();
        let parsed = HttpDate::parse(&date.to_string()).unwrap();
        prop_assert_eq!(parsed.day_of_week(), date.day_of_week());
        prop_assert_eq!(parsed, date);
    }
}
