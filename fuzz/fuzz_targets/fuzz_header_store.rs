#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shiguredo_http_headers::grammar::contains_header_splitting;
use shiguredo_http_headers::{HeaderRegistry, HeaderStore};

#[derive(Arbitrary, Debug)]
enum Registry {
    Standard,
    Request,
    Response,
    Content,
    CustomOnly,
}

#[derive(Arbitrary, Debug)]
enum Operation {
    AddWithoutValidation(String, String),
    Add(String, String),
    Remove(String),
    Contains(String),
    GetValues(String),
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    source: Registry,
    destination: Registry,
    operations: Vec<Operation>,
}

fn registry(kind: &Registry) -> Arc<HeaderRegistry> {
    Arc::new(match kind {
        Registry::Standard => HeaderRegistry::standard(),
        Registry::Request => HeaderRegistry::request(),
        Registry::Response => HeaderRegistry::response(),
        Registry::Content => HeaderRegistry::content(),
        Registry::CustomOnly => HeaderRegistry::custom_only(),
    })
}

fuzz_target!(|input: FuzzInput| {
    let mut headers = HeaderStore::new(registry(&input.source));

    for operation in &input.operations {
        match operation {
            Operation::AddWithoutValidation(name, value) => {
                let _ = headers.add_without_validation(name, value.as_str());
            }
            Operation::Add(name, value) => {
                let before = headers.to_string();
                if headers.add(name, value.as_str()).is_err() {
                    // 失敗した厳密な追加はストアを変更しない
                    assert_eq!(headers.to_string(), before);
                }
            }
            Operation::Remove(name) => {
                let _ = headers.remove(name);
            }
            Operation::Contains(name) => {
                let _ = headers.contains(name);
            }
            Operation::GetValues(name) => {
                if let Some(values) = headers.try_get_values(name) {
                    assert!(!values.is_empty());
                }
            }
        }
    }

    // Display はストアを変更しない
    let rendered = headers.to_string();
    assert_eq!(headers.to_string(), rendered);

    // 列挙後にヘッダー分割や空のヘッダーは残らない
    for (_, values) in headers.iter() {
        assert!(!values.is_empty());
        for value in &values {
            assert!(!contains_header_splitting(value));
        }
    }

    let mut destination = HeaderStore::new(registry(&input.destination));
    destination.add_headers(&mut headers);
    let _ = destination.to_string();
});
