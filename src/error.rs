use thiserror::Error;

use crate::date::DateError;

/// エラーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 引数エラー (ヘッダー名が空、不正なヘッダー名、値がない)
    Argument,
    /// 形式エラー (値がヘッダーの文法に一致しない)
    Format,
    /// 不正な操作 (許可されていないヘッダー、存在しないヘッダー)
    InvalidOperation,
}

/// ヘッダー操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum HeaderError {
    /// ヘッダー名が空
    #[error("header name must not be empty")]
    EmptyName,
    /// ヘッダー名がトークンではない
    #[error("invalid header name: {0:?}")]
    InvalidName(String),
    /// 値が必要な場所に値がない
    #[error("value must not be empty")]
    MissingValue,
    /// 値がヘッダーの文法に一致しない
    #[error("invalid {name} value: {value:?}")]
    InvalidFormat { name: String, value: String },
    /// コンストラクタやセッターに渡された値が不正
    #[error("invalid value: {0:?}")]
    InvalidValue(String),
    /// 単一値ヘッダーに 2 つ目の値を追加しようとした
    #[error("header {0} does not support multiple values")]
    SingleValueHeader(String),
    /// 値にヘッダー分割となる改行が含まれる
    #[error("value for header {0} contains an invalid new line")]
    InvalidNewLine(String),
    /// このストアでは許可されていないヘッダー
    #[error("header {name} is not allowed in {category} headers")]
    Disallowed { name: String, category: &'static str },
    /// ヘッダーが見つからない
    #[error("header {0} not found")]
    NotFound(String),
    /// 値の種類がヘッダーのパーサーと一致しない
    #[error("value kind does not match the parser of header {0}")]
    ValueKindMismatch(String),
    /// 日付エラー
    #[error("invalid date: {0}")]
    Date(#[from] DateError),
}

impl HeaderError {
    /// エラーの分類を取得
    pub fn kind(&self) -> ErrorKind {
        match self {
            HeaderError::EmptyName | HeaderError::InvalidName(_) | HeaderError::MissingValue => {
                ErrorKind::Argument
            }
            HeaderError::InvalidFormat { .. }
            | HeaderError::InvalidValue(_)
            | HeaderError::SingleValueHeader(_)
            | HeaderError::InvalidNewLine(_)
            | HeaderError::Date(_) => ErrorKind::Format,
            HeaderError::Disallowed { .. }
            | HeaderError::NotFound(_)
            | HeaderError::ValueKindMismatch(_) => ErrorKind::InvalidOperation,
        }
    }

    pub(crate) fn invalid_format(name: &str, value: &str) -> Self {
        HeaderError::InvalidFormat {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(HeaderError::EmptyName.kind(), ErrorKind::Argument);
        assert_eq!(
            HeaderError::InvalidName("a b".to_string()).kind(),
            ErrorKind::Argument
        );
        assert_eq!(HeaderError::MissingValue.kind(), ErrorKind::Argument);
        assert_eq!(
            HeaderError::invalid_format("Via", "x").kind(),
            ErrorKind::Format
        );
        assert_eq!(
            HeaderError::SingleValueHeader("Content-Type".to_string()).kind(),
            ErrorKind::Format
        );
        assert_eq!(
            HeaderError::Disallowed {
                name: "Server".to_string(),
                category: "request",
            }
            .kind(),
            ErrorKind::InvalidOperation
        );
        assert_eq!(
            HeaderError::Date(DateError::InvalidDay).kind(),
            ErrorKind::Format
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            HeaderError::EmptyName.to_string(),
            "header name must not be empty"
        );
        assert_eq!(
            HeaderError::invalid_format("Via", "x").to_string(),
            "invalid Via value: \"x\""
        );
        assert_eq!(
            HeaderError::Disallowed {
                name: "Server".to_string(),
                category: "request",
            }
            .to_string(),
            "header Server is not allowed in request headers"
        );
    }
}
