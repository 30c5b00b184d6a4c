use serde::de::DeserializeOwned;
use thiserror::Error;

/// Deserialization failure with the JSON path it happened at.
#[derive(Error, Debug)]
#[error("at JSON path {path} → {message}")]
pub struct DocumentError {
    pub path: String,
    pub message: String,
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, DocumentError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_document_error)
}

fn into_document_error<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> DocumentError {
    DocumentError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn errors_name_the_failing_path() {
        let err =
            from_str_with_path::<BTreeMap<String, Vec<u8>>>(r#"{"a": [1, 2], "b": [3, "x"]}"#)
                .unwrap_err();
        assert_eq!(err.path, "b[1]");
        assert!(err.to_string().starts_with("at JSON path b[1] → "));
    }
}
