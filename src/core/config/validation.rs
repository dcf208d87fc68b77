use serde_json::{Map, Value};

use crate::core::errors::ApiError;

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_required_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65_535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(storage) = expect_optional_object(root, "storage")? {
        validate_required_string_field(storage, "storage.vector_db_path", "vector_db_path")?;
        validate_required_string_field(storage, "storage.documents_path", "documents_path")?;
    }

    if let Some(models) = expect_optional_object(root, "models")? {
        validate_required_string_field(models, "models.llm_model", "llm_model")?;
        validate_required_string_field(models, "models.embedding_model", "embedding_model")?;
        validate_required_string_field(models, "models.ollama_base_url", "ollama_base_url")?;
        validate_u64_field(
            models,
            "models.request_timeout_secs",
            "request_timeout_secs",
            1,
            86_400,
        )?;
    }

    if let Some(retrieval) = expect_optional_object(root, "retrieval")? {
        validate_u64_field(retrieval, "retrieval.top_k", "top_k", 1, 100)?;
    }

    if let Some(ingest) = expect_optional_object(root, "ingest")? {
        validate_u64_field(ingest, "ingest.chunk_size", "chunk_size", 1, 1_000_000)?;
        validate_u64_field(ingest, "ingest.chunk_overlap", "chunk_overlap", 0, 1_000_000)?;
        validate_u64_field(ingest, "ingest.batch_size", "batch_size", 1, 10_000)?;

        let size = ingest.get("chunk_size").and_then(Value::as_u64);
        let overlap = ingest.get("chunk_overlap").and_then(Value::as_u64);
        if let (Some(size), Some(overlap)) = (size, overlap) {
            if overlap >= size {
                return Err(ApiError::Config(format!(
                    "'ingest.chunk_overlap' ({}) must be less than 'ingest.chunk_size' ({})",
                    overlap, size
                )));
            }
        }
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ApiError::Config(format!(
            "'{}' must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_required_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let value = section
        .get(key)
        .ok_or_else(|| ApiError::Config(format!("'{}' is required", path)))?;
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ApiError::Config(format!("'{}' cannot be empty", path)));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::Config(format!(
                "'{}[{}]' cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::Config(format!("'{}': expected {}", path, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::defaults::default_config;
    use serde_json::json;

    #[test]
    fn defaults_are_valid() {
        validate_config(&default_config()).unwrap();
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = validate_config(&json!({ "retrieval": { "top_k": 0 } })).unwrap_err();
        assert!(err.to_string().contains("retrieval.top_k"));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let err = validate_config(&json!({
            "ingest": { "chunk_size": 100, "chunk_overlap": 100 }
        }))
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn rejects_out_of_range_port_and_wrong_types() {
        assert!(validate_config(&json!({ "server": { "host": "h", "port": 70000 } })).is_err());
        assert!(validate_config(&json!({ "models": "llama2" })).is_err());
        assert!(validate_config(&json!({
            "server": { "host": "h", "cors_allowed_origins": [1] }
        }))
        .is_err());
    }
}
