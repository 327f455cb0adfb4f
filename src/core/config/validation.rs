use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid config at '{path}': expected {expected}")]
    Type { path: String, expected: String },
    #[error("Invalid config at '{path}': must be between {min} and {max}")]
    Range { path: String, min: u64, max: u64 },
    #[error("Invalid config at '{path}': {message}")]
    Invalid { path: String, message: String },
}

pub fn validate_config(config: &Value) -> Result<(), ConfigError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(llm) = expect_optional_object(root, "llm")? {
        validate_optional_string_field(llm, "llm.base_url", "base_url")?;
        validate_optional_string_field(llm, "llm.draft_model", "draft_model")?;
        validate_optional_string_field(llm, "llm.refine_model", "refine_model")?;
        validate_optional_string_field(llm, "llm.classifier_model", "classifier_model")?;
        validate_u64_field(llm, "llm.timeout_secs", "timeout_secs", 1, 86_400)?;
    }

    if let Some(embedding) = expect_optional_object(root, "embedding")? {
        validate_optional_string_field(embedding, "embedding.base_url", "base_url")?;
        validate_optional_string_field(embedding, "embedding.model", "model")?;
        validate_u64_field(embedding, "embedding.batch_size", "batch_size", 1, 4096)?;
    }

    if let Some(search) = expect_optional_object(root, "search")? {
        validate_optional_string_field(search, "search.endpoint", "endpoint")?;
        validate_u64_field(search, "search.max_snippets", "max_snippets", 1, 20)?;
    }

    if let Some(rag) = expect_optional_object(root, "rag")? {
        validate_optional_string_field(rag, "rag.index_path", "index_path")?;
        validate_u64_field(rag, "rag.top_k", "top_k", 1, 100)?;
        validate_u64_field(rag, "rag.chunk_size", "chunk_size", 1, 1_000_000)?;
        validate_u64_field(rag, "rag.chunk_overlap", "chunk_overlap", 0, 1_000_000)?;

        let chunk_size = rag.get("chunk_size").and_then(Value::as_u64).unwrap_or(1000);
        let overlap = rag.get("chunk_overlap").and_then(Value::as_u64).unwrap_or(100);
        if overlap >= chunk_size {
            return Err(ConfigError::Invalid {
                path: "rag.chunk_overlap".to_string(),
                message: format!("must be smaller than rag.chunk_size ({})", chunk_size),
            });
        }
    }

    if let Some(shell) = expect_optional_object(root, "shell")? {
        validate_bool_field(shell, "shell.topic_gate", "topic_gate")?;
    }

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(secrets) = expect_optional_object(root, "secrets")? {
        validate_optional_string_field(
            secrets,
            "secrets.web_search_api_key",
            "web_search_api_key",
        )?;
        validate_optional_string_field(secrets, "secrets.llm_api_key", "llm_api_key")?;
        validate_optional_string_field(
            secrets,
            "secrets.embedding_api_key",
            "embedding_api_key",
        )?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ConfigError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_bool_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_bool().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "boolean"))
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ConfigError::Range {
            path: path.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid {
            path: path.to_string(),
            message: "value cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
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
            return Err(ConfigError::Invalid {
                path: format!("{}[{}]", path, index),
                message: "value cannot be empty".to_string(),
            });
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ConfigError {
    ConfigError::Type {
        path: path.to_string(),
        expected: expected.to_string(),
    }
}
