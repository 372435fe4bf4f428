use serde_json::{Map, Value};

use crate::core::errors::ResearchError;

pub fn validate_config(config: &Value) -> Result<(), ResearchError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_optional_string_list(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(embedding) = expect_optional_object(root, "embedding")? {
        validate_enum_field(
            embedding,
            "embedding.provider",
            "provider",
            &["hashing", "openai"],
        )?;
        validate_u64_field(embedding, "embedding.dimension", "dimension", 1, 65_536)?;
        validate_optional_string_field(embedding, "embedding.base_url", "base_url")?;
        validate_optional_string_field(embedding, "embedding.model", "model")?;
        validate_u64_field(
            embedding,
            "embedding.timeout_secs",
            "timeout_secs",
            1,
            3_600,
        )?;

        if embedding.get("provider").and_then(|v| v.as_str()) == Some("openai") {
            validate_required_string_field(embedding, "embedding.base_url", "base_url")?;
            validate_required_string_field(embedding, "embedding.model", "model")?;
        }
    }

    if let Some(research) = expect_optional_object(root, "research")? {
        validate_u64_field(research, "research.top_k", "top_k", 1, 1_000)?;
        validate_u64_field(
            research,
            "research.preview_chars",
            "preview_chars",
            1,
            10_000,
        )?;
    }

    if let Some(summarizer) = expect_optional_object(root, "summarizer")? {
        validate_u64_field(
            summarizer,
            "summarizer.max_sentences",
            "max_sentences",
            1,
            1_000,
        )?;
        validate_enum_field(
            summarizer,
            "summarizer.order",
            "order",
            &["score", "document"],
        )?;
    }

    if let Some(storage) = expect_optional_object(root, "storage")? {
        validate_optional_string_field(storage, "storage.db_file", "db_file")?;
    }

    if let Some(export) = expect_optional_object(root, "export")? {
        validate_optional_string_field(export, "export.dir", "dir")?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ResearchError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(config_type_error(key, "object")),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ResearchError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ResearchError::Config(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_required_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ResearchError> {
    let value = section.get(key).ok_or_else(|| {
        ResearchError::Config(format!("Invalid config at '{}': value is required", path))
    })?;
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ResearchError::Config(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ResearchError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_str().is_none() {
        return Err(config_type_error(path, "string"));
    }
    Ok(())
}

fn validate_optional_string_list(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ResearchError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array"));
    };
    if let Some(idx) = items.iter().position(|item| !item.is_string()) {
        return Err(config_type_error(&format!("{}[{}]", path, idx), "string"));
    }
    Ok(())
}

fn validate_enum_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), ResearchError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if !allowed.contains(&text) {
        return Err(ResearchError::Config(format!(
            "Invalid config at '{}': expected one of {}",
            path,
            allowed.join(", ")
        )));
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ResearchError {
    ResearchError::Config(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_is_valid() {
        assert!(validate_config(&json!({})).is_ok());
    }

    #[test]
    fn full_config_is_valid() {
        let config = json!({
            "server": { "host": "127.0.0.1", "port": 8765 },
            "embedding": {
                "provider": "openai",
                "base_url": "http://localhost:1234",
                "model": "text-embedding-nomic",
                "timeout_secs": 10
            },
            "research": { "top_k": 3, "preview_chars": 80 },
            "summarizer": { "max_sentences": 4, "order": "document" },
            "storage": { "db_file": "research.db" },
            "export": { "dir": "reports" }
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn out_of_range_top_k_is_rejected() {
        let err = validate_config(&json!({ "research": { "top_k": 0 } })).unwrap_err();
        assert!(err.to_string().contains("research.top_k"));
    }

    #[test]
    fn unknown_summary_order_is_rejected() {
        let err =
            validate_config(&json!({ "summarizer": { "order": "random" } })).unwrap_err();
        assert!(err.to_string().contains("score, document"));
    }

    #[test]
    fn openai_provider_requires_base_url() {
        let err = validate_config(&json!({ "embedding": { "provider": "openai", "model": "m" } }))
            .unwrap_err();
        assert!(err.to_string().contains("embedding.base_url"));
    }

    #[test]
    fn cors_origins_must_be_strings() {
        let ok = json!({ "server": { "cors_allowed_origins": ["http://localhost"] } });
        assert!(validate_config(&ok).is_ok());

        let err = validate_config(&json!({ "server": { "cors_allowed_origins": ["a", 3] } }))
            .unwrap_err();
        assert!(err.to_string().contains("server.cors_allowed_origins[1]"));
    }

    #[test]
    fn non_object_section_is_rejected() {
        let err = validate_config(&json!({ "storage": "research.db" })).unwrap_err();
        assert!(err.to_string().contains("expected object"));
    }
}
