//! The "optimize JSON" helper behind the advanced view.
//!
//! Provides the [`JsonOptimizer`] trait, an offline [`LocalOptimizer`] that
//! normalizes schema JSON, and an [`HttpOptimizer`] that delegates to an
//! external cleanup service. The optimizer only ever produces replacement
//! text; it never touches a draft schema directly.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::future::Future;

use crate::config::OptimizerConfig;

/// Best-effort cleanup of advanced-view JSON text.
pub trait JsonOptimizer: Send + Sync {
    fn optimize(&self, json: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Normalizes schema JSON without leaving the process.
///
/// Drops nulls, strips containers that do not belong to a node's type, fills
/// in missing `items`/`parameter`, and removes required names that have no
/// matching child.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOptimizer;

impl JsonOptimizer for LocalOptimizer {
    async fn optimize(&self, json: &str) -> Result<String> {
        normalize(json)
    }
}

/// Normalize advanced-view text (either the `{name, description, fields}`
/// shape or a bare fields map).
pub fn normalize(json: &str) -> Result<String> {
    let mut value: Value = serde_json::from_str(json).context("input is not valid JSON")?;
    let root = value
        .as_object_mut()
        .context("input must be a JSON object")?;

    if root.contains_key("fields") || root.contains_key("name") || root.contains_key("description") {
        if let Some(Value::Object(fields)) = root.get_mut("fields") {
            normalize_children(fields);
        }
        strip_nulls(root);
    } else {
        normalize_children(root);
    }

    Ok(serde_json::to_string_pretty(&value)?)
}

fn strip_nulls(object: &mut Map<String, Value>) {
    object.retain(|_, v| !v.is_null());
}

fn normalize_children(children: &mut Map<String, Value>) {
    for node in children.values_mut() {
        if let Value::Object(node) = node {
            normalize_node(node);
        }
    }
}

fn normalize_node(node: &mut Map<String, Value>) {
    strip_nulls(node);
    let param_type = node
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("string")
        .to_string();
    node.insert("type".into(), Value::String(param_type.clone()));

    let description = node
        .get("description")
        .and_then(Value::as_str)
        .map(|d| d.trim().to_string())
        .unwrap_or_default();
    node.insert("description".into(), Value::String(description));

    if param_type != "object" {
        node.remove("parameter");
        node.remove("required_params");
    }
    if param_type != "array" {
        node.remove("items");
    }

    match param_type.as_str() {
        "object" => {
            let children = node
                .entry("parameter")
                .or_insert_with(|| Value::Object(Map::new()));
            let child_names: Vec<String> = match children {
                Value::Object(children) => {
                    normalize_children(children);
                    children.keys().cloned().collect()
                }
                _ => Vec::new(),
            };
            if let Some(Value::Array(required)) = node.get_mut("required_params") {
                let mut seen = Vec::new();
                required.retain(|name| match name.as_str() {
                    Some(n) if child_names.iter().any(|c| c == n) && !seen.contains(&n.to_string()) => {
                        seen.push(n.to_string());
                        true
                    }
                    _ => false,
                });
            }
        }
        "array" => {
            let items = node
                .entry("items")
                .or_insert_with(|| serde_json::json!({ "type": "string" }));
            if let Value::Object(items) = items {
                normalize_node(items);
            }
        }
        _ => {}
    }
}

/// Delegates to an external cleanup service over HTTP.
///
/// POSTs `{"example_json": <text>}` and accepts either a bare JSON document
/// or `{"result": ...}` (where `result` may itself be JSON-encoded text).
#[derive(Debug, Clone)]
pub struct HttpOptimizer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOptimizer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl JsonOptimizer for HttpOptimizer {
    async fn optimize(&self, json: &str) -> Result<String> {
        let body = serde_json::json!({ "example_json": json });
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&body)?)
            .send()
            .await
            .with_context(|| format!("optimizer request to {} failed", self.endpoint))?;

        anyhow::ensure!(
            response.status().is_success(),
            "optimizer returned HTTP {}",
            response.status()
        );

        let bytes = response
            .bytes()
            .await
            .context("error reading optimizer response")?;
        let value: Value =
            serde_json::from_slice(&bytes).context("optimizer response is not JSON")?;
        unwrap_result(value)
    }
}

fn unwrap_result(value: Value) -> Result<String> {
    let result = match value {
        Value::Object(mut object) if object.contains_key("result") => object
            .remove("result")
            .unwrap_or(Value::Null),
        other => other,
    };
    let result = match result {
        Value::String(text) => {
            serde_json::from_str(&text).context("optimizer result is not valid JSON")?
        }
        other => other,
    };
    anyhow::ensure!(result.is_object(), "optimizer result must be a JSON object");
    Ok(serde_json::to_string_pretty(&result)?)
}

/// The configured optimizer.
#[derive(Debug, Clone)]
pub enum Optimizer {
    Local(LocalOptimizer),
    Http(HttpOptimizer),
}

impl JsonOptimizer for Optimizer {
    async fn optimize(&self, json: &str) -> Result<String> {
        match self {
            Self::Local(optimizer) => optimizer.optimize(json).await,
            Self::Http(optimizer) => optimizer.optimize(json).await,
        }
    }
}

/// Create an optimizer from config.
///
/// `"local"` needs nothing; `"http"` requires `optimizer.endpoint`.
pub fn create_optimizer(config: &OptimizerConfig) -> Result<Optimizer> {
    match config.provider.as_str() {
        "local" => Ok(Optimizer::Local(LocalOptimizer)),
        "http" => {
            anyhow::ensure!(
                !config.endpoint.is_empty(),
                "optimizer.endpoint must be set for the http optimizer"
            );
            Ok(Optimizer::Http(HttpOptimizer::new(&config.endpoint)))
        }
        other => anyhow::bail!("unknown optimizer provider: {other}. Supported: local, http"),
    }
}
