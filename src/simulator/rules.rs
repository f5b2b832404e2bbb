// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Per-node transition rules
//!
//! Each rule is a pure function of the node's configuration, the incoming
//! payload and the success flag. A failing rule clears the flag; it never
//! stops the walk.

use serde_json::Value;

use crate::flow::{Config, NodeKind, Payload};

/// Token used when an auth node has none configured
pub const DEFAULT_TOKEN: &str = "demo-token";

/// What a node did with the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    AuthPassed,
    AuthMissingToken,
    Transformed,
    TransformFailed,
    ConditionMet,
    ConditionMissingValue,
    ConditionNotMet,
    ResponseReturned,
    UnknownNodeType,
    NotConnected,
}

impl Verdict {
    /// Log line shown for the node
    pub fn message(&self) -> &'static str {
        match self {
            Self::AuthPassed => "Auth passed",
            Self::AuthMissingToken => "Auth failed: No token",
            Self::Transformed => "Data transformed",
            Self::TransformFailed => "Data transform failed",
            Self::ConditionMet => "Condition met",
            Self::ConditionMissingValue => "Condition failed: No value",
            Self::ConditionNotMet => "Condition not met",
            Self::ResponseReturned => "Response returned",
            Self::UnknownNodeType => "Unknown node type",
            Self::NotConnected => "Not connected",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of running one node
#[derive(Debug, Clone)]
pub struct Step {
    pub payload: Payload,
    pub ok: bool,
    pub verdict: Verdict,
}

impl Step {
    fn passed(payload: Payload, ok: bool, verdict: Verdict) -> Self {
        Self { payload, ok, verdict }
    }

    fn failed(payload: Payload, verdict: Verdict) -> Self {
        Self {
            payload,
            ok: false,
            verdict,
        }
    }
}

/// Run one node's rule
pub fn apply(kind: &NodeKind, config: &Config, mut payload: Payload, ok: bool) -> Step {
    match kind {
        NodeKind::Auth => {
            // Absent means "use the demo token"; an explicit empty token fails
            let token = config.get("token").map_or(DEFAULT_TOKEN, String::as_str);
            if token.is_empty() {
                return Step::failed(payload, Verdict::AuthMissingToken);
            }
            payload.insert("token".to_string(), Value::String(token.to_string()));
            Step::passed(payload, ok, Verdict::AuthPassed)
        }
        NodeKind::Transformer => {
            let operation = setting(config, "operation", "map");
            let field = setting(config, "field", "user");

            let movable = operation == "map" && payload.get(field).is_some_and(is_truthy);
            let moved = if movable { payload.remove(field) } else { None };
            match moved {
                Some(value) => {
                    payload.insert(format!("{}_mapped", field), value);
                    Step::passed(payload, ok, Verdict::Transformed)
                }
                None => Step::failed(payload, Verdict::TransformFailed),
            }
        }
        NodeKind::Conditional => {
            let condition = setting(config, "condition", "equals");
            let value = config.get("value").map_or("", String::as_str);

            if value.is_empty() {
                Step::failed(payload, Verdict::ConditionMissingValue)
            } else if condition == "equals" && payload.values().any(|v| v.as_str() == Some(value))
            {
                Step::passed(payload, ok, Verdict::ConditionMet)
            } else {
                Step::failed(payload, Verdict::ConditionNotMet)
            }
        }
        NodeKind::Endpoint => {
            let status = if ok { "200 OK" } else { "400 Bad Request" };
            let mut response = Payload::new();
            response.insert("status".to_string(), Value::String(status.to_string()));
            response.insert("body".to_string(), Value::Object(payload));
            Step::passed(response, ok, Verdict::ResponseReturned)
        }
        NodeKind::Other(_) => Step::passed(payload, ok, Verdict::UnknownNodeType),
    }
}

/// Config value, falling back to `default` when absent or empty
fn setting<'a>(config: &'a Config, key: &str, default: &'a str) -> &'a str {
    config
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

/// Whether a payload value counts as present
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
