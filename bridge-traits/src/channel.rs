//! Method Channel Abstraction
//!
//! The application shell talks to the plugin through a named-method
//! call/response channel (a Flutter `MethodChannel`, a React Native module,
//! a Tauri command). Each inbound call carries a method name plus a JSON
//! argument map, and must be answered exactly once through the host's reply
//! primitive.
//!
//! Most hosts require the reply to be delivered on the thread that owns the
//! channel. [`MethodResult`] is therefore `Send` but consumed by value: the
//! core moves it to its single delivery task and calls it there.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound call from the application shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Call without arguments.
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }

    /// Look up a named argument.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }
}

/// Host reply primitive for one call.
pub trait MethodResult: Send {
    /// Complete the call with a result payload.
    fn success(self: Box<Self>, value: Value);

    /// Complete the call with a structured failure.
    fn error(self: Box<Self>, code: &str, message: &str, details: Option<Value>);

    /// Complete the call as "method not implemented".
    fn not_implemented(self: Box<Self>);
}

/// Outcome of handling a call, before it is handed to a [`MethodResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success {
        value: Value,
    },
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        MethodResponse::Error {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success { .. })
    }

    /// Hand the outcome to the host reply primitive.
    pub fn deliver(self, result: Box<dyn MethodResult>) {
        match self {
            MethodResponse::Success { value } => result.success(value),
            MethodResponse::Error {
                code,
                message,
                details,
            } => result.error(&code, &message, details),
            MethodResponse::NotImplemented => result.not_implemented(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MethodResult for Recorder {
        fn success(self: Box<Self>, value: Value) {
            self.calls.lock().unwrap().push(format!("success:{}", value));
        }

        fn error(self: Box<Self>, code: &str, message: &str, _details: Option<Value>) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("error:{}:{}", code, message));
        }

        fn not_implemented(self: Box<Self>) {
            self.calls.lock().unwrap().push("not_implemented".into());
        }
    }

    #[test]
    fn test_method_call_arguments() {
        let call = MethodCall::new("getSleepData", json!({"start": 1, "end": 2}));
        assert_eq!(call.argument("start"), Some(&json!(1)));
        assert_eq!(call.argument("missing"), None);
        assert_eq!(MethodCall::bare("connect").argument("start"), None);
    }

    #[test]
    fn test_deliver_routes_to_matching_primitive() {
        let recorder = Recorder::default();

        MethodResponse::Success {
            value: json!({"isConnect": true}),
        }
        .deliver(Box::new(recorder.clone()));
        MethodResponse::error("QUERY_ERROR", "boom").deliver(Box::new(recorder.clone()));
        MethodResponse::NotImplemented.deliver(Box::new(recorder.clone()));

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                r#"success:{"isConnect":true}"#.to_string(),
                "error:QUERY_ERROR:boom".to_string(),
                "not_implemented".to_string(),
            ]
        );
    }

    #[test]
    fn test_only_success_counts_as_success() {
        assert!(MethodResponse::Success { value: json!(null) }.is_success());
        assert!(!MethodResponse::error("PERMISSION_ERROR", "denied").is_success());
        assert!(!MethodResponse::NotImplemented.is_success());
    }

    #[test]
    fn test_method_call_deserializes_without_arguments() {
        let call: MethodCall = serde_json::from_str(r#"{"method":"connect"}"#).unwrap();
        assert_eq!(call.method, "connect");
        assert!(call.arguments.is_null());
    }
}
