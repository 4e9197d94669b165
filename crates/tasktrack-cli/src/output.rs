//! JSON envelopes printed by every command.
//!
//! Success goes to stdout as `{"success":true,"api_version":..,"data":..}`;
//! failures go to stderr with an `error` message and exit status 1.

use serde::Serialize;

const API_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> CliResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            api_version: API_VERSION,
            data: Some(data),
            error: None,
        }
    }
}

impl CliResponse<()> {
    fn failed(message: &str) -> Self {
        Self {
            success: false,
            api_version: API_VERSION,
            data: None,
            error: Some(message.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
    pub count: usize,
}

impl<T: Serialize> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

pub fn output_success<T: Serialize>(data: T) {
    match serde_json::to_string(&CliResponse::ok(data)) {
        Ok(json) => println!("{}", json),
        Err(e) => output_error(&format!("Failed to encode response: {}", e)),
    }
}

pub fn output_list<T: Serialize>(items: Vec<T>) {
    output_success(ListResponse::from(items));
}

/// Prints the failure envelope to stderr and exits with status 1.
pub fn output_error(message: &str) -> ! {
    let json = serde_json::to_string(&CliResponse::failed(message))
        .unwrap_or_else(|_| format!("{{\"success\":false,\"error\":{:?}}}", message));
    eprintln!("{}", json);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let json = serde_json::to_value(CliResponse::ok(ListResponse::from(vec!["a", "b"]))).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["count"], 2);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_envelope_shape() {
        let json = serde_json::to_value(CliResponse::failed("nope")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "nope");
        assert!(json.get("data").is_none());
    }
}
