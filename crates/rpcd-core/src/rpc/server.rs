//! Line-delimited JSON-RPC server.
//!
//! Reads one request per line, services it completely, then writes the
//! response before reading the next line.

use super::protocol::*;
use crate::logging::generate_request_id;
use crate::service::Registry;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use tracing::{debug, info_span, warn};

/// Dispatches JSON-RPC messages to the registry.
pub struct Server {
    registry: Registry,
}

impl Server {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run the stdio event loop until stdin closes.
    pub fn run_stdio(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run(stdin.lock(), stdout.lock())
    }

    /// Serve every line of `input`, writing responses to `output`.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            // Notifications (no id) get no response
            if let Some(resp) = self.handle_message(trimmed) {
                writeln!(output, "{}", resp.to_line())?;
                output.flush()?;
            }
        }

        debug!("input closed");
        Ok(())
    }

    /// Handle a single JSON-RPC message and return a response (or None for notifications).
    pub fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(_) => {
                return Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    "Parse error: invalid JSON",
                ));
            }
        };

        let fallback_id = value.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    fallback_id,
                    INVALID_REQUEST,
                    format!("Invalid request: {e}"),
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                INVALID_REQUEST,
                "Invalid request: jsonrpc must be \"2.0\"",
            ));
        }

        let request_id = generate_request_id();
        let span = info_span!("rpc", request_id = %request_id, method = %request.method);
        let _guard = span.enter();

        let result = match request.method.as_str() {
            "call" => self.handle_call(&request.params),
            "list" => self.handle_list(&request.params),
            "ping" => Ok(serde_json::json!({})),
            _ => Err(JsonRpcResponse::error(
                None,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };

        // Notifications have no id; the work is still done
        let id = request.id?;

        Some(match result {
            Ok(value) => JsonRpcResponse::success(Some(id), value),
            Err(mut resp) => {
                resp.id = Some(id);
                resp
            }
        })
    }

    fn handle_call(&self, params: &Value) -> Result<Value, JsonRpcResponse> {
        let object = required_str(params, "object")?;
        let method = required_str(params, "method")?;
        let args = params.get("args").unwrap_or(&Value::Null);

        self.registry.call(object, method, args).map_err(|err| {
            warn!(object, method, status = %err.status(), error = %err, "call failed");
            JsonRpcResponse::from_error(None, &err)
        })
    }

    fn handle_list(&self, params: &Value) -> Result<Value, JsonRpcResponse> {
        let object = match params.get("object") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.as_str()),
            Some(_) => {
                return Err(JsonRpcResponse::error(
                    None,
                    INVALID_PARAMS,
                    "'object' must be a string",
                ))
            }
        };

        self.registry
            .list(object)
            .map_err(|err| JsonRpcResponse::from_error(None, &err))
    }
}

fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, JsonRpcResponse> {
    params.get(key).and_then(Value::as_str).ok_or_else(|| {
        JsonRpcResponse::error(None, INVALID_PARAMS, format!("Missing '{key}' in call"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpcd_config::{DaemonConfig, MemoryStore};
    use tempfile::TempDir;

    fn server_in(dir: &TempDir) -> Server {
        let mut config = DaemonConfig::default();
        config.paths.authorized_keys = dir.path().join("authorized_keys");
        config.paths.proc_root = dir.path().join("proc");
        Server::new(Registry::new(config, Box::new(MemoryStore::new())))
    }

    fn server() -> Server {
        Server::new(Registry::new(DaemonConfig::default(), Box::new(MemoryStore::new())))
    }

    #[test]
    fn handle_parse_error() {
        let resp = server().handle_message("not json").unwrap();
        assert_eq!(resp.error.as_ref().unwrap().code, PARSE_ERROR);
        assert!(resp.id.is_none());
    }

    #[test]
    fn handle_invalid_request() {
        let s = server();
        let resp = s.handle_message(r#"[1,2,3]"#).unwrap();
        assert_eq!(resp.error.as_ref().unwrap().code, INVALID_REQUEST);

        let resp = s.handle_message(r#"{"jsonrpc":"2.0","id":4}"#).unwrap();
        assert_eq!(resp.error.as_ref().unwrap().code, INVALID_REQUEST);
        assert_eq!(resp.id, Some(serde_json::json!(4)));

        let resp = s.handle_message(r#"{"jsonrpc":"1.0","id":5,"method":"ping"}"#).unwrap();
        assert_eq!(resp.error.as_ref().unwrap().code, INVALID_REQUEST);
    }

    #[test]
    fn handle_ping() {
        let resp = server()
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
            .unwrap();
        assert_eq!(resp.result, Some(serde_json::json!({})));
        assert_eq!(resp.id, Some(serde_json::json!(1)));
    }

    #[test]
    fn notification_gets_no_response() {
        assert!(server()
            .handle_message(r#"{"jsonrpc":"2.0","method":"ping"}"#)
            .is_none());
    }

    #[test]
    fn null_id_is_a_request_not_a_notification() {
        let resp = server()
            .handle_message(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .unwrap();
        assert_eq!(resp.id, Some(Value::Null));
        assert_eq!(resp.result, Some(serde_json::json!({})));

        let line = resp.to_line();
        assert!(line.contains(r#""id":null"#));
    }

    #[test]
    fn handle_unknown_method() {
        let resp = server()
            .handle_message(r#"{"jsonrpc":"2.0","id":"x","method":"tools/list"}"#)
            .unwrap();
        assert_eq!(resp.error.as_ref().unwrap().code, METHOD_NOT_FOUND);
        assert_eq!(resp.id, Some(serde_json::json!("x")));
    }

    #[test]
    fn handle_list() {
        let s = server();
        let resp = s
            .handle_message(r#"{"jsonrpc":"2.0","id":2,"method":"list"}"#)
            .unwrap();
        let result = resp.result.unwrap();
        assert!(result.get("luci2.system").is_some());
        assert!(result.get("luci2.network").is_some());

        let resp = s
            .handle_message(r#"{"jsonrpc":"2.0","id":3,"method":"list","params":{"object":"luci2.bogus"}}"#)
            .unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, HANDLER_ERROR);
        assert_eq!(err.data.unwrap()["status"], "not_found");
    }

    #[test]
    fn call_missing_params() {
        let resp = server()
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"call","params":{"object":"luci2.system"}}"#)
            .unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[test]
    fn call_unknown_object() {
        let resp = server()
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"call","params":{"object":"luci2.ui","method":"menu"}}"#)
            .unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, METHOD_NOT_FOUND);
        assert_eq!(err.data.unwrap()["status"], "method_not_found");
    }

    #[test]
    fn call_invalid_argument() {
        let resp = server()
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"call","params":{"object":"luci2.system","method":"init_action","args":{"name":"network","action":"explode"}}}"#)
            .unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, INVALID_PARAMS);
        assert_eq!(err.data.unwrap(), serde_json::json!({"status": "invalid_argument", "code": 2}));
    }

    #[test]
    fn call_sshkeys_round_trip() {
        let dir = TempDir::new().unwrap();
        let s = server_in(&dir);

        let resp = s
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"call","params":{"object":"luci2.system","method":"sshkeys_set","args":{"keys":["ssh-ed25519 AAAA a@b",7,"ssh-rsa BBBB c@d"]}}}"#)
            .unwrap();
        assert_eq!(resp.result, Some(serde_json::json!({})));

        let resp = s
            .handle_message(r#"{"jsonrpc":"2.0","id":2,"method":"call","params":{"object":"luci2.system","method":"sshkeys_get"}}"#)
            .unwrap();
        assert_eq!(
            resp.result.unwrap(),
            serde_json::json!({"keys": ["ssh-ed25519 AAAA a@b", "ssh-rsa BBBB c@d"]})
        );
    }

    #[test]
    fn call_handler_error_carries_status() {
        let dir = TempDir::new().unwrap();
        let resp = server_in(&dir)
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"call","params":{"object":"luci2.network","method":"routes"}}"#)
            .unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, HANDLER_ERROR);
        assert_eq!(err.data.unwrap()["status"], "not_found");
    }

    #[test]
    fn run_skips_blank_lines_and_notifications() {
        let input = "\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n   \n{\"jsonrpc\":\"2.0\",\"method\":\"ping\"}\n{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n";
        let mut output = Vec::new();
        server().run(input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
    }
}
