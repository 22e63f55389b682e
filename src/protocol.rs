//! MCP protocol handler.
//!
//! Implements the JSON-RPC based MCP protocol: initialize, tools/list,
//! tools/call, ping.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::types::QueryHistoryParams;
use crate::{query, tools, QueryServer};

/// A JSON-RPC request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// A JSON-RPC response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// JSON-RPC error codes.
const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// Handle a single JSON-RPC request and return a response.
pub async fn handle_request(
    server: &Arc<QueryServer>,
    request: &JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    debug!("handling method: {}", request.method);

    // Notifications (no id) don't get responses.
    let id = request.id.clone();

    match request.method.as_str() {
        "initialize" => Some(handle_initialize(server, id)),
        "initialized" => None, // Notification, no response.
        "ping" => Some(handle_ping(id)),
        "tools/list" => Some(handle_tools_list(id)),
        "tools/call" => Some(handle_tools_call(server, id, &request.params).await),
        _ => {
            // Unknown method.
            if id.is_some() {
                Some(JsonRpcResponse::error(
                    id,
                    METHOD_NOT_FOUND,
                    format!("Method not found: {}", request.method),
                ))
            } else {
                None // Don't respond to unknown notifications.
            }
        }
    }
}

/// Handle a raw JSON string, parse it, dispatch, and return the response JSON.
pub async fn handle_message(server: &Arc<QueryServer>, message: &str) -> Option<String> {
    let request: JsonRpcRequest = match serde_json::from_str(message) {
        Ok(req) => req,
        Err(e) => {
            error!("failed to parse JSON-RPC request: {}", e);
            let resp = JsonRpcResponse::error(None, PARSE_ERROR, "Parse error");
            return Some(serde_json::to_string(&resp).unwrap());
        }
    };

    if request.jsonrpc != "2.0" {
        let resp = JsonRpcResponse::error(
            request.id.clone(),
            INVALID_REQUEST,
            "Invalid JSON-RPC version, expected 2.0",
        );
        return Some(serde_json::to_string(&resp).unwrap());
    }

    let response = handle_request(server, &request).await?;
    Some(serde_json::to_string(&response).unwrap())
}

fn handle_initialize(server: &Arc<QueryServer>, id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::success(
        id,
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            },
            "serverInfo": {
                "name": server.server_info.name,
                "version": server.server_info.version
            }
        }),
    )
}

fn handle_ping(id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::success(id, json!({}))
}

fn handle_tools_list(id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::success(
        id,
        json!({
            "tools": [
                {
                    "name": "query_history",
                    "description": "Query the captured traffic history of the intercepting proxy with SQL-style conditions. Returns matching transactions as JSON rows.",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "fields": {
                                "type": "array",
                                "items": {
                                    "type": "string",
                                    "enum": query::ALLOWED_FIELDS
                                },
                                "description": "Fields to select. req: raw request; req.content_type: request content type; req.body: raw request body; host: request host, no port; url: request URL; method: request method, e.g. 'GET'; resp: raw response; resp.content_type: response content type; resp.body: raw response body; status_code: response status code (int)"
                            },
                            "conditions": {
                                "type": "string",
                                "description": "SQL-style conditions joined with 'and', e.g. \"req.content_type='text/html' and status_code=200\". Operators: = (equal), > (greater), < (less), != (not equal), like (contains; do not add '%'). Example: fields [\"url\",\"req\"], conditions \"req.content_type='application/json' and status_code=200 and req.body like 'password'\", limit 10."
                            },
                            "limit": {
                                "type": "integer",
                                "description": "Maximum number of result rows (default 20)",
                                "default": 20
                            }
                        },
                        "required": ["fields", "conditions"]
                    }
                }
            ]
        }),
    )
}

async fn handle_tools_call(
    server: &Arc<QueryServer>,
    id: Option<Value>,
    params: &Option<Value>,
) -> JsonRpcResponse {
    let params = match params {
        Some(p) => p,
        None => {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params for tools/call");
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing tool name in params");
        }
    };

    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    match tool_name {
        "query_history" => match serde_json::from_value::<QueryHistoryParams>(arguments) {
            Ok(tool_params) => {
                let rows = tools::query_history(server, tool_params).await;
                JsonRpcResponse::success(
                    id,
                    json!({
                        "content": [{
                            "type": "text",
                            "text": serde_json::to_string_pretty(&rows).unwrap()
                        }]
                    }),
                )
            }
            Err(e) => JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Invalid query_history params: {e}"),
            ),
        },

        _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Unknown tool: {tool_name}")),
    }
}
