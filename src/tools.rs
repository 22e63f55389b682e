//! MCP tool implementations.

use serde_json::Value;
use tracing::debug;

use crate::query;
use crate::types::QueryHistoryParams;
use crate::QueryServer;

/// Execute the `query_history` tool.
///
/// Validates the field list, condition expression, and limit, assembles the
/// backend query string, and forwards it to the proxy backend. A validation
/// failure is returned as a one-element row list holding the message, the
/// same shape a backend or transport failure takes; callers distinguish the
/// cases by message content only.
pub async fn query_history(server: &QueryServer, params: QueryHistoryParams) -> Vec<Value> {
    debug!(
        fields = ?params.fields,
        conditions = %params.conditions,
        limit = params.limit,
        "query_history"
    );

    if let Err(e) = query::validate(&params.fields, &params.conditions, params.limit) {
        return vec![Value::String(e.to_string())];
    }

    let assembled = query::assemble(&params.fields, &params.conditions, params.limit);
    server.forwarder.submit(&assembled).await
}
