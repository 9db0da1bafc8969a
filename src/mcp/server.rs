//! MCP Server implementation
//!
//! Implements the Model Context Protocol server over newline-delimited
//! JSON-RPC on stdio.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::Result;
use crate::mcp::tools::ToolHandler;
use crate::mcp::types::*;

/// MCP Server info
const SERVER_NAME: &str = "gdrive";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for Google Drive
pub struct McpServer {
    /// Tool handler
    tool_handler: ToolHandler,

    /// Whether the client sent `notifications/initialized`
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(tool_handler: ToolHandler) -> Self {
        Self {
            tool_handler,
            initialized: false,
        }
    }

    /// Whether the initialization handshake has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server on stdio until EOF or Ctrl-C
    pub async fn run_stdio(&mut self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        tokio::select! {
            result = self.serve(stdin, stdout) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, shutting down");
                Ok(())
            }
        }
    }

    /// Serve requests from `reader`, writing one response line per request.
    ///
    /// Returns on EOF. Transport errors end the loop; failures inside a
    /// single line never do, including lines that are not valid UTF-8.
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => match self.handle_message(line).await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::error!(error = %e, "Error handling message");
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Input line is not valid UTF-8");
                    Some(JsonRpcResponse::unaddressed_error(JsonRpcError::parse_error(
                        format!("Invalid UTF-8 in message: {}", e),
                    )))
                }
            };

            // Notifications get no response
            if let Some(response) = response {
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                writer.write_all(&out).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("Input closed, stopping server");
        Ok(())
    }

    /// Handle an incoming JSON-RPC message
    pub async fn handle_message(&mut self, message: &str) -> Result<Option<JsonRpcResponse>> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable message");
                return Ok(Some(JsonRpcResponse::unaddressed_error(
                    JsonRpcError::parse_error(e.to_string()),
                )));
            }
        };

        tracing::debug!(method = %request.method, "Received message");

        // Notifications carry no id and never get a response
        let Some(id) = request.id.clone() else {
            if request.method == methods::INITIALIZED {
                self.initialized = true;
            } else {
                tracing::debug!(method = %request.method, "Ignoring notification");
            }
            return Ok(None);
        };

        let response = match request.method.as_str() {
            methods::INITIALIZE => JsonRpcResponse::success(id, self.handle_initialize()?),
            methods::PING => JsonRpcResponse::success(id, serde_json::json!({})),
            methods::LIST_TOOLS => JsonRpcResponse::success(id, self.handle_list_tools()?),
            methods::CALL_TOOL => match self.handle_call_tool(&request).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(error) => JsonRpcResponse::error(id, error),
            },
            _ => JsonRpcResponse::error(id, JsonRpcError::method_not_found(&request.method)),
        };

        Ok(Some(response))
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> Result<Value> {
        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
            },
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> Result<Value> {
        let result = ListToolsResult {
            tools: self.tool_handler.list_tools(),
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle call tool request
    async fn handle_call_tool(
        &self,
        request: &JsonRpcRequest,
    ) -> std::result::Result<Value, JsonRpcError> {
        let params: CallToolParams = match request.params.as_ref() {
            Some(p) => serde_json::from_value(p.clone()).map_err(|e| {
                JsonRpcError::invalid_params(format!("Invalid tool parameters: {}", e))
            })?,
            None => return Err(JsonRpcError::invalid_params("Missing tool parameters")),
        };

        tracing::info!(tool = %params.name, "Calling tool");

        let result = self
            .tool_handler
            .call_tool(&params.name, params.arguments)
            .await?;

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_info() {
        assert_eq!(SERVER_NAME, "gdrive");
    }
}
