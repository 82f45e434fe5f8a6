//! Line-delimited JSON tool host.
//!
//! Each stdin line is `{"tool": "<name>", "input": {...}}`, optionally with an
//! `id` that is echoed back. Each request produces exactly one stdout line.
//! `{"tool": "list_tools"}` returns the tool definitions. Logs go to stderr.

use std::process::ExitCode;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

use medical_agent::config::{ConfigBuilder, Settings};
use medical_agent::{MedicalAgent, ToolOutput, ToolRegistry, TracingConfig, init_tracing};

const LIST_TOOLS: &str = "list_tools";

#[derive(Debug, Deserialize)]
struct HostRequest {
    #[serde(default)]
    id: Option<Value>,
    tool: String,
    #[serde(default)]
    input: Option<Value>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing(&TracingConfig::new());

    let provider = ConfigBuilder::new().env().build();
    let settings = match Settings::load(&provider).await {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let registry = ToolRegistry::medical(Arc::new(MedicalAgent::from_settings(&settings)));
    info!(tools = registry.names().len(), "tool host ready");

    match serve(&registry).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "tool host stopped");
            ExitCode::FAILURE
        }
    }
}

async fn serve(registry: &ToolRegistry) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(registry, &line).await;
        let mut encoded = response.to_string();
        encoded.push('\n');
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("stdin closed");
    Ok(())
}

async fn handle_line(registry: &ToolRegistry, line: &str) -> Value {
    let request_id = uuid::Uuid::new_v4().to_string();

    let request: HostRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            let output = ToolOutput::invalid_input(format!("malformed request line: {}", e));
            return envelope(None, &request_id, None, output);
        }
    };

    if request.tool == LIST_TOOLS {
        let output = ToolOutput::success(&registry.definitions());
        return envelope(request.id, &request_id, Some(LIST_TOOLS), output);
    }

    let input = request.input.unwrap_or_else(|| json!({}));
    let output = registry
        .execute_with_id(&request.tool, input, &request_id)
        .await;
    envelope(request.id, &request_id, Some(&request.tool), output)
}

fn envelope(id: Option<Value>, request_id: &str, tool: Option<&str>, output: ToolOutput) -> Value {
    json!({
        "id": id,
        "request_id": request_id,
        "tool": tool,
        "is_error": output.is_error(),
        "result": output.into_payload(),
    })
}
