use serde::Serialize;

use crate::cli::{GlobalFlags, QueueCommands};
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct QueueStatusResponse {
    pending: usize,
    codes: Vec<String>,
}

/// Handle `ferry queue <subcommand>`.
pub async fn handle(
    action: &QueueCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        QueueCommands::Status => {
            let entries = ctx.storage.offline_queue()?;
            output(
                &QueueStatusResponse {
                    pending: entries.len(),
                    codes: entries.into_iter().map(|e| e.verification_code).collect(),
                },
                flags.format,
            )
        }
        QueueCommands::Flush => {
            let report = ctx.offline_queue().flush().await?;
            output(&report, flags.format)
        }
    }
}
