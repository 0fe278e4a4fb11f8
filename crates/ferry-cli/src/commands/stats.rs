use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::cli::{GlobalFlags, StatsCommands};
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct TodayResponse {
    date: NaiveDate,
    checked_in: u32,
    pending: usize,
}

/// Handle `ferry stats <subcommand>`.
pub fn handle(action: &StatsCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        StatsCommands::Today => output(
            &TodayResponse {
                date: Utc::now().date_naive(),
                checked_in: ctx.storage.today_count()?,
                pending: ctx.storage.offline_queue()?.len(),
            },
            flags.format,
        ),
    }
}
