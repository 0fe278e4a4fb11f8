use ferry_client::CheckInOutcome;
use ferry_core::CheckInResult;
use serde::Serialize;

use crate::cli::{GlobalFlags, LookupCommands, VerifyCommands};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum CheckInResponse {
    Verified { result: CheckInResult },
    AlreadyVerified { detail: Option<String> },
    SavedOffline { message: &'static str },
}

impl From<CheckInOutcome> for CheckInResponse {
    fn from(outcome: CheckInOutcome) -> Self {
        match outcome {
            CheckInOutcome::Verified(result) => Self::Verified { result },
            CheckInOutcome::AlreadyVerified { detail } => Self::AlreadyVerified { detail },
            CheckInOutcome::SavedOffline => Self::SavedOffline {
                message: "Saved offline, will retry when connected",
            },
        }
    }
}

/// Handle `ferry verify <subcommand>`.
pub async fn handle(
    action: &VerifyCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let verification = ctx.verification();
    match action {
        VerifyCommands::Scan { payload } => {
            output(&verification.scan(payload.trim()).await?, flags.format)
        }
        VerifyCommands::CheckIn { code } => {
            let outcome = ctx.offline_queue().check_in(code.trim()).await?;
            output(&CheckInResponse::from(outcome), flags.format)
        }
        VerifyCommands::Lookup { target } => {
            let result = match target {
                LookupCommands::Booking { number, branch } => {
                    verification.lookup_booking(*number, *branch).await?
                }
                LookupCommands::Ticket { number, branch } => {
                    verification.lookup_ticket(*number, *branch).await?
                }
            };
            output(&result, flags.format)
        }
    }
}
