mod auth;
mod booking;
mod queue;
mod stats;
mod verify;

use crate::cli::{Commands, GlobalFlags};
use crate::context::AppContext;

/// Route a parsed command to its handler.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Auth { action } => auth::handle(&action, ctx, flags).await,
        Commands::Verify { action } => verify::handle(&action, ctx, flags).await,
        Commands::Queue { action } => queue::handle(&action, ctx, flags).await,
        Commands::Booking { action } => booking::handle(&action, ctx, flags).await,
        Commands::Stats { action } => stats::handle(&action, ctx, flags),
    }
}
