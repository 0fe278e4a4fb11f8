use ferry_core::AppKind;
use ferry_core::booking::Booking;
use serde::Serialize;

use crate::cli::{BookingCommands, GlobalFlags};
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct BookingDetail {
    #[serde(flatten)]
    booking: Booking,
    qr_url: String,
}

/// Handle `ferry booking <subcommand>`.
pub async fn handle(
    action: &BookingCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if ctx.config.app() != AppKind::Customer {
        anyhow::bail!("booking commands need the customer app (pass --app customer)");
    }

    let bookings = ctx.bookings();
    match action {
        BookingCommands::Branches { from: None } => output(&bookings.branches().await?, flags.format),
        BookingCommands::Branches { from: Some(from) } => {
            output(&bookings.to_branches(*from).await?, flags.format)
        }
        BookingCommands::List { page, page_size } => {
            output(&bookings.bookings(*page, *page_size).await?, flags.format)
        }
        BookingCommands::Show { id } => {
            let booking = bookings.booking(*id).await?;
            output(
                &BookingDetail {
                    booking,
                    qr_url: bookings.booking_qr_url(*id),
                },
                flags.format,
            )
        }
        BookingCommands::Cancel { id } => output(&bookings.cancel_booking(*id).await?, flags.format),
    }
}
