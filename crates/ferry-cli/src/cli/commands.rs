use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Log in, log out, inspect the session.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Scan, look up and check in bookings and tickets.
    Verify {
        #[command(subcommand)]
        action: VerifyCommands,
    },
    /// Offline check-in queue.
    Queue {
        #[command(subcommand)]
        action: QueueCommands,
    },
    /// Customer bookings.
    Booking {
        #[command(subcommand)]
        action: BookingCommands,
    },
    /// Local check-in statistics.
    Stats {
        #[command(subcommand)]
        action: StatsCommands,
    },
}

#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Log in with email and password.
    Login(LoginArgs),
    /// Revoke the session and clear stored credentials.
    Logout,
    /// Show the logged-in profile.
    Whoami,
}

#[derive(Clone, Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    /// Password (falls back to FERRY_PASSWORD).
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum VerifyCommands {
    /// Resolve a scanned QR payload.
    Scan {
        payload: String,
    },
    /// Check in a verification code, queueing it when offline.
    CheckIn {
        code: String,
    },
    /// Look up by booking or ticket number.
    Lookup {
        #[command(subcommand)]
        target: LookupCommands,
    },
}

#[derive(Clone, Debug, Subcommand)]
pub enum LookupCommands {
    Booking {
        number: i64,
        #[arg(long)]
        branch: Option<i64>,
    },
    Ticket {
        number: i64,
        /// Ticket numbers are per branch.
        #[arg(long)]
        branch: Option<i64>,
    },
}

#[derive(Clone, Debug, Subcommand)]
pub enum QueueCommands {
    /// Show queued check-ins.
    Status,
    /// Replay queued check-ins.
    Flush,
}

#[derive(Clone, Debug, Subcommand)]
pub enum BookingCommands {
    /// List branches, or the destinations reachable from `--from`.
    Branches {
        #[arg(long)]
        from: Option<i64>,
    },
    /// List your bookings.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Show one booking.
    Show {
        id: i64,
    },
    /// Cancel a booking.
    Cancel {
        id: i64,
    },
}

#[derive(Clone, Debug, Subcommand)]
pub enum StatsCommands {
    /// Check-ins recorded on this device today.
    Today,
}
