use ferry_core::{AppKind, CheckerUser, Customer};
use serde::Serialize;

use crate::cli::{AuthCommands, GlobalFlags};
use crate::cli::commands::LoginArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct LoginResponse {
    authenticated: bool,
    app: AppKind,
    user: serde_json::Value,
    token_source: Option<&'static str>,
}

#[derive(Serialize)]
struct LogoutResponse {
    cleared: bool,
}

#[derive(Serialize)]
struct WhoamiResponse {
    authenticated: bool,
    app: AppKind,
    token_source: Option<&'static str>,
    user: Option<serde_json::Value>,
}

/// Handle `ferry auth <subcommand>`.
pub async fn handle(
    action: &AuthCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::Login(args) => login(args, ctx, flags).await,
        AuthCommands::Logout => {
            ctx.auth().logout().await?;
            output(&LogoutResponse { cleared: true }, flags.format)
        }
        AuthCommands::Whoami => whoami(ctx, flags).await,
    }
}

async fn login(args: &LoginArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let password = match &args.password {
        Some(password) => password.clone(),
        None => std::env::var("FERRY_PASSWORD").map_err(|_| {
            anyhow::anyhow!("auth login: pass --password or set FERRY_PASSWORD")
        })?,
    };

    let auth = ctx.auth();
    let app = ctx.config.app();
    let user = match app {
        AppKind::Checker => {
            serde_json::to_value(auth.login::<CheckerUser>(&args.email, &password).await?.user)?
        }
        AppKind::Customer => {
            serde_json::to_value(auth.login::<Customer>(&args.email, &password).await?.user)?
        }
    };

    output(
        &LoginResponse {
            authenticated: true,
            app,
            user,
            token_source: ctx.storage.token_source(),
        },
        flags.format,
    )
}

async fn whoami(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let app = ctx.config.app();
    if ctx.storage.session()?.is_none() {
        return output(
            &WhoamiResponse {
                authenticated: false,
                app,
                token_source: None,
                user: None,
            },
            flags.format,
        );
    }

    let user = match ctx.auth().profile::<serde_json::Value>().await {
        Ok(user) => user,
        Err(error) if error.is_network() => {
            tracing::warn!(%error, "profile unavailable; showing cached copy");
            match ctx.storage.profile::<serde_json::Value>()? {
                Some(cached) => cached,
                None => return Err(error.into()),
            }
        }
        Err(error) => return Err(error.into()),
    };

    output(
        &WhoamiResponse {
            authenticated: true,
            app,
            token_source: ctx.storage.token_source(),
            user: Some(user),
        },
        flags.format,
    )
}
