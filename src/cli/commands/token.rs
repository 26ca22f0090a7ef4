use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{output, OutputFormat};
use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(help = "Identity-provider user id placed in the `sub` claim")]
    pub user_id: String,

    #[arg(long, help = "Email claim")]
    pub email: Option<String>,

    #[arg(long, help = "Display name claim")]
    pub name: Option<String>,

    #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);
    let claims = Claims::new(args.user_id, args.email, args.name, hours);
    let token = generate_jwt(&claims, &config.security.jwt_secret)?;
    let is_admin = config.security.admin_user_ids.iter().any(|id| *id == claims.sub);

    match output_format {
        OutputFormat::Json => output::success(
            output_format,
            "Token generated",
            Some(json!({
                "token": token,
                "sub": claims.sub,
                "exp": claims.exp,
                "is_admin": is_admin,
            })),
        ),
        // Bare token so it can be captured with $(econsite token ...)
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
