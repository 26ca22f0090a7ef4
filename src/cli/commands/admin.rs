use clap::Subcommand;
use serde_json::json;

use crate::auth::AdminSet;
use crate::cli::{output, OutputFormat};
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Report whether a user id passes the admin gate")]
    Check {
        #[arg(help = "Identity-provider user id")]
        user_id: String,
    },

    #[command(about = "List configured administrator ids")]
    List,
}

pub fn handle(cmd: AdminCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let admins = AdminSet::new(config.security.admin_user_ids.iter().cloned());

    match cmd {
        AdminCommands::Check { user_id } => {
            let is_admin = admins.contains(&user_id);
            let message = if is_admin {
                format!("{} is an administrator", user_id)
            } else {
                format!("{} is not an administrator", user_id)
            };
            output::fields(
                output_format,
                &message,
                &[("user_id", json!(user_id)), ("is_admin", json!(is_admin))],
            )
        }
        AdminCommands::List => {
            if admins.is_empty() {
                tracing::warn!("ADMIN_USER_IDS is empty");
            }
            match output_format {
                OutputFormat::Json => output::success(
                    output_format,
                    &format!("{} administrator(s)", admins.len()),
                    Some(json!({ "admins": admins.ids() })),
                ),
                OutputFormat::Text => {
                    if admins.is_empty() {
                        println!("No administrators configured (set ADMIN_USER_IDS)");
                    }
                    for id in admins.ids() {
                        println!("{}", id);
                    }
                    Ok(())
                }
            }
        }
    }
}
