use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use attendance_core::domain::User;
use attendance_infrastructure::{create_pool, run_migrations, Repositories};
use attendance_shared::config::AppConfig;

#[derive(Parser, Debug)]
#[command(
    name = "attendance-cli",
    version,
    about = "Attendance - operator commands for the user store"
)]
struct Cli {
    /// Overrides `database.url` from the configuration
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the user count, setup state and every account
    CheckUsers,

    /// Delete every user so the next registration creates a new superadmin
    ClearUsers {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("failed to load configuration")?;
    attendance_shared::telemetry::init_telemetry(&config.log)?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    match cli.command {
        Command::CheckUsers => check_users(&config).await,
        Command::ClearUsers { yes } => clear_users(&config, yes).await,
        Command::Migrate => migrate(&config).await,
    }
}

async fn check_users(config: &AppConfig) -> Result<()> {
    let repos = Repositories::connect(&config.database).await?;
    let count = repos.users.count().await?;
    let users = repos.users.list().await?;

    println!("Users: {}", count);
    println!("Needs setup: {}", if count == 0 { "yes" } else { "no" });
    for user in &users {
        println!("{}", describe(user));
    }
    Ok(())
}

async fn clear_users(config: &AppConfig, yes: bool) -> Result<()> {
    if !yes {
        bail!("refusing to delete all users without --yes");
    }

    let repos = Repositories::connect(&config.database).await?;
    let deleted = repos.users.delete_all().await?;
    info!("Deleted {} users", deleted);
    println!("Deleted {} users. The next registration creates a new superadmin.", deleted);
    Ok(())
}

async fn migrate(config: &AppConfig) -> Result<()> {
    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;
    println!("Migrations applied");
    Ok(())
}

fn describe(user: &User) -> String {
    format!(
        "  {:<24} {:<10} superadmin={:<5} group={:<12} created={}",
        user.username,
        user.role.as_str(),
        user.is_super_admin,
        user.user_group,
        user.created_at.format("%Y-%m-%d %H:%M:%S"),
    )
}
