//! User Service - command line entry point for user management.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_service_lib::config::UserServiceConfig;
use user_service_lib::{MigrateAction, UsersAction};

#[derive(Parser)]
#[command(name = "user-service")]
#[command(about = "User model management")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Reset users and roles to the sample data set
    Seed,
    /// Query users (printed as JSON)
    Users {
        #[command(subcommand)]
        action: UsersCommands,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[derive(Subcommand)]
enum UsersCommands {
    /// List all users
    List,
    /// Show one user by id
    Show { id: i64 },
    /// Find users whose name contains a fragment
    Find { fragment: String },
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = UserServiceConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.service.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            user_service_lib::run_migrations(migrate_action).await
        }
        Commands::Seed => user_service_lib::run_seed().await,
        Commands::Users { action } => {
            let users_action = match action {
                UsersCommands::List => UsersAction::List,
                UsersCommands::Show { id } => UsersAction::Show(id),
                UsersCommands::Find { fragment } => UsersAction::Find(fragment),
            };
            user_service_lib::run_users(users_action).await
        }
    };

    if let Err(err) = result {
        tracing::error!(code = err.code(), error = %err, "Command failed");
        eprintln!("error: {}", err.user_message());
        std::process::exit(1);
    }
}
