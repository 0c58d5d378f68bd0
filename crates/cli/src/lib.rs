pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use fleura_core::{AppConfig, LoadOptions, LogFormat, TargetStatus};

#[derive(Debug, Parser)]
#[command(
    name = "fleura",
    about = "Fleura storefront CLI",
    long_about = "Browse flowers, place orders, and work the admin order desk of the Fleura storefront backend.",
    after_help = "Examples:\n  fleura login rose\n  fleura flower 5\n  fleura order place 5 --quantity 2\n  fleura admin orders --page 2\n  fleura admin advance 42 --to completed --yes"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Sign in and persist the session")]
    Login {
        username: String,
        #[arg(long, help = "Password; prompted on stdin when omitted")]
        password: Option<String>,
    },
    #[command(about = "Sign out and clear the stored session")]
    Logout,
    #[command(about = "Show a flower with its stock and starting total")]
    Flower { id: i64 },
    #[command(about = "Place and inspect orders")]
    Order {
        #[command(subcommand)]
        command: OrderCommand,
    },
    #[command(about = "Admin order desk")]
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    #[command(about = "Inspect effective configuration values")]
    Config,
    #[command(about = "Run readiness checks against config, session, and backend")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
enum OrderCommand {
    #[command(about = "Order a flower and receive the payment redirect")]
    Place {
        flower: i64,
        #[arg(long, default_value = "1", help = "Requested quantity, reconciled against stock")]
        quantity: String,
    },
    #[command(about = "Show one order with its payment state")]
    Show { id: i64 },
    #[command(about = "List the signed-in customer's orders")]
    History,
}

#[derive(Debug, Subcommand)]
enum AdminCommand {
    #[command(about = "List orders, eight per page")]
    Orders {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    #[command(about = "Advance a pending order to an explicit end state")]
    Advance {
        id: i64,
        #[arg(long = "to", value_enum, help = "Target state for the transition")]
        target: TargetArg,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TargetArg {
    Completed,
    Canceled,
}

impl From<TargetArg> for TargetStatus {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Completed => TargetStatus::Completed,
            TargetArg::Canceled => TargetStatus::Canceled,
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Login { username, password } => commands::auth::login(&username, password),
        Command::Logout => commands::auth::logout(),
        Command::Flower { id } => commands::flower::run(id),
        Command::Order { command } => match command {
            OrderCommand::Place { flower, quantity } => commands::order::place(flower, &quantity),
            OrderCommand::Show { id } => commands::order::show(id),
            OrderCommand::History => commands::order::history(),
        },
        Command::Admin { command } => match command {
            AdminCommand::Orders { page } => commands::admin::orders(page),
            AdminCommand::Advance { id, target, yes } => {
                commands::admin::advance(id, target.into(), yes)
            }
        },
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging() {
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let level = config.logging.level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
