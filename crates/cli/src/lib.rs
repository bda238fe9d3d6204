pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "pmflow",
    about = "pmflow performance-management operator CLI",
    long_about = "Inspect submissions, derived permissions and workflow actions against a configured performance-management API.",
    after_help = "Examples:\n  pmflow doctor --json\n  pmflow authorize 42\n  pmflow load 42 --month 3\n  pmflow act 42 approve --comment \"looks good\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, session identity, and API reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Derive the permission vector for a submission as the configured user")]
    Authorize { submission_id: i64 },
    #[command(about = "Load a submission view with entry rows and permissions")]
    Load {
        submission_id: i64,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12), help = "Reporting month for actuals")]
        month: Option<u8>,
    },
    #[command(
        about = "Run a workflow action: submit, approve, reject, validate, admin_reject, revert_to_draft"
    )]
    Act {
        submission_id: i64,
        action: String,
        #[arg(long, help = "Comment sent with approve/reject actions")]
        comment: Option<String>,
    },
    #[command(subcommand, about = "List or upload submission evidence")]
    Evidence(EvidenceCommand),
    #[command(about = "Show the approval chain of a submission")]
    Approvals { submission_id: i64 },
    #[command(about = "Print the organization-unit hierarchy")]
    Hierarchy,
}

#[derive(Debug, Subcommand)]
enum EvidenceCommand {
    List {
        submission_id: i64,
    },
    Upload {
        submission_id: i64,
        path: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Authorize { submission_id } => commands::authorize::run(submission_id),
        Command::Load { submission_id, month } => commands::load::run(submission_id, month),
        Command::Act { submission_id, action, comment } => {
            commands::act::run(submission_id, &action, comment)
        }
        Command::Evidence(EvidenceCommand::List { submission_id }) => {
            commands::evidence::list(submission_id)
        }
        Command::Evidence(EvidenceCommand::Upload { submission_id, path, description }) => {
            commands::evidence::upload(submission_id, &path, description)
        }
        Command::Approvals { submission_id } => commands::approvals::run(submission_id),
        Command::Hierarchy => commands::hierarchy::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
