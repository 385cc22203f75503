use anyhow::Result;
use clap::{Parser, Subcommand};
use waypoint_core::intake::{City, EntryContext, Nationality, Purpose};

mod commands;

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Waypoint - resumable checklists for immigration flows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current stage, checklist and documents
    Status,
    /// List every available flow
    Flows,
    /// Answer the intake questions and get a recommended flow
    Intake {
        /// EU or NON_EU
        #[arg(long)]
        nationality: Nationality,
        /// FIRST_ENTRY or IN_COUNTRY
        #[arg(long = "entry")]
        entry_context: EntryContext,
        /// EMPLOYMENT, BUSINESS, FAMILY or STUDY
        #[arg(long)]
        purpose: Purpose,
        /// BRATISLAVA or OTHER
        #[arg(long)]
        city: City,
        /// Start the recommended flow
        #[arg(long, conflicts_with = "decline")]
        accept: bool,
        /// Skip the recommendation and pick a flow yourself
        #[arg(long)]
        decline: bool,
    },
    /// Skip the intake and browse all flows
    Browse,
    /// Start a flow by id
    Select { flow_id: String },
    /// Mark a step done (or not done)
    Toggle { step_id: String },
    /// Show or hide the details of a step
    Expand { step_id: String },
    /// Mark a document collected (or not)
    Doc { name: String },
    /// Clear completed steps and documents, keeping the flow
    ClearProgress,
    /// Print the current progress as JSON
    Export,
    /// Forget the flow and every answer
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

/// Logs go to stderr, filtered by `WAYPOINT_LOG` (default: warn).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("WAYPOINT_LOG")
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => commands::session::status().await?,
        Commands::Flows => commands::flows::list().await?,
        Commands::Intake {
            nationality,
            entry_context,
            purpose,
            city,
            accept,
            decline,
        } => {
            let answers = waypoint_core::intake::IntakeAnswers {
                nationality: Some(nationality),
                entry_context: Some(entry_context),
                purpose: Some(purpose),
                city: Some(city),
            };
            let choice = match (accept, decline) {
                (true, _) => commands::session::IntakeChoice::Accept,
                (_, true) => commands::session::IntakeChoice::Decline,
                _ => commands::session::IntakeChoice::Preview,
            };
            commands::session::intake(answers, choice).await?
        }
        Commands::Browse => commands::session::browse().await?,
        Commands::Select { flow_id } => commands::session::select(&flow_id).await?,
        Commands::Toggle { step_id } => commands::checklist::toggle_step(&step_id).await?,
        Commands::Expand { step_id } => commands::checklist::expand_step(&step_id).await?,
        Commands::Doc { name } => commands::checklist::toggle_document(&name).await?,
        Commands::ClearProgress => commands::checklist::clear_progress().await?,
        Commands::Export => commands::checklist::export().await?,
        Commands::Reset { yes } => commands::session::reset(yes).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intake_arguments_parse_case_insensitively() {
        let cli = Cli::try_parse_from([
            "waypoint",
            "intake",
            "--nationality",
            "non_eu",
            "--entry",
            "FIRST_ENTRY",
            "--purpose",
            "employment",
            "--city",
            "BRATISLAVA",
            "--accept",
        ])
        .unwrap();

        match cli.command {
            Commands::Intake {
                nationality,
                accept,
                decline,
                ..
            } => {
                assert_eq!(nationality, Nationality::NonEu);
                assert!(accept);
                assert!(!decline);
            }
            _ => panic!("expected intake"),
        }
    }

    #[test]
    fn test_accept_conflicts_with_decline() {
        let parsed = Cli::try_parse_from([
            "waypoint",
            "intake",
            "--nationality",
            "EU",
            "--entry",
            "IN_COUNTRY",
            "--purpose",
            "STUDY",
            "--city",
            "OTHER",
            "--accept",
            "--decline",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_reset_requires_flag_value() {
        let cli = Cli::try_parse_from(["waypoint", "reset"]).unwrap();
        assert!(matches!(cli.command, Commands::Reset { yes: false }));
    }
}
