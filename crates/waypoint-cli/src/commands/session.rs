use anyhow::{Result, bail};
use colored::Colorize;
use waypoint_core::intake::{IntakeAnswers, IntakeRecord};
use waypoint_core::session::Stage;

use super::{App, render};

/// What to do with the recommendation once it arrives.
pub enum IntakeChoice {
    Preview,
    Accept,
    Decline,
}

pub async fn status() -> Result<()> {
    let app = App::open().await?;
    print_session(&app);
    Ok(())
}

fn print_session(app: &App) {
    let controller = app.service.controller();
    render::stage_line(controller);
    match controller.stage() {
        Stage::Intake => println!(
            "{}",
            "Run `waypoint intake ...` for a recommendation or `waypoint browse` to pick a flow."
                .bright_black()
        ),
        Stage::Select => println!(
            "{}",
            "Run `waypoint flows` then `waypoint select <flow_id>`.".bright_black()
        ),
        Stage::Failed => {
            println!(
                "{}",
                format!(
                    "❌ {}",
                    controller.error().unwrap_or("The flow could not be loaded")
                )
                .red()
            );
            println!("{}", "Run `waypoint reset --yes` to start over.".bright_black());
        }
        Stage::Resolving | Stage::Active => {
            render::checklist(controller);
            render::documents(controller, &app.config);
        }
    }
    render::storage_warning(controller);
}

pub async fn intake(answers: IntakeAnswers, choice: IntakeChoice) -> Result<()> {
    let mut app = App::open().await?;
    if app.service.stage() != Stage::Intake {
        bail!(
            "A session is already in progress (stage {}). Run `waypoint reset --yes` first.",
            app.service.stage()
        );
    }

    let recommendation = match app.service.recommend(&answers).await {
        Ok(recommendation) => Some(recommendation),
        Err(err) => {
            if matches!(choice, IntakeChoice::Accept) {
                return Err(err.into());
            }
            println!("{}", format!("⚠️  No recommendation: {}", err).bright_yellow());
            None
        }
    };

    if let Some(recommendation) = &recommendation {
        println!(
            "{} {} {}",
            "Recommended:".bold(),
            recommendation.title.bright_magenta(),
            format!("({}, confidence {})", recommendation.flow_id, recommendation.confidence)
                .bright_black()
        );
        if let Some(reason) = &recommendation.reason {
            println!("  {}", reason);
        }
    }

    match (choice, recommendation) {
        (IntakeChoice::Preview, _) => {
            println!(
                "{}",
                "Re-run with --accept to start this flow or --decline to browse.".bright_black()
            );
        }
        (IntakeChoice::Accept, Some(recommendation)) => {
            app.service
                .complete_intake(IntakeRecord::accepted(answers, recommendation))?;
            app.service.settle().await;
            print_session(&app);
        }
        (IntakeChoice::Accept, None) => bail!("No recommendation to accept"),
        (IntakeChoice::Decline, recommendation) => {
            app.service
                .complete_intake(IntakeRecord::declined(answers, recommendation))?;
            println!("Run `waypoint flows` then `waypoint select <flow_id>`.");
        }
    }
    Ok(())
}

pub async fn browse() -> Result<()> {
    let mut app = App::open().await?;
    if app.service.stage() != Stage::Select {
        app.service.browse_flows()?;
    }
    super::flows::print_flows(&app).await
}

pub async fn select(flow_id: &str) -> Result<()> {
    let mut app = App::open().await?;
    if app.service.stage() == Stage::Intake {
        app.service.browse_flows()?;
    }
    app.service.select_flow(flow_id)?;
    app.service.settle().await;
    print_session(&app);
    Ok(())
}

pub async fn reset(confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("Reset discards the flow, all progress and intake answers. Re-run with --yes.");
    }
    let mut app = App::open().await?;
    app.service.reset();
    println!("✅ Session reset.");
    Ok(())
}
