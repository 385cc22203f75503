//! Terminal rendering of the session.

use colored::Colorize;
use waypoint_core::config::WaypointConfig;
use waypoint_core::session::{SessionController, Stage};

const BAR_WIDTH: usize = 30;

pub fn stage_line(controller: &SessionController) {
    let stage = match controller.stage() {
        Stage::Active => controller.stage().to_string().green(),
        Stage::Failed => controller.stage().to_string().red(),
        _ => controller.stage().to_string().yellow(),
    };
    println!("{} {}", "Stage:".bold(), stage);
}

/// Prints a warning when the latest write did not reach storage.
pub fn storage_warning(controller: &SessionController) {
    if let Some(warning) = controller.storage_warning() {
        println!(
            "{}",
            format!("⚠️  Progress not saved: {}", warning).bright_yellow()
        );
    }
}

fn progress_bar(percentage: u8) -> String {
    let filled = BAR_WIDTH * percentage as usize / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percentage
    )
}

pub fn checklist(controller: &SessionController) {
    let Some(flow) = controller.flow() else {
        if let Some(flow_id) = controller.flow_id() {
            println!("Flow {} is not loaded.", flow_id.bold());
        }
        return;
    };

    let title = flow.flow.title.as_deref().unwrap_or(flow.flow_id());
    println!();
    println!("{}", title.bright_magenta().bold());
    println!(
        "{}",
        progress_bar(controller.completion_percentage()).bright_black()
    );

    for step in flow.ordered_steps() {
        let done = controller.completed_steps().contains(&step.step_id);
        let mark = if done { "[x]".green() } else { "[ ]".normal() };
        println!(
            "{} {} {}",
            mark,
            step.display_title(),
            format!("({})", step.step_id).bright_black()
        );

        if !controller.expanded_steps().contains(&step.step_id) {
            continue;
        }
        if let Some(description) = &step.description {
            println!("      {}", description);
        }
        for precondition in &step.preconditions {
            println!("      {} {}", "needs:".bright_black(), precondition);
        }
        for output in &step.outputs {
            println!("      {} {}", "gives:".bright_black(), output);
        }
        for link in &step.official_links {
            println!("      {} {}", link.authority.cyan(), link.url.underline());
        }
        for failure in &step.failure_modes {
            println!("      {} {}", "risk:".red(), failure.what_breaks);
        }
    }
}

/// Prints the configured document list plus anything collected beyond it.
pub fn documents(controller: &SessionController, config: &WaypointConfig) {
    let documents = controller.documents();
    println!();
    println!(
        "{} ({} collected)",
        "Documents".bold(),
        controller.documents_collected()
    );
    for name in &config.document_checklist {
        let mark = if documents.is_collected(name) {
            "[x]".green()
        } else {
            "[ ]".normal()
        };
        println!("{} {}", mark, name);
    }
    for name in documents
        .collected()
        .filter(|name| !config.document_checklist.iter().any(|known| known == name))
    {
        println!("{} {}", "[x]".green(), name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_bounds() {
        assert!(progress_bar(0).starts_with(&format!("[{}]", "-".repeat(BAR_WIDTH))));
        assert!(progress_bar(100).starts_with(&format!("[{}]", "#".repeat(BAR_WIDTH))));
        assert!(progress_bar(33).ends_with("] 33%"));
    }
}
