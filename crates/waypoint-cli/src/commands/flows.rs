use anyhow::Result;
use colored::Colorize;

use super::App;

pub async fn list() -> Result<()> {
    let app = App::open().await?;
    print_flows(&app).await
}

pub async fn print_flows(app: &App) -> Result<()> {
    let flows = app.service.list_flows().await?;
    if flows.is_empty() {
        println!("{}", "No flows available.".bright_black());
        return Ok(());
    }
    let selected = app.service.controller().flow_id();
    for flow in flows {
        let marker = if selected == Some(flow.flow_id.as_str()) { "*" } else { " " };
        println!(
            "{} {} {} {}",
            marker.green(),
            flow.flow_id.bold(),
            flow.title,
            format!("({} steps)", flow.step_count).bright_black()
        );
    }
    Ok(())
}
