use anyhow::Result;
use colored::Colorize;

use super::{App, render};

pub async fn toggle_step(step_id: &str) -> Result<()> {
    let mut app = App::open().await?;
    let completed = app.service.toggle_step_completion(step_id)?;
    let state = if completed { "done".green() } else { "not done".yellow() };
    println!("Step {} marked {}", step_id.bold(), state);
    render::checklist(app.service.controller());
    render::storage_warning(app.service.controller());
    Ok(())
}

pub async fn expand_step(step_id: &str) -> Result<()> {
    let mut app = App::open().await?;
    app.service.toggle_step_expansion(step_id)?;
    render::checklist(app.service.controller());
    render::storage_warning(app.service.controller());
    Ok(())
}

pub async fn toggle_document(name: &str) -> Result<()> {
    let mut app = App::open().await?;
    let collected = app.service.toggle_document(name)?;
    let state = if collected { "collected".green() } else { "missing".yellow() };
    println!("{} marked {}", name.bold(), state);
    render::documents(app.service.controller(), &app.config);
    render::storage_warning(app.service.controller());
    Ok(())
}

pub async fn clear_progress() -> Result<()> {
    let mut app = App::open().await?;
    app.service.clear_progress()?;
    println!("✅ Progress cleared.");
    render::storage_warning(app.service.controller());
    Ok(())
}

pub async fn export() -> Result<()> {
    let app = App::open().await?;
    let export = app.service.export_progress()?;
    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}
