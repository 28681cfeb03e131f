use super::add::{Console, LineReader, StdinReader};
use super::ui;
use crate::core::api::PropertyApi;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

/// Asks before deleting. Anything but `y` cancels.
pub fn confirm<R: LineReader, W: Write>(console: &mut Console<R, W>, id: &str) -> Result<bool> {
    let answer = console.ask(&format!("Delete property {id}? [y/N]: "))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

pub async fn delete(api: &(dyn PropertyApi + Send + Sync), id: &str) -> Result<String> {
    let spinner = ui::new_spinner("Deleting property...");
    let result = api.delete_property(id).await;
    spinner.finish_and_clear();
    let message = result.with_context(|| format!("Failed to delete property {id}"))?;
    info!(%id, "Property deleted");
    Ok(message)
}

pub async fn run(api: &(dyn PropertyApi + Send + Sync), id: &str, assume_yes: bool) -> Result<()> {
    if !assume_yes {
        let mut console = Console::new(StdinReader, std::io::stdout());
        if !confirm(&mut console, id)? {
            console.say("Cancelled.")?;
            return Ok(());
        }
    }
    let message = delete(api, id).await?;
    println!("{}", ui::style_text(&message, ui::StyleType::Success));
    Ok(())
}
