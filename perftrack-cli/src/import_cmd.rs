use anyhow::{Context, Result};
use perftrack_ingest::{ImportProgress, Importer};
use std::path::Path;

use crate::app::App;

fn print_progress(p: ImportProgress) {
    eprintln!("[{:>3}%] {}", p.percent, p.status);
}

pub async fn run(app: &App, file: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let summary = Importer::new(&app.store, &app.session)
        .run(&content, &file_name, print_progress)
        .await?;

    println!(
        "Imported {} lists and {} tasks from {}",
        summary.lists,
        summary.tasks,
        file.display()
    );
    if summary.skipped > 0 {
        println!("Skipped {} entries without a title", summary.skipped);
    }
    Ok(())
}
