//! Report rendering for the terminal and for `--format json`.

use anyhow::Result;
use console::style;

use skl_core::commands::{
    CatalogReport, InfoReport, InfoSource, InstallReport, InstalledEntry, RemoveReport,
    UpdateReport,
};
use skl_core::reconcile::{ActionKind, ActionOutcome, is_commit_hash};

use crate::OutputFormat;

pub(crate) fn print_install(report: &InstallReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!(
                "{} Installed {} -> {}",
                style("✓").green(),
                style(&report.key).bold(),
                report.path.display()
            );
            println!("  Manifest: {}", report.manifest_value);
            println!("  Locked:   {}", report.locked);
            if report.gitignore_updated {
                println!("  Added lock file to .gitignore");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "key": report.key,
                "package": report.package_id,
                "path": report.path,
                "subtree": report.subtree,
                "manifest": report.manifest_value,
                "locked": report.locked,
                "gitignore_updated": report.gitignore_updated,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub(crate) fn print_remove(report: &RemoveReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{} Removed {}", style("✓").green(), style(&report.name).bold());
            if !report.removed_dir {
                println!("  (no directory at {})", report.path.display());
            }
            for key in &report.manifest_keys {
                println!("  Dropped {} from manifest", key);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "name": report.name,
                "path": report.path,
                "removed_dir": report.removed_dir,
                "manifest_keys": report.manifest_keys,
                "lock_keys": report.lock_keys,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub(crate) fn print_catalog(report: &CatalogReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => match &report.catalog {
            Some(catalog) if !catalog.is_empty() => {
                println!("{} ({} skills):", style(&report.repo).bold(), catalog.skills.len());
                for entry in &catalog.skills {
                    let title = if entry.display_name.is_empty() {
                        entry.id.as_str()
                    } else {
                        entry.display_name.as_str()
                    };
                    println!("  {:<24} {}", style(&entry.id).cyan(), title);
                    if !entry.description.is_empty() {
                        println!("  {:<24} {}", "", style(&entry.description).dim());
                    }
                }
            }
            Some(_) => println!("{} has an empty catalog", report.repo),
            None => {
                println!("No catalog found for {}", report.repo);
                println!("Browse the repository at: {}", report.browse_url);
            }
        },
        OutputFormat::Json => {
            let output = serde_json::json!({
                "repo": report.repo,
                "browse_url": report.browse_url,
                "catalog": report.catalog,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub(crate) fn print_info(report: &InfoReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            match &report.source {
                InfoSource::Installed { path } => {
                    println!("{}", style(path.display()).dim());
                }
                InfoSource::Remote { key, browse_url } => {
                    println!("{} ({})", style(key).dim(), style(browse_url).dim());
                }
            }
            println!();
            print!("{}", report.content);
            if !report.content.ends_with('\n') {
                println!();
            }
        }
        OutputFormat::Json => {
            let source = match &report.source {
                InfoSource::Installed { path } => serde_json::json!({
                    "kind": "installed",
                    "path": path,
                }),
                InfoSource::Remote { key, browse_url } => serde_json::json!({
                    "kind": "remote",
                    "key": key,
                    "browse_url": browse_url,
                }),
            };
            let output = serde_json::json!({
                "package": report.package_id,
                "source": source,
                "content": report.content,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub(crate) fn print_update(report: &UpdateReport, format: OutputFormat) -> Result<()> {
    let Some(result) = &report.result else {
        match format {
            OutputFormat::Table => {
                println!("No manifest found at {}", report.manifest_path.display());
                println!("Install a package with 'skl install <reference>' to create one.");
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "manifest": report.manifest_path,
                    "manifest_found": false,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        return Ok(());
    };

    match format {
        OutputFormat::Table => {
            if result.plan.is_empty() {
                println!("{} Everything is up to date", style("✓").green());
                return Ok(());
            }
            for outcome in &result.outcomes {
                print_outcome(outcome);
            }
            println!();
            let summary = format!("{}/{} succeeded", result.succeeded(), result.total());
            if result.failed() > 0 {
                println!("{}", style(summary).yellow());
            } else {
                println!("{}", style(summary).green());
            }
        }
        OutputFormat::Json => {
            let outcomes: Vec<_> = result
                .outcomes
                .iter()
                .map(|o| {
                    serde_json::json!({
                        "key": o.key,
                        "action": o.kind.to_string(),
                        "from": o.from,
                        "to": o.to,
                        "locked": o.locked,
                        "error": o.error.as_ref().map(|e| format!("{:#}", e)),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "manifest": report.manifest_path,
                "manifest_found": true,
                "outcomes": outcomes,
                "succeeded": result.succeeded(),
                "total": result.total(),
                "lock_written": report.lock_written,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn print_outcome(outcome: &ActionOutcome) {
    let detail = match outcome.kind {
        ActionKind::Remove => String::new(),
        ActionKind::Upgrade => format!(
            " ({} -> {})",
            outcome.from.as_deref().unwrap_or("-"),
            outcome.to.as_deref().unwrap_or("-")
        ),
        ActionKind::Install => format!(" ({})", outcome.to.as_deref().unwrap_or("*")),
    };
    match &outcome.error {
        None => println!(
            "{} {} {}{}",
            style("✓").green(),
            outcome.kind,
            outcome.key,
            detail
        ),
        Some(err) => {
            println!(
                "{} {} {}{}",
                style("✗").red(),
                outcome.kind,
                outcome.key,
                detail
            );
            for line in format!("{:#}", err).lines() {
                println!("    {}", line);
            }
        }
    }
}

pub(crate) fn print_installed(entries: &[InstalledEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("No skills installed.");
                return Ok(());
            }
            println!("Installed skills ({}):", entries.len());
            for entry in entries {
                let state = match (&entry.key, &entry.locked) {
                    (Some(_), Some(locked)) => short_ref(locked),
                    (Some(_), None) => "not locked".to_string(),
                    (None, _) => "unmanaged".to_string(),
                };
                let marker = if entry.has_marker {
                    String::new()
                } else {
                    format!(" {}", style("(no SKILL.md)").yellow())
                };
                println!(
                    "  {:<24} {}{}",
                    style(&entry.name).cyan(),
                    style(state).dim(),
                    marker
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<_> = entries
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "name": e.name,
                        "path": e.path,
                        "has_skill_md": e.has_marker,
                        "key": e.key,
                        "manifest": e.manifest_value,
                        "locked": e.locked,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// Abbreviate commit hashes; leave symbolic refs alone.
fn short_ref(value: &str) -> String {
    if is_commit_hash(value) {
        value[..12].to_string()
    } else {
        value.to_string()
    }
}
