//! Pure formatting functions for UI output.
//!
//! Display logic lives here, separated from user interaction. Table
//! builders return strings so they can be tested.

use crate::boundary::BoundaryWarning;
use crate::config::EnvSpec;
use crate::github::{format_size, Asset};
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the proposed tag next to the current maximum, if any.
pub fn display_proposed_tag(current: Option<&str>, proposed: &str) {
    match current {
        Some(current) => {
            println!("\n{}", style("Proposed Tag:").bold());
            println!("  Latest: {}", style(current).red());
            println!("  Next:   {}", style(proposed).green());
        }
        None => {
            println!("\n{}", style("Initial Tag:").bold());
            println!("  New tag: {}", style(proposed).green());
        }
    }
}

/// Display manual push instruction for a tag.
pub fn display_manual_push_instruction(tag: &str, remote: &str) {
    println!(
        "\n{} To push this tag later, run:\n  {}",
        style("→").yellow(),
        style(format!("git push {} {}", remote, tag)).cyan()
    );
}

/// Follow-up steps after a pull that needs the user's attention.
pub fn display_pull_followup(conflicts: &[String]) {
    println!("\n----------------------------------------");
    if conflicts.is_empty() {
        println!("Remote changes were merged.");
    } else {
        println!("{}", style("Merge conflicts detected! Please resolve them:").red());
        for file in conflicts {
            println!("  - {}", file);
        }
    }
    println!("Now you can:");
    println!("   1. Review changes");
    println!("   2. Run 'git add .' to stage resolved files");
    println!("   3. Run 'git commit' to conclude the merge");
    println!("   4. Then run 'git push --force-with-lease'");
    println!("----------------------------------------");
}

/// Render a left-aligned table with a bold header row.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![style(format_row(
        headers.iter().map(|h| h.to_string()).collect(),
    ))
    .bold()
    .to_string()];
    lines.extend(rows.iter().map(|row| format_row(row.clone())));
    lines.join("\n")
}

/// Release assets table for `upgrade list`
pub fn release_table(assets: &[Asset]) -> String {
    let rows: Vec<Vec<String>> = assets
        .iter()
        .filter(|asset| !asset.checksum)
        .map(|asset| {
            vec![
                asset.tag.clone(),
                asset.os.clone(),
                asset.arch.clone(),
                format_size(asset.size),
                asset.url.clone(),
            ]
        })
        .collect();

    render_table(&["TAG", "OS", "ARCH", "SIZE", "URL"], &rows)
}

/// Environment variable table for the `env` command
pub fn env_table(specs: &[EnvSpec], lookup: impl Fn(&str) -> Option<String>) -> String {
    let rows: Vec<Vec<String>> = specs
        .iter()
        .map(|spec| {
            let current = spec
                .display_value(lookup(spec.name).as_deref())
                .unwrap_or_else(|| "-".to_string());
            vec![
                spec.name.to_string(),
                spec.description.to_string(),
                if spec.default.is_empty() {
                    "-".to_string()
                } else {
                    spec.default.to_string()
                },
                if spec.required { "yes" } else { "no" }.to_string(),
                current,
            ]
        })
        .collect();

    render_table(&["NAME", "DESCRIPTION", "DEFAULT", "REQUIRED", "VALUE"], &rows)
}
