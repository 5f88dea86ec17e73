//! `fastcommit upgrade`: browse published release assets.

use crate::error::Result;
use crate::github::{asset_list, current_platform, format_size, newest_assets, Asset, Release};
use crate::ui::formatter::release_table;
use crate::ui::{self, Prompt, PromptOutcome, Prompter, SelectPrompt};

/// Assets offered in the selector
pub const UPGRADE_CHOICES: usize = 20;

/// `upgrade list`: every asset as a table
pub fn run_list(releases: &[Release]) {
    println!("{}", release_table(&asset_list(releases)));
}

/// Selector label for one asset
pub fn asset_label(asset: &Asset) -> String {
    format!(
        "{}  {}  ({})",
        asset.tag,
        asset.file_name,
        format_size(asset.size)
    )
}

/// `upgrade`: pick one of the newest assets and print where to get it.
///
/// The first asset built for the running platform is preselected.
pub fn run_upgrade<P>(releases: &[Release], prompter: &mut P) -> Result<Option<Asset>>
where
    P: Prompter + ?Sized,
{
    let assets = newest_assets(&asset_list(releases), UPGRADE_CHOICES);
    if assets.is_empty() {
        ui::display_status("No published release assets found");
        return Ok(None);
    }

    let (os, arch) = current_platform();
    let default = assets
        .iter()
        .position(|asset| asset.matches_platform(os, arch))
        .unwrap_or(0);

    let labels: Vec<String> = assets.iter().map(asset_label).collect();
    let prompt = Prompt::Select(SelectPrompt {
        message: format!("Select a release ({}/{})", os, arch),
        items: labels.clone(),
        default,
        fuzzy: true,
    });

    let chosen = match prompter.ask(&prompt)? {
        PromptOutcome::Submitted(label) => label,
        PromptOutcome::Cancelled => return Ok(None),
    };

    let Some(asset) = labels
        .iter()
        .position(|label| *label == chosen)
        .and_then(|index| assets.get(index))
        .cloned()
    else {
        return Ok(None);
    };

    ui::display_success(&format!("{} ({})", asset.file_name, asset.key()));
    println!("  download: {}", asset.url);
    if !asset.matches_platform(os, arch) {
        ui::display_status(&format!(
            "This asset is built for {}, not for {}/{}",
            asset.key(),
            os,
            arch
        ));
    }

    Ok(Some(asset))
}
