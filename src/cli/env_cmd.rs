use std::path::Path;

use crate::config::{EnvSpec, ENV_SPECS, LOCAL_ENV_FILE};
use crate::ui::{self, formatter::env_table};

/// Required variables that are unset or blank
pub fn missing_required(
    specs: &'static [EnvSpec],
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<&'static EnvSpec> {
    specs
        .iter()
        .filter(|spec| spec.required)
        .filter(|spec| lookup(spec.name).map_or(true, |v| v.trim().is_empty()))
        .collect()
}

pub fn run_env(repo_root: Option<&Path>) {
    let lookup = |name: &str| std::env::var(name).ok();

    println!("{}", env_table(ENV_SPECS, lookup));

    if let Some(root) = repo_root {
        println!(
            "\nlocal env file: {}",
            root.join(".git").join(LOCAL_ENV_FILE).display()
        );
    }

    for spec in missing_required(ENV_SPECS, lookup) {
        ui::display_status(&format!("{} is required but not set", spec.name));
    }
}
