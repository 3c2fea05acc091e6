use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use recipe_core::action_time::ActionTimeStore;
use recipe_core::config::{Config, ResolvedPaths};

use crate::output::{print_json, print_table};

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum ParamsSubcommand {
    /// Show the current action-time table
    Show,
    /// Restore the action-time table from its master copy
    Reset,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcommand: ParamsSubcommand, json: bool) -> Result<()> {
    let config = Config::load(root)?;
    let paths = ResolvedPaths::new(root, &config.data);
    let store = ActionTimeStore::open(paths.action_time.clone(), paths.action_time_master.clone());

    match subcommand {
        ParamsSubcommand::Show => {
            let records = store.read()?.records();
            if json {
                return print_json(&records);
            }
            if records.is_empty() {
                println!("No action times recorded.");
                return Ok(());
            }
            let rows = records
                .into_iter()
                .map(|r| vec![r.action, r.time.to_string()])
                .collect();
            print_table(&["ACTION", "SECONDS"], rows);
        }
        ParamsSubcommand::Reset => {
            store.reset()?;
            if json {
                return print_json(&serde_json::json!({ "status": "OK" }));
            }
            println!(
                "Restored {} from {}",
                paths.action_time.display(),
                paths.action_time_master.display()
            );
        }
    }
    Ok(())
}
