use clap::{Args, Subcommand};
use serde_json::{json, Value};

use seller_finance_core::scenarios::{JsonFileScenarioRepository, ScenarioRepository};

use super::DealSourceArgs;
use crate::config::Settings;

#[derive(Subcommand)]
pub enum ScenarioCommand {
    /// Save a deal under a name, replacing any existing one
    Save(SaveArgs),
    /// List saved scenarios
    List,
    /// Print one saved scenario
    Show(NameArgs),
    /// Delete a saved scenario
    Delete(NameArgs),
}

#[derive(Args)]
pub struct SaveArgs {
    /// Scenario name
    pub name: String,

    #[command(flatten)]
    pub deal: DealSourceArgs,
}

#[derive(Args)]
pub struct NameArgs {
    /// Scenario name
    pub name: String,
}

pub fn run_scenario(
    cmd: ScenarioCommand,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut repo = JsonFileScenarioRepository::new(settings.scenarios_file());

    match cmd {
        ScenarioCommand::Save(args) => {
            let inputs = args.deal.resolve(settings)?;
            let scenario = repo.save(&args.name, &inputs)?;
            Ok(serde_json::to_value(scenario)?)
        }
        ScenarioCommand::List => {
            let rows: Vec<Value> = repo
                .load_all()?
                .into_iter()
                .map(|s| {
                    json!({
                        "name": s.name,
                        "price": s.inputs.price,
                        "interest_rate": s.inputs.interest_rate,
                        "term_years": s.inputs.term_years,
                        "saved_at": s.saved_at,
                    })
                })
                .collect();
            Ok(Value::Array(rows))
        }
        ScenarioCommand::Show(args) => {
            let scenario = repo
                .load(&args.name)?
                .ok_or_else(|| format!("No saved scenario named '{}'", args.name.trim()))?;
            Ok(serde_json::to_value(scenario)?)
        }
        ScenarioCommand::Delete(args) => {
            let deleted = repo.delete(&args.name)?;
            Ok(json!({ "name": args.name.trim(), "deleted": deleted }))
        }
    }
}
