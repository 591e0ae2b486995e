pub mod deal;
pub mod engine;
pub mod scenario;
pub mod share;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use seller_finance_core::scenarios::{JsonFileScenarioRepository, ScenarioRepository};
use seller_finance_core::share::{decode_share_link, token_from_url};
use seller_finance_core::DealInputs;

use crate::config::Settings;
use crate::input;

/// Where a deal comes from, plus per-field overrides applied on top.
///
/// Sources are tried in order: `--input`, `--link`, `--scenario`, piped
/// stdin, then the built-in sample deal.
#[derive(Args, Debug, Default)]
#[command(allow_hyphen_values = true)]
pub struct DealSourceArgs {
    /// Path to a JSON or YAML file of deal inputs
    #[arg(long)]
    pub input: Option<String>,

    /// Share token or full share URL
    #[arg(long)]
    pub link: Option<String>,

    /// Name of a saved scenario
    #[arg(long)]
    pub scenario: Option<String>,

    /// Sale price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Seller's adjusted cost basis
    #[arg(long)]
    pub basis: Option<Decimal>,

    /// Down payment as a percent of price (e.g. 20 for 20%)
    #[arg(long)]
    pub down_payment_pct: Option<Decimal>,

    /// Annual note rate in percent
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Note term in years
    #[arg(long)]
    pub term_years: Option<Decimal>,

    /// Balloon due at maturity
    #[arg(long)]
    pub balloon: Option<Decimal>,

    /// Annual discount rate in percent
    #[arg(long)]
    pub discount_rate: Option<Decimal>,
}

impl DealSourceArgs {
    pub fn resolve(&self, settings: &Settings) -> Result<DealInputs, Box<dyn std::error::Error>> {
        let defaults = DealInputs::default();

        let mut inputs = if let Some(ref path) = self.input {
            lenient(&input::file::read_json_value(path)?, &defaults)?
        } else if let Some(ref link) = self.link {
            let token = token_from_url(link).unwrap_or(link.as_str());
            decode_share_link(token)?
        } else if let Some(ref name) = self.scenario {
            let repo = JsonFileScenarioRepository::new(settings.scenarios_file());
            repo.load(name)?
                .ok_or_else(|| format!("No saved scenario named '{}'", name.trim()))?
                .inputs
        } else if let Some(data) = input::stdin::read_stdin()? {
            lenient(&data, &defaults)?
        } else {
            defaults
        };

        self.apply_overrides(&mut inputs);
        Ok(inputs)
    }

    fn apply_overrides(&self, inputs: &mut DealInputs) {
        let overrides = [
            (self.price, &mut inputs.price),
            (self.basis, &mut inputs.basis),
            (self.down_payment_pct, &mut inputs.down_payment_pct),
            (self.interest_rate, &mut inputs.interest_rate),
            (self.term_years, &mut inputs.term_years),
            (self.balloon, &mut inputs.balloon),
            (self.discount_rate, &mut inputs.discount_rate),
        ];
        for (value, slot) in overrides {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

/// Decode a deal document, insisting on an object at the top level.
fn lenient(value: &Value, defaults: &DealInputs) -> Result<DealInputs, Box<dyn std::error::Error>> {
    if !value.is_object() {
        return Err("Deal input must be a key-value object".into());
    }
    Ok(DealInputs::from_value_lenient(value, defaults))
}
