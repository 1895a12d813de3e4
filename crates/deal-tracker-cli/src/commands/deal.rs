use clap::Args;
use serde_json::Value;

use deal_tracker_core::underwriting::{self, DealInput};

use crate::input;

/// Arguments for deal underwriting
#[derive(Args)]
pub struct UnderwriteArgs {
    /// Path to a deal record (.json, .yaml or .yml)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_underwrite(args: UnderwriteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal: DealInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        DealInput::from_value(data)?
    } else {
        return Err("--input <deal.json> or stdin required for underwriting".into());
    };

    let result = underwriting::analyze_deal(&deal);
    for warning in &result.warnings {
        tracing::info!(%warning, "underwriting warning");
    }
    Ok(serde_json::to_value(result)?)
}
