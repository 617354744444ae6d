use clap::Args;
use serde_json::Value;

use super::load_tiers;

/// Arguments for listing the tier table
#[derive(Args)]
pub struct TiersArgs {
    /// Path to a JSON tier table to validate and show instead of the standard one
    #[arg(long)]
    pub tiers: Option<String>,
}

pub fn run_tiers(args: TiersArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_tiers(args.tiers.as_deref())?;
    Ok(serde_json::to_value(table.tiers())?)
}
