pub mod chat;
pub mod schedule;
pub mod tiers;

use loan_sim_core::amortization::TierTable;

use crate::input;

/// The tier table from `--tiers <path>`, or the standard one.
pub fn load_tiers(path: Option<&str>) -> Result<TierTable, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let table: TierTable = input::file::read_json(p)?;
            tracing::info!(path = p, tiers = table.tiers().len(), "loaded custom tier table");
            Ok(table)
        }
        None => Ok(TierTable::standard()),
    }
}
