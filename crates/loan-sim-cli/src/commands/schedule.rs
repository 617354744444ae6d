use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_sim_core::amortization::{calculate_amortization, LoanRequest};

use super::load_tiers;
use crate::input;

/// Arguments for a single amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON loan request (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal in soles
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "term-months")]
    pub months: Option<u32>,

    /// Path to a JSON tier table replacing the standard one
    #[arg(long)]
    pub tiers: Option<String>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: LoanRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(request) = input::stdin::read_piped()? {
        request
    } else {
        LoanRequest::new(
            args.principal
                .ok_or("--principal is required (or provide --input)")?,
            args.months
                .ok_or("--months is required (or provide --input)")?,
        )?
    };

    let table = load_tiers(args.tiers.as_deref())?;
    let output = calculate_amortization(&table, &request)?;
    Ok(serde_json::to_value(output)?)
}
