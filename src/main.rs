//! Enomy Finances CLI
//!
//! Command-line demo for the investment quote engine

use anyhow::Result;
use clap::Parser;

use enomy_finances::investment::{compute_quote, InvestmentPlan};

/// Quote an investment plan from the command line
#[derive(Debug, Parser)]
#[command(name = "enomy-finances", version, about = "Investment projection demo")]
struct Args {
    /// Plan identifier (BASIC_SAVINGS, SAVINGS_PLUS or MANAGED_STOCK)
    #[arg(long, default_value = "BASIC_SAVINGS")]
    plan: String,

    /// Opening amount
    #[arg(long, default_value_t = 1000.0)]
    initial: f64,

    /// Monthly contribution
    #[arg(long, default_value_t = 100.0)]
    monthly: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    println!("Enomy-Finances v0.1.0");
    println!("=====================\n");

    println!("Available plans:");
    println!(
        "{:<16} {:>10} {:>10} {:>10} {:>14} {:>8}",
        "Plan", "MinInit", "MinMonth", "MaxYearly", "Returns", "Fee"
    );
    println!("{}", "-".repeat(74));
    for plan in InvestmentPlan::ALL {
        let terms = plan.terms();
        println!(
            "{:<16} {:>10.0} {:>10.0} {:>10} {:>14} {:>8}",
            plan.as_str(),
            terms.min_initial,
            terms.min_monthly,
            terms
                .max_yearly_contribution
                .map_or("none".to_string(), |cap| format!("{cap:.0}")),
            format!("{}% - {}%", terms.min_return_pct, terms.max_return_pct),
            format!("{}%", terms.monthly_fee_pct),
        );
    }
    println!();

    let quote = compute_quote(&args.plan, args.initial, args.monthly, 1)?;

    println!(
        "Quote for {} (initial {:.2}, monthly {:.2}):",
        quote.investment_type.as_str(),
        quote.initial_amount,
        quote.monthly_contribution
    );
    println!("   1 year: {:>12.2}", quote.projected_value_1_year);
    println!("  5 years: {:>12.2}", quote.projected_value_5_years);
    println!(" 10 years: {:>12.2}", quote.projected_value_10_years);

    Ok(())
}
