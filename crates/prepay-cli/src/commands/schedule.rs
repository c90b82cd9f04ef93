//! Schedule command: contractual flows of one credit on the band grid.

use std::path::PathBuf;

use clap::Args;
use prepay_core::amortization::generate_schedule;
use prepay_core::grouping::{group_schedule, Grouping};
use prepay_core::Date;
use prepay_engine::assign_bands;
use serde::Serialize;
use tabled::Tabled;

use super::parse_date;
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::input;
use crate::output::{format_amount, print_header, print_output};

/// Arguments for the schedule command.
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Credit portfolio CSV
    #[arg(short, long)]
    pub portfolio: PathBuf,

    /// Credit identifier
    #[arg(long)]
    pub id: String,

    /// Cut-off date the bands are measured from
    #[arg(long, value_parser = parse_date)]
    pub cutoff: Date,

    /// Aggregate by period (monthly, quarterly, semiannual, annual, band)
    #[arg(short, long)]
    pub group: Option<Grouping>,
}

#[derive(Tabled, Serialize)]
struct ScheduleRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Days")]
    days: i64,
    #[tabled(rename = "Band")]
    band: String,
    #[tabled(rename = "t_k")]
    t_k: String,
    #[tabled(rename = "Principal")]
    principal: String,
    #[tabled(rename = "Interest")]
    interest: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

#[derive(Tabled, Serialize)]
struct PeriodRow {
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Principal")]
    principal: String,
    #[tabled(rename = "Interest")]
    interest: String,
    #[tabled(rename = "Total")]
    total: String,
}

/// Executes the schedule command.
pub fn execute(args: ScheduleArgs, format: OutputFormat) -> anyhow::Result<()> {
    let credits = input::load_portfolio(&args.portfolio)?;
    let credit = credits
        .iter()
        .find(|c| c.id == args.id)
        .ok_or_else(|| CliError::UnknownCredit(args.id.clone()))?;
    let schedule = generate_schedule(credit)?;

    if format == OutputFormat::Table {
        print_header(&format!(
            "{} {} {} {}",
            credit.id, credit.amortization, credit.currency, credit.frequency
        ));
    }

    if let Some(grouping) = args.group {
        let rows: Vec<PeriodRow> = group_schedule(&schedule, grouping, args.cutoff)
            .into_iter()
            .map(|p| PeriodRow {
                period: p.period,
                principal: format_amount(p.principal),
                interest: format_amount(p.interest),
                total: format_amount(p.total),
            })
            .collect();
        return print_output(&rows, format);
    }

    let rows: Vec<ScheduleRow> = schedule
        .iter()
        .zip(assign_bands(&schedule, args.cutoff))
        .map(|(row, banded)| ScheduleRow {
            date: row.payment_date.to_string(),
            days: banded.node_days,
            band: banded.band.map_or_else(|| "-".to_string(), |b| b.to_string()),
            t_k: format!("{:.4}", banded.t_k),
            principal: format_amount(row.principal),
            interest: format_amount(row.interest),
            total: format_amount(row.total),
            balance: format_amount(row.remaining_balance),
        })
        .collect();
    print_output(&rows, format)
}
