//! Bands command: the normative band table and day lookups.

use clap::Args;
use prepay_core::bands::{band_for_days, time_band_factor, NormativeBand};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::output::{print_output, KeyValue};

/// Arguments for the bands command.
#[derive(Args, Debug)]
pub struct BandsArgs {
    /// Look up the band and time factor of a flow this many days out
    #[arg(long, allow_negative_numbers = true)]
    pub days: Option<i64>,
}

#[derive(Tabled, Serialize)]
struct BandRow {
    #[tabled(rename = "Band")]
    number: u8,
    #[tabled(rename = "From Day")]
    start_day: i64,
    #[tabled(rename = "To Day")]
    end_day: i64,
}

/// Executes the bands command.
pub fn execute(args: BandsArgs, format: OutputFormat) -> anyhow::Result<()> {
    if let Some(days) = args.days {
        let band = band_for_days(days).map_or_else(|| "beyond".to_string(), |b| b.to_string());
        let rows = vec![
            KeyValue::new("Days", days.to_string()),
            KeyValue::new("Band", band),
            KeyValue::from_float("t_k", time_band_factor(days), 4),
        ];
        return print_output(&rows, format);
    }

    let rows: Vec<BandRow> = NormativeBand::table()
        .map(|b| BandRow {
            number: b.number,
            start_day: b.start_day,
            end_day: b.end_day,
        })
        .collect();
    print_output(&rows, format)
}
