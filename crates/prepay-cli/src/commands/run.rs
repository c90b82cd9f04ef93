//! Run command: price a portfolio end to end.

use std::path::PathBuf;

use clap::Args;
use prepay_engine::{
    ConsolidatedRow, CreditFailure, CreditValidation, CreditValuation, EntityValidation,
    PipelineConfig, PipelineCoordinator, PipelineOutput,
};
use prepay_models::paths::Regime;
use serde::Serialize;
use tabled::Tabled;

use super::{MarketArgs, RunParams};
use crate::cli::OutputFormat;
use crate::input;
use crate::output::{
    format_amount, paint_rating, print_document, print_header, print_output, print_success,
    print_warning, KeyValue,
};

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Credit portfolio CSV
    #[arg(short, long)]
    pub portfolio: PathBuf,

    #[command(flatten)]
    pub params: RunParams,

    #[command(flatten)]
    pub market: MarketArgs,

    /// Also list every triggered scenario
    #[arg(long)]
    pub scenarios: bool,
}

/// Present value of a credit under one curve.
#[derive(Tabled, Serialize)]
struct ValueRow {
    #[tabled(rename = "Credit")]
    credit_id: String,
    #[tabled(rename = "Ccy")]
    currency: String,
    #[tabled(rename = "Curve")]
    curve: String,
    #[tabled(rename = "Present Value")]
    present_value: String,
    #[tabled(rename = "Delta")]
    delta: String,
    #[tabled(rename = "Triggered")]
    triggered: usize,
}

/// One triggered prepayment path.
#[derive(Tabled, Serialize)]
struct ScenarioRow {
    #[tabled(rename = "Credit")]
    credit_id: String,
    #[tabled(rename = "Regime")]
    regime: String,
    #[tabled(rename = "Path")]
    simulation: usize,
    #[tabled(rename = "Trigger")]
    trigger_date: String,
    #[tabled(rename = "Bullet")]
    bullet: bool,
    #[tabled(rename = "Prepaid")]
    prepaid: String,
    #[tabled(rename = "Total Flow")]
    total_flow: String,
}

/// Fit of one calibration entity.
#[derive(Tabled, Serialize)]
struct FitRow {
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "R²")]
    r_squared: String,
    #[tabled(rename = "RMSE")]
    rmse: String,
    #[tabled(rename = "MAE")]
    mae: String,
    #[tabled(rename = "Obs")]
    observations: usize,
    #[tabled(rename = "Rating")]
    rating: String,
}

#[derive(Serialize)]
struct ValidationDocument<'a> {
    consolidated: ConsolidatedRow,
    entities: Vec<&'a EntityValidation>,
    credits: &'a [CreditValidation],
}

#[derive(Serialize)]
struct RunDocument<'a> {
    config: &'a PipelineConfig,
    valuations: Vec<&'a CreditValuation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenarios: Option<Vec<ScenarioRow>>,
    failures: &'a [CreditFailure],
    validation: ValidationDocument<'a>,
}

/// Executes the run command.
pub fn execute(args: RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = args.params.resolve()?;
    let credits = input::load_portfolio(&args.portfolio)?;
    let market = args.market.load(config.model, true)?;

    let coordinator = PipelineCoordinator::new(config.clone(), market)?;
    let output = coordinator.run(&credits)?;

    match format {
        OutputFormat::Json => {
            let document = RunDocument {
                config: &config,
                valuations: output.results.iter().map(|r| &r.valuation).collect(),
                scenarios: args.scenarios.then(|| scenario_rows(&output)),
                failures: &output.failures,
                validation: ValidationDocument {
                    consolidated: output.report.consolidated(),
                    entities: output.report.entities().collect(),
                    credits: output.report.credits(),
                },
            };
            print_document(&document)?;
        }
        OutputFormat::Csv => {
            if args.scenarios {
                print_output(&scenario_rows(&output), format)?;
            } else {
                print_output(&value_rows(&output), format)?;
            }
        }
        OutputFormat::Table => print_tables(&config, &output, args.scenarios)?,
    }

    for failure in &output.failures {
        print_warning(&format!("{}: {}", failure.credit_id, failure.message));
    }
    Ok(())
}

fn value_rows(output: &PipelineOutput) -> Vec<ValueRow> {
    let mut rows = Vec::new();
    for result in &output.results {
        let v = &result.valuation;
        rows.push(ValueRow {
            credit_id: v.credit_id.clone(),
            currency: v.currency.to_string(),
            curve: "base".to_string(),
            present_value: format_amount(v.base_pv),
            delta: format_amount(0.0),
            triggered: v.base_paths,
        });
        for s in &v.scenarios {
            rows.push(ValueRow {
                credit_id: v.credit_id.clone(),
                currency: v.currency.to_string(),
                curve: s.scenario.label().to_string(),
                present_value: format_amount(s.present_value),
                delta: format_amount(s.delta),
                triggered: v.stressed_paths,
            });
        }
    }
    rows
}

fn scenario_rows(output: &PipelineOutput) -> Vec<ScenarioRow> {
    output
        .results
        .iter()
        .flat_map(|r| Regime::ALL.into_iter().flat_map(move |regime| r.scenarios(regime)))
        .map(|s| ScenarioRow {
            credit_id: s.credit_id.clone(),
            regime: s.regime.label().to_string(),
            simulation: s.simulation_index,
            trigger_date: s.trigger_date.to_string(),
            bullet: s.is_bullet,
            prepaid: format_amount(s.prepaid_amount()),
            total_flow: format_amount(s.total_flow()),
        })
        .collect()
}

fn fit_rows(output: &PipelineOutput) -> Vec<FitRow> {
    output
        .report
        .entities()
        .map(|e| FitRow {
            entity: e.entity.clone(),
            r_squared: format!("{:.4}", e.metrics.r_squared),
            rmse: format!("{:.6}", e.metrics.rmse),
            mae: format!("{:.6}", e.metrics.mae),
            observations: e.metrics.n_observations,
            rating: e.rating.label().to_string(),
        })
        .collect()
}

fn print_tables(config: &PipelineConfig, output: &PipelineOutput, scenarios: bool) -> anyhow::Result<()> {
    print_header("Run");
    let summary = vec![
        KeyValue::new("Model", config.model.name()),
        KeyValue::new("Cut-off", config.cutoff.to_string()),
        KeyValue::new("Simulations", config.simulations.to_string()),
        KeyValue::new("Seed", config.seed.to_string()),
        KeyValue::from_float("Differential (pp)", config.differential_pct, 2),
        KeyValue::new("Interpolation", config.interpolation.to_string()),
    ];
    print_output(&summary, OutputFormat::Table)?;

    print_header("Present Values");
    print_output(&value_rows(output), OutputFormat::Table)?;

    if scenarios {
        print_header("Triggered Scenarios");
        print_output(&scenario_rows(output), OutputFormat::Table)?;
    }

    let report = &output.report;
    if !report.is_empty() {
        print_header(&format!("Validation ({})", report.model()));
        print_output(&fit_rows(output), OutputFormat::Table)?;

        let row = report.consolidated();
        let mut consolidated = vec![
            KeyValue::new("Entities", row.entities.to_string()),
            KeyValue::new("Good", row.good.to_string()),
            KeyValue::new("Acceptable", row.acceptable.to_string()),
            KeyValue::new("Poor", row.poor.to_string()),
        ];
        if let Some(avg) = row.averages {
            consolidated.push(KeyValue::from_float("Mean R²", avg.mean_r_squared, 4));
            consolidated.push(KeyValue::from_float("Mean RMSE", avg.mean_rmse, 6));
            consolidated.push(KeyValue::from_float("Mean MAE", avg.mean_mae, 6));
        }
        print_output(&consolidated, OutputFormat::Table)?;

        print_header("Traffic Light");
        for (entity, rating) in report.traffic_light() {
            println!("  {entity:<16} {}", paint_rating(rating));
        }
    }

    println!();
    print_success(&format!(
        "{} credits priced, {} failed",
        output.succeeded(),
        output.failed()
    ));
    Ok(())
}
