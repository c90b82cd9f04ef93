//! CSV loaders for portfolios and market data.
//!
//! Headers are matched case-insensitively. Portfolio columns accept both the
//! English names and the Spanish names of bank exports.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;
use prepay_core::{Credit, Currency, Date, ProductCategory};
use prepay_curves::discount::RiskFreeTable;
use prepay_curves::forward::CurveHistory;
use prepay_models::history::HistoricalRateSeries;
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

/// Header lookup for one file.
struct Columns<'a> {
    file: &'a Path,
    index: HashMap<String, usize>,
}

impl<'a> Columns<'a> {
    fn new(file: &'a Path, headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (normalize_header(h), i))
            .collect();
        Self { file, index }
    }

    /// Position of the first alias present.
    fn require(&self, aliases: &[&str]) -> CliResult<usize> {
        aliases
            .iter()
            .find_map(|a| self.index.get(*a).copied())
            .ok_or_else(|| CliError::MissingColumn {
                file: self.file.to_path_buf(),
                column: aliases[0].to_string(),
            })
    }
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

fn reader(path: &Path) -> CliResult<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

fn cell<'r>(record: &'r StringRecord, column: usize) -> &'r str {
    record.get(column).unwrap_or("")
}

fn parse_cell<T>(path: &Path, record: &StringRecord, column: usize, what: &str) -> CliResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = cell(record, column);
    raw.parse::<T>()
        .map_err(|e| CliError::parse(path, line_of(record), format!("{what} '{raw}': {e}")))
}

/// Blank and non-numeric cells become NaN; numeric text must parse.
fn parse_rate(path: &Path, record: &StringRecord, column: usize) -> CliResult<f64> {
    let raw = cell(record, column);
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>()
        .map_err(|e| CliError::parse(path, line_of(record), format!("rate '{raw}': {e}")))
}

fn parse_date(path: &Path, record: &StringRecord, column: usize) -> CliResult<Date> {
    let raw = cell(record, column);
    Date::parse(raw).map_err(|e| CliError::parse(path, line_of(record), e.to_string()))
}

/// Loads the credit portfolio.
pub fn load_portfolio(path: &Path) -> CliResult<Vec<Credit>> {
    let mut rdr = reader(path)?;
    let columns = Columns::new(path, rdr.headers()?);
    let id = columns.require(&["id", "id_producto"])?;
    let amortization = columns.require(&["amortization", "tipo_amortizacion"])?;
    let category = columns.require(&["category", "tipo_producto"])?;
    let principal = columns.require(&["principal", "valor", "monto"])?;
    let rate = columns.require(&["rate", "tasa"])?;
    let installments = columns.require(&["installments", "numero_cuotas"])?;
    let disbursement = columns.require(&["disbursement", "fecha_desembolso"])?;
    let maturity = columns.require(&["maturity", "fecha_vencimiento"])?;
    let currency = columns.require(&["currency", "moneda"])?;
    let frequency = columns.require(&["frequency", "periodicidad_pago"])?;

    let mut credits = Vec::new();
    for record in rdr.records() {
        let record = record?;
        credits.push(Credit {
            id: cell(&record, id).to_string(),
            amortization: parse_cell(path, &record, amortization, "amortization")?,
            category: parse_cell(path, &record, category, "category")?,
            principal: parse_cell(path, &record, principal, "principal")?,
            rate: parse_cell(path, &record, rate, "rate")?,
            installments: parse_cell(path, &record, installments, "installments")?,
            disbursement: parse_date(path, &record, disbursement)?,
            maturity: parse_date(path, &record, maturity)?,
            currency: parse_cell(path, &record, currency, "currency")?,
            frequency: parse_cell(path, &record, frequency, "frequency")?,
        });
    }
    if credits.is_empty() {
        return Err(CliError::Empty(path.to_path_buf()));
    }
    info!(path = %path.display(), credits = credits.len(), "portfolio loaded");
    Ok(credits)
}

/// Loads weekly market rates: a date column followed by one column per
/// product category. Other columns are ignored.
pub fn load_history(path: &Path) -> anyhow::Result<HistoricalRateSeries> {
    let mut rdr = reader(path)?;
    let headers = rdr.headers()?.clone();
    let columns = Columns::new(path, &headers);
    let date = columns.require(&["date", "fecha"])?;
    let categories: Vec<(usize, ProductCategory)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.parse::<ProductCategory>().ok().map(|c| (i, c)))
        .collect();
    if categories.is_empty() {
        return Err(CliError::MissingColumn {
            file: path.to_path_buf(),
            column: "product category".to_string(),
        }
        .into());
    }

    let mut dates = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); categories.len()];
    for record in rdr.records() {
        let record = record?;
        dates.push(parse_date(path, &record, date)?);
        for ((column, _), column_values) in categories.iter().zip(values.iter_mut()) {
            column_values.push(parse_rate(path, &record, *column)?);
        }
    }
    if dates.is_empty() {
        return Err(CliError::Empty(path.to_path_buf()).into());
    }

    let mut series = HistoricalRateSeries::new(dates)?;
    for ((_, category), rates) in categories.into_iter().zip(values) {
        debug!(category = %category, observations = rates.len(), "history column");
        series = series.with_category(category, rates)?;
    }
    info!(path = %path.display(), observations = series.dates().len(), "market history loaded");
    Ok(series)
}

/// Loads the risk-free table: node days, tenor in years and one EA column per
/// currency.
pub fn load_risk_free(path: &Path) -> anyhow::Result<RiskFreeTable> {
    let mut rdr = reader(path)?;
    let headers = rdr.headers()?.clone();
    let columns = Columns::new(path, &headers);
    let node = columns.require(&["days", "node", "nodo", "dias"])?;
    let tenor = columns.require(&["tenor", "plazo"])?;
    let currencies: Vec<(usize, Currency)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.parse::<Currency>().ok().map(|c| (i, c)))
        .collect();
    if currencies.is_empty() {
        return Err(CliError::MissingColumn {
            file: path.to_path_buf(),
            column: "currency".to_string(),
        }
        .into());
    }

    let mut days = Vec::new();
    let mut tenors = Vec::new();
    let mut rates: Vec<Vec<f64>> = vec![Vec::new(); currencies.len()];
    for record in rdr.records() {
        let record = record?;
        days.push(parse_cell::<i64>(path, &record, node, "node")?);
        tenors.push(parse_cell::<f64>(path, &record, tenor, "tenor")?);
        for ((column, _), column_rates) in currencies.iter().zip(rates.iter_mut()) {
            column_rates.push(parse_rate(path, &record, *column)?);
        }
    }

    let mut table = RiskFreeTable::new(days, tenors)?;
    for ((_, currency), column_rates) in currencies.into_iter().zip(rates) {
        table = table.with_currency(currency, column_rates)?;
    }
    info!(path = %path.display(), "risk-free curves loaded");
    Ok(table)
}

/// Loads curve snapshots: a date column followed by one column per day node.
pub fn load_curve_history(path: &Path) -> anyhow::Result<CurveHistory> {
    let mut rdr = reader(path)?;
    let headers = rdr.headers()?.clone();
    let columns = Columns::new(path, &headers);
    let date = columns.require(&["date", "fecha"])?;
    let nodes: Vec<(usize, i64)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date)
        .filter_map(|(i, h)| h.trim().parse::<i64>().ok().map(|n| (i, n)))
        .collect();
    if nodes.is_empty() {
        return Err(CliError::MissingColumn {
            file: path.to_path_buf(),
            column: "numeric curve node".to_string(),
        }
        .into());
    }

    let mut dates = Vec::new();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        dates.push(parse_date(path, &record, date)?);
        rows.push(
            nodes
                .iter()
                .map(|(column, _)| parse_rate(path, &record, *column))
                .collect::<CliResult<Vec<f64>>>()?,
        );
    }

    let history = CurveHistory::new(dates, nodes.into_iter().map(|(_, n)| n).collect(), rows)?;
    info!(path = %path.display(), snapshots = history.dates().len(), "curve history loaded");
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_portfolio_with_spanish_headers() {
        let file = csv_file(
            "ID_producto,Tipo_Amortizacion,Tipo_producto,Valor,Tasa,Numero_Cuotas,\
             Fecha_Desembolso,Fecha_Vencimiento,Moneda,Periodicidad_Pago\n\
             C-1,Francés,Consumo,1000000,0.12,12,15/01/2025,15/01/2026,COP,Mensual\n",
        );
        let credits = load_portfolio(file.path()).unwrap();
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].id, "C-1");
        assert_eq!(credits[0].installments, 12);
        assert_eq!(credits[0].disbursement, Date::from_ymd(2025, 1, 15).unwrap());
    }

    #[test]
    fn test_portfolio_reports_line_of_bad_cell() {
        let file = csv_file(
            "id,amortization,category,principal,rate,installments,disbursement,maturity,currency,frequency\n\
             A,French,Consumo,100,0.1,12,2025-01-15,2026-01-15,COP,Monthly\n\
             B,French,Consumo,abc,0.1,12,2025-01-15,2026-01-15,COP,Monthly\n",
        );
        let err = load_portfolio(file.path()).unwrap_err();
        assert!(matches!(err, CliError::Parse { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_portfolio_missing_column() {
        let file = csv_file("id,rate\nA,0.1\n");
        let err = load_portfolio(file.path()).unwrap_err();
        assert!(err.to_string().contains("amortization"));
    }

    #[test]
    fn test_history_blank_cells_are_nan() {
        let file = csv_file("date,Consumo,Vivienda,notes\n2025-01-03,10.1,,x\n2025-01-10,10.2,11.0,y\n");
        let history = load_history(file.path()).unwrap();
        let obs = history.observations(ProductCategory::Vivienda, None);
        assert_eq!(obs.len(), 1);
        assert!(history.has_category(ProductCategory::Consumo));
        assert!(!history.has_category(ProductCategory::Comercial));
    }

    #[test]
    fn test_risk_free_and_curve_history() {
        let rf = csv_file("days,tenor,COP,USD\n1,0.0027,9.0,5.0\n365,1.0,9.5,5.2\n");
        let table = load_risk_free(rf.path()).unwrap();
        assert_eq!(table.currencies().count(), 2);

        let ch = csv_file("fecha,1,30,365\n2025-01-03,9.0,9.1,9.5\n2025-01-10,9.1,9.2,9.6\n");
        let history = load_curve_history(ch.path()).unwrap();
        assert_eq!(history.dates().len(), 2);

        let bad = csv_file("fecha,short,long\n2025-01-03,9.0,9.1\n");
        assert!(load_curve_history(bad.path()).is_err());
    }
}
