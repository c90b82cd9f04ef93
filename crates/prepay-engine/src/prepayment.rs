//! Path-by-path prepayment detection and schedule restructuring.
//!
//! A credit is prepaid on a simulated path at the first evaluation date where
//! the contractual rate exceeds the simulated EA rate by at least the
//! differential. The schedule is then cut at that date and closed with one
//! terminal row that repays the outstanding principal.
//!
//! Amortizing credits are evaluated on their remaining payment dates. A
//! bullet credit has a single payment, so it is evaluated on synthetic dates:
//! monthly from the earliest prepayment date (the later of the cut-off and
//! the disbursement) when the remaining term is at most five years, yearly
//! otherwise, always ending at maturity.

use prepay_core::{CashFlowRow, CashFlowSchedule, Credit, Date, PrepayResult};
use prepay_curves::discount::DAYS_PER_YEAR;
use prepay_models::paths::{InterpolationMode, PathMatrix, Regime};
use tracing::debug;

use crate::error::EngineResult;
use crate::scenario::PrepaidCashFlowScenario;

/// Remaining terms up to this many years get monthly bullet evaluation dates.
pub const MONTHLY_EVALUATION_MAX_YEARS: f64 = 5.0;

/// Synthetic evaluation dates of a bullet credit maturing at `maturity`.
///
/// Dates are `start + k` months (or years, for terms beyond
/// [`MONTHLY_EVALUATION_MAX_YEARS`]) strictly before maturity, followed by
/// the maturity itself.
///
/// # Errors
///
/// Fails if a date falls outside the supported calendar range.
pub fn bullet_evaluation_dates(start: Date, maturity: Date) -> PrepayResult<Vec<Date>> {
    let term_years = start.days_between(&maturity) as f64 / DAYS_PER_YEAR;
    let monthly = term_years <= MONTHLY_EVALUATION_MAX_YEARS;

    let mut dates = Vec::new();
    for k in 1.. {
        let date = if monthly {
            start.add_months(k)?
        } else {
            start.add_years(k)?
        };
        if date >= maturity {
            break;
        }
        dates.push(date);
    }
    dates.push(maturity);
    Ok(dates)
}

/// Index of the first simulated rate at which
/// `contractual_rate - simulated >= differential`.
///
/// NaN rates never trigger.
#[must_use]
pub fn find_trigger<I>(contractual_rate: f64, simulated: I, differential: f64) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    simulated
        .into_iter()
        .position(|ea| contractual_rate - ea >= differential)
}

/// Cuts an amortizing schedule at `trigger`.
///
/// Rows before `trigger` are kept unchanged. The terminal row is dated at the
/// trigger row and carries the principal not yet repaid plus the interest of
/// the trigger row; the same principal is recorded as prepaid.
#[must_use]
pub fn restructure_amortizing(future: &[CashFlowRow], trigger: usize) -> CashFlowSchedule {
    let total_principal: f64 = future.iter().map(|r| r.principal).sum();
    let kept = &future[..trigger];
    let repaid: f64 = kept.iter().map(|r| r.principal).sum();
    let remaining = total_principal - repaid;
    let row = &future[trigger];

    let mut schedule = CashFlowSchedule::with_capacity(trigger + 1);
    for r in kept {
        schedule.push(*r);
    }
    schedule.push(
        CashFlowRow::new(row.payment_date, remaining, row.interest, 0.0).with_prepayment(remaining),
    );
    schedule
}

/// Single terminal row of a prepaid bullet credit.
///
/// Interest accrues with annual compounding at `rate` from `accrual_start` to
/// `trigger_date`; a trigger before the accrual start accrues nothing.
#[must_use]
pub fn restructure_bullet(
    principal: f64,
    rate: f64,
    accrual_start: Date,
    trigger_date: Date,
) -> CashFlowSchedule {
    let years = accrual_start.days_between(&trigger_date).max(0) as f64 / DAYS_PER_YEAR;
    let interest = principal * ((1.0 + rate).powf(years) - 1.0);
    std::iter::once(
        CashFlowRow::new(trigger_date, principal, interest, 0.0).with_prepayment(principal),
    )
    .collect()
}

/// Applies the prepayment rule to simulated paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrepaymentEngine {
    cutoff: Date,
    differential: f64,
    interpolation: InterpolationMode,
}

impl PrepaymentEngine {
    /// Creates an engine; `differential` is a decimal rate.
    #[must_use]
    pub fn new(cutoff: Date, differential: f64, interpolation: InterpolationMode) -> Self {
        Self {
            cutoff,
            differential,
            interpolation,
        }
    }

    /// Valuation cut-off.
    #[must_use]
    pub fn cutoff(&self) -> Date {
        self.cutoff
    }

    /// Threshold as a decimal rate.
    #[must_use]
    pub fn differential(&self) -> f64 {
        self.differential
    }

    /// Earliest date at which the credit can prepay.
    #[must_use]
    pub fn earliest_prepayment(&self, credit: &Credit) -> Date {
        self.cutoff.max(credit.disbursement)
    }

    /// Rows the trigger rule is evaluated on.
    ///
    /// These are the contractual rows from the earliest prepayment date on.
    /// A bullet credit with a single such row is expanded to its synthetic
    /// dates, counted from the earliest prepayment date and each carrying
    /// the full principal.
    ///
    /// # Errors
    ///
    /// Fails if a synthetic date cannot be built.
    pub fn evaluation_rows(
        &self,
        credit: &Credit,
        schedule: &CashFlowSchedule,
    ) -> PrepayResult<Vec<CashFlowRow>> {
        let start = self.earliest_prepayment(credit);
        let future: Vec<CashFlowRow> = schedule
            .iter()
            .filter(|r| r.payment_date >= start)
            .copied()
            .collect();

        if !(credit.amortization.is_bullet() && future.len() == 1) {
            return Ok(future);
        }

        let last = future[0];
        let dates = bullet_evaluation_dates(start, last.payment_date)?;
        debug!(
            credit_id = %credit.id,
            dates = dates.len(),
            "expanded bullet evaluation dates"
        );
        Ok(dates
            .into_iter()
            .map(|d| {
                if d == last.payment_date {
                    last
                } else {
                    CashFlowRow::new(d, last.principal, 0.0, last.principal)
                }
            })
            .collect())
    }

    /// One restructured scenario per path of `paths` that triggers.
    ///
    /// Scenarios are returned in path order with one-based
    /// `simulation_index`.
    ///
    /// # Errors
    ///
    /// Fails if the evaluation dates cannot be built.
    pub fn scenarios(
        &self,
        credit: &Credit,
        schedule: &CashFlowSchedule,
        paths: &PathMatrix,
        regime: Regime,
    ) -> EngineResult<Vec<PrepaidCashFlowScenario>> {
        let rows = self.evaluation_rows(credit, schedule)?;
        if rows.is_empty() {
            debug!(credit_id = %credit.id, "no cash flows after the cut-off");
            return Ok(Vec::new());
        }

        let dates: Vec<Date> = rows.iter().map(|r| r.payment_date).collect();
        let rates = paths.interpolate(&dates, self.interpolation);
        let is_bullet = credit.amortization.is_bullet();
        let accrual_start = self.earliest_prepayment(credit);

        let scenarios: Vec<PrepaidCashFlowScenario> = (0..paths.n_paths())
            .filter_map(|p| {
                let trigger = find_trigger(credit.rate, rates.column(p).iter().copied(), self.differential)?;
                let trigger_date = rows[trigger].payment_date;
                let schedule = if is_bullet {
                    restructure_bullet(rows[trigger].principal, credit.rate, accrual_start, trigger_date)
                } else {
                    restructure_amortizing(&rows, trigger)
                };
                Some(PrepaidCashFlowScenario {
                    credit_id: credit.id.clone(),
                    regime,
                    simulation_index: p + 1,
                    is_bullet,
                    trigger_date,
                    currency: credit.currency,
                    schedule,
                })
            })
            .collect();

        debug!(
            credit_id = %credit.id,
            regime = %regime,
            triggered = scenarios.len(),
            paths = paths.n_paths(),
            "prepayment scenarios"
        );
        Ok(scenarios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use prepay_core::{AmortizationType, Currency, PaymentFrequency, ProductCategory};
    use prepay_curves::conversion::ea_to_short;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn rows() -> Vec<CashFlowRow> {
        vec![
            CashFlowRow::new(d(2025, 2, 1), 300.0, 30.0, 700.0),
            CashFlowRow::new(d(2025, 3, 1), 300.0, 20.0, 400.0),
            CashFlowRow::new(d(2025, 4, 1), 400.0, 10.0, 0.0),
        ]
    }

    fn credit(amortization: AmortizationType, maturity: Date) -> Credit {
        Credit {
            id: "C-1".to_string(),
            amortization,
            category: ProductCategory::Comercial,
            principal: 1000.0,
            rate: 0.12,
            installments: 3,
            disbursement: d(2025, 1, 1),
            maturity,
            currency: Currency::COP,
            frequency: PaymentFrequency::Monthly,
        }
    }

    fn flat_paths(anchor: Date, levels: &[f64]) -> PathMatrix {
        let ea = Array2::from_shape_fn((2, levels.len()), |(_, p)| levels[p]);
        PathMatrix::new(anchor, vec![0.0, 4000.0], ea.mapv(ea_to_short), ea).unwrap()
    }

    #[test]
    fn test_first_trigger_wins() {
        // Crosses at 1, drops back, crosses again at 3.
        let path = [0.10, 0.05, 0.11, 0.04];
        assert_eq!(find_trigger(0.12, path, 0.05), Some(1));
        assert_eq!(find_trigger(0.12, [0.10, 0.11], 0.05), None);
        assert_eq!(find_trigger(0.12, [f64::NAN, 0.0], 0.05), Some(1));
    }

    #[test]
    fn test_restructure_amortizing() {
        let future = rows();
        let s = restructure_amortizing(&future, 1);
        assert_eq!(s.len(), 2);
        assert_eq!(s.as_slice()[0], future[0]);

        let last = s.as_slice()[1];
        assert_eq!(last.payment_date, d(2025, 3, 1));
        assert_relative_eq!(last.principal, 700.0);
        assert_relative_eq!(last.interest, 20.0);
        assert_relative_eq!(last.total, 720.0);
        assert_relative_eq!(last.prepayment, 700.0);
        assert_relative_eq!(s.total_principal(), 1000.0);
    }

    #[test]
    fn test_restructure_bullet_accrues_compound_interest() {
        let s = restructure_bullet(1000.0, 0.10, d(2025, 1, 1), d(2026, 1, 1));
        assert_eq!(s.len(), 1);
        let row = s.as_slice()[0];
        assert_relative_eq!(row.interest, 1000.0 * (1.1_f64.powf(365.0 / 365.0) - 1.0), epsilon = 1e-9);
        assert_relative_eq!(row.prepayment, 1000.0);

        let early = restructure_bullet(1000.0, 0.10, d(2025, 6, 1), d(2025, 1, 1));
        assert_eq!(early.as_slice()[0].interest, 0.0);
    }

    #[test]
    fn test_bullet_dates_monthly_and_annual() {
        let cutoff = d(2025, 1, 31);
        let monthly = bullet_evaluation_dates(cutoff, d(2025, 5, 15)).unwrap();
        assert_eq!(
            monthly,
            vec![d(2025, 2, 28), d(2025, 3, 31), d(2025, 4, 30), d(2025, 5, 15)]
        );

        let annual = bullet_evaluation_dates(cutoff, d(2032, 1, 31)).unwrap();
        assert_eq!(annual.len(), 7);
        assert_eq!(annual[0], d(2026, 1, 31));
        assert_eq!(annual[5], d(2031, 1, 31));
        assert_eq!(annual[6], d(2032, 1, 31));

        // Maturity on a monthly step is not duplicated.
        let exact = bullet_evaluation_dates(cutoff, d(2025, 3, 31)).unwrap();
        assert_eq!(exact, vec![d(2025, 2, 28), d(2025, 3, 31)]);
    }

    #[test]
    fn test_scenarios_keep_only_triggered_paths() {
        let schedule: CashFlowSchedule = rows().into_iter().collect();
        let c = credit(AmortizationType::French, d(2025, 4, 1));
        let engine = PrepaymentEngine::new(d(2025, 1, 1), 0.03, InterpolationMode::Ea);
        let paths = flat_paths(d(2025, 1, 1), &[0.10, 0.08, 0.11]);

        let scenarios = engine.scenarios(&c, &schedule, &paths, Regime::Base).unwrap();
        assert_eq!(scenarios.len(), 1);
        let s = &scenarios[0];
        assert_eq!(s.simulation_index, 2);
        assert_eq!(s.trigger_date, d(2025, 2, 1));
        assert!(!s.is_bullet);
        assert_relative_eq!(s.prepaid_amount(), 1000.0);
        assert_relative_eq!(s.total_flow(), 1030.0);
    }

    #[test]
    fn test_rows_before_cutoff_are_not_evaluated() {
        let schedule: CashFlowSchedule = rows().into_iter().collect();
        let c = credit(AmortizationType::German, d(2025, 4, 1));
        let engine = PrepaymentEngine::new(d(2025, 2, 15), 0.0, InterpolationMode::Short);
        let paths = flat_paths(d(2025, 2, 15), &[0.05]);

        let scenarios = engine.scenarios(&c, &schedule, &paths, Regime::Stressed).unwrap();
        let s = &scenarios[0];
        assert_eq!(s.trigger_date, d(2025, 3, 1));
        assert_eq!(s.schedule.len(), 1);
        assert_relative_eq!(s.schedule.as_slice()[0].principal, 700.0);
        assert_eq!(s.regime, Regime::Stressed);
    }

    #[test]
    fn test_bullet_scenario_uses_synthetic_dates() {
        let maturity = d(2026, 1, 1);
        let schedule: CashFlowSchedule =
            std::iter::once(CashFlowRow::new(maturity, 1000.0, 120.0, 0.0)).collect();
        let c = credit(AmortizationType::Bullet, maturity);
        let engine = PrepaymentEngine::new(d(2025, 1, 1), 0.02, InterpolationMode::Ea);
        let paths = flat_paths(d(2025, 1, 1), &[0.09]);

        let rows = engine.evaluation_rows(&c, &schedule).unwrap();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].interest, 0.0);
        assert_eq!(rows[11], schedule.as_slice()[0]);

        let s = &engine.scenarios(&c, &schedule, &paths, Regime::Base).unwrap()[0];
        assert!(s.is_bullet);
        assert_eq!(s.trigger_date, d(2025, 2, 1));
        let row = s.schedule.as_slice()[0];
        assert_relative_eq!(row.interest, 1000.0 * (1.12_f64.powf(31.0 / 365.0) - 1.0), epsilon = 1e-9);
        assert_relative_eq!(row.principal, 1000.0);
    }

    #[test]
    fn test_bullet_disbursed_after_cutoff_prepays_after_disbursement() {
        let disbursement = d(2025, 6, 15);
        let maturity = d(2026, 6, 15);
        let schedule: CashFlowSchedule =
            std::iter::once(CashFlowRow::new(maturity, 1000.0, 120.0, 0.0)).collect();
        let mut c = credit(AmortizationType::Bullet, maturity);
        c.disbursement = disbursement;
        let engine = PrepaymentEngine::new(d(2025, 1, 15), 0.0, InterpolationMode::Ea);
        let paths = flat_paths(d(2025, 1, 15), &[0.05, 0.05]);

        let rows = engine.evaluation_rows(&c, &schedule).unwrap();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].payment_date, d(2025, 7, 15));
        assert!(rows.iter().all(|r| r.payment_date > disbursement));

        let scenarios = engine.scenarios(&c, &schedule, &paths, Regime::Base).unwrap();
        assert_eq!(scenarios.len(), 2);
        for s in &scenarios {
            assert_eq!(s.trigger_date, d(2025, 7, 15));
            let row = s.schedule.as_slice()[0];
            assert_relative_eq!(row.interest, 1000.0 * (1.12_f64.powf(30.0 / 365.0) - 1.0), epsilon = 1e-9);
            assert!(row.interest > 0.0);
        }
    }

    #[test]
    fn test_matured_credit_has_no_scenarios() {
        let schedule: CashFlowSchedule = rows().into_iter().collect();
        let c = credit(AmortizationType::French, d(2025, 4, 1));
        let engine = PrepaymentEngine::new(d(2025, 6, 1), 0.0, InterpolationMode::Ea);
        let paths = flat_paths(d(2025, 6, 1), &[0.0]);
        assert!(engine.scenarios(&c, &schedule, &paths, Regime::Base).unwrap().is_empty());
    }
}
