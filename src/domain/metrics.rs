//! Summary statistics over a value curve.

use crate::domain::tax::TRADING_DAYS_PER_YEAR;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurveStats {
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

impl CurveStats {
    pub fn compute(values: &[f64]) -> Self {
        let (first, last) = match (values.first(), values.last()) {
            (Some(&f), Some(&l)) if values.len() > 1 => (f, l),
            _ => return Self::default(),
        };

        let total_return = if first > 0.0 {
            (last - first) / first
        } else {
            0.0
        };

        let years = (values.len() - 1) as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return.is_finite() && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(values);
        let (volatility, sharpe_ratio) = compute_risk_adjusted(values);

        CurveStats {
            total_return,
            annualized_return,
            max_drawdown,
            max_drawdown_duration,
            volatility,
            sharpe_ratio,
        }
    }
}

fn compute_drawdown(values: &[f64]) -> (f64, usize) {
    let Some(&start) = values.first() else {
        return (0.0, 0);
    };

    let mut peak = start;
    let mut max_dd = 0.0_f64;
    let mut max_duration = 0usize;
    let mut current_duration = 0usize;

    for &value in values {
        if value >= peak {
            peak = value;
            current_duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - value) / peak);
            current_duration += 1;
            max_duration = max_duration.max(current_duration);
        }
    }

    (max_dd, max_duration)
}

/// Annualized volatility and Sharpe ratio (zero risk-free rate).
fn compute_risk_adjusted(values: &[f64]) -> (f64, f64) {
    let returns: Vec<f64> = values
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect();

    if returns.is_empty() {
        return (0.0, 0.0);
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    let annual_factor = TRADING_DAYS_PER_YEAR.sqrt();
    let volatility = stddev * annual_factor;
    let sharpe = if stddev > 0.0 {
        mean / stddev * annual_factor
    } else {
        0.0
    };

    (volatility, sharpe)
}
