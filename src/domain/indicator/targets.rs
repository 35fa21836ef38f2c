//! Volatility cone price targets.
//!
//! For each horizon t (in years): sigma_t = vol * sqrt(t),
//! min = P * exp(-sigma_t), max = P * exp(sigma_t), mean = P (zero drift).
//! Values are rounded to cents.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TargetHorizon {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl TargetHorizon {
    pub const ALL: [TargetHorizon; 4] = [
        TargetHorizon::OneMonth,
        TargetHorizon::ThreeMonths,
        TargetHorizon::SixMonths,
        TargetHorizon::OneYear,
    ];

    pub fn years(self) -> f64 {
        match self {
            TargetHorizon::OneMonth => 1.0 / 12.0,
            TargetHorizon::ThreeMonths => 3.0 / 12.0,
            TargetHorizon::SixMonths => 6.0 / 12.0,
            TargetHorizon::OneYear => 1.0,
        }
    }
}

impl fmt::Display for TargetHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TargetHorizon::OneMonth => "1M",
            TargetHorizon::ThreeMonths => "3M",
            TargetHorizon::SixMonths => "6M",
            TargetHorizon::OneYear => "1Y",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PriceTarget {
    pub horizon: TargetHorizon,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PriceTargetBand {
    pub current_price: f64,
    pub volatility: f64,
    pub targets: Vec<PriceTarget>,
}

impl PriceTargetBand {
    pub fn get(&self, horizon: TargetHorizon) -> Option<&PriceTarget> {
        self.targets.iter().find(|t| t.horizon == horizon)
    }
}

/// A negative or non-finite volatility is treated as zero.
pub fn compute_price_targets(current_price: f64, volatility: f64) -> PriceTargetBand {
    let vol = if volatility.is_finite() && volatility > 0.0 {
        volatility
    } else {
        0.0
    };

    let targets = TargetHorizon::ALL
        .iter()
        .map(|&horizon| {
            let sigma = vol * horizon.years().sqrt();
            PriceTarget {
                horizon,
                min: round_cents(current_price * (-sigma).exp()),
                mean: round_cents(current_price),
                max: round_cents(current_price * sigma.exp()),
            }
        })
        .collect();

    PriceTargetBand {
        current_price,
        volatility: vol,
        targets,
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
