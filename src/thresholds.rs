//! Severity thresholds checked against a finished scan.

use std::fmt;

use serde::Serialize;

use crate::models::Scan;

/// Maximum accepted finding counts and risk score.
///
/// A limit is breached when the scan value is strictly greater than it.
/// Unset limits are not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityThresholds {
    pub critical: Option<u32>,
    pub high: Option<u32>,
    pub medium: Option<u32>,
    pub low: Option<u32>,
    pub risk: Option<u32>,
}

/// A single exceeded limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThresholdBreach {
    pub metric: &'static str,
    pub actual: u32,
    pub limit: u32,
}

impl fmt::Display for ThresholdBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is {} (threshold {})",
            self.metric, self.actual, self.limit
        )
    }
}

impl SeverityThresholds {
    /// True when no limit is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Compare a scan with every configured limit.
    pub fn check(&self, scan: &Scan) -> Vec<ThresholdBreach> {
        let summary = &scan.summary;
        [
            ("critical", summary.critical, self.critical),
            ("high", summary.high, self.high),
            ("medium", summary.medium, self.medium),
            ("low", summary.low, self.low),
            ("risk score", scan.score, self.risk),
        ]
        .into_iter()
        .filter_map(|(metric, actual, limit)| {
            let limit = limit?;
            (actual > limit).then_some(ThresholdBreach {
                metric,
                actual,
                limit,
            })
        })
        .collect()
    }
}
