// ============================================================
// Layer 3 — OptionQuote Domain Type
// ============================================================
// One market observation of a listed option. These seven
// fields are the network's input features, in this order:
//
//   Strike, Time_to_Maturity, Log_Return, Volatility,
//   Last Price, Bid, Ask
//
// The serde renames match the column headers of the input CSV,
// including the space in "Last Price".

use serde::{Deserialize, Serialize};

/// Number of input features per quote (D).
pub const FEATURE_DIM: usize = 7;

/// Column headers in feature order.
pub const FEATURE_COLUMNS: [&str; FEATURE_DIM] = [
    "Strike",
    "Time_to_Maturity",
    "Log_Return",
    "Volatility",
    "Last Price",
    "Bid",
    "Ask",
];

/// A single option quote as read from the tabular input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    #[serde(rename = "Strike")]
    pub strike: f64,

    #[serde(rename = "Time_to_Maturity")]
    pub time_to_maturity: f64,

    #[serde(rename = "Log_Return")]
    pub log_return: f64,

    #[serde(rename = "Volatility")]
    pub volatility: f64,

    #[serde(rename = "Last Price")]
    pub last_price: f64,

    #[serde(rename = "Bid")]
    pub bid: f64,

    #[serde(rename = "Ask")]
    pub ask: f64,
}

impl OptionQuote {
    /// Feature vector in `FEATURE_COLUMNS` order
    pub fn features(&self) -> [f64; FEATURE_DIM] {
        [
            self.strike,
            self.time_to_maturity,
            self.log_return,
            self.volatility,
            self.last_price,
            self.bid,
            self.ask,
        ]
    }

    /// Name of the first non-finite field, if any
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.features()
            .iter()
            .zip(FEATURE_COLUMNS)
            .find(|(v, _)| !v.is_finite())
            .map(|(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote() -> OptionQuote {
        OptionQuote {
            strike:           100.0,
            time_to_maturity: 0.25,
            log_return:       0.01,
            volatility:       0.2,
            last_price:       5.1,
            bid:              5.0,
            ask:              5.2,
        }
    }

    #[test]
    fn test_features_follow_column_order() {
        let f = quote().features();
        assert_eq!(f[0], 100.0);
        assert_eq!(f[4], 5.1);
        assert_eq!(f[6], 5.2);
    }

    #[test]
    fn test_first_non_finite_names_column() {
        let mut q = quote();
        assert_eq!(q.first_non_finite(), None);
        q.bid = f64::NAN;
        assert_eq!(q.first_non_finite(), Some("Bid"));
    }
}
