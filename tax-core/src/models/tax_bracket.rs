use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One progressive bracket. `upper_bound` is `None` for the open-ended
/// top bracket. `tax` is an output slot filled by the bracket calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub level: String,
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub tax: Decimal,
}

impl TaxBracket {
    pub fn new(
        level: impl Into<String>,
        lower_bound: Decimal,
        upper_bound: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            level: level.into(),
            lower_bound,
            upper_bound,
            rate,
            tax: Decimal::ZERO,
        }
    }

    /// Whether `income` falls at or below this bracket's upper edge.
    pub fn contains_top_of(
        &self,
        income: Decimal,
    ) -> bool {
        self.upper_bound.is_none_or(|upper| income <= upper)
    }
}
