use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Allowance, AllowanceType};

/// Input of a single tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRequest {
    #[serde(rename = "totalIncome")]
    pub total_income: Decimal,
    pub wht: Decimal,
    pub allowances: Vec<Allowance>,
}

impl TaxRequest {
    pub fn new(
        total_income: Decimal,
        wht: Decimal,
    ) -> Self {
        Self {
            total_income,
            wht,
            allowances: Vec::new(),
        }
    }

    pub fn with_allowance(
        mut self,
        kind: AllowanceType,
        amount: Decimal,
    ) -> Self {
        self.allowances.push(Allowance::new(kind, amount));
        self
    }
}
