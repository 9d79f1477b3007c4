//! Orchestration of the calculation pipeline and the administrative
//! deduction updates.
//!
//! A single calculation runs validation, the personal allowance, the
//! itemized allowances, the bracket table and the WHT settlement, in that
//! order. Validation failures never reach the computation stages.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::calculations::{BracketTable, DeductionPipeline, settle};
use crate::db::DeductionRepository;
use crate::error::TaxError;
use crate::models::{
    DeductionConfig, DeductionId, DeductionLimits, TaxLevel, TaxRequest, TaxResponse, TaxUpload,
    TaxUploadResponse, UpdateDeductionResponse,
};
use crate::validation::{validate_allowance_amount, validate_tax_request};

pub struct TaxService {
    repo: Arc<dyn DeductionRepository>,
    limits: DeductionLimits,
    table: BracketTable,
}

impl TaxService {
    /// A service over `repo` using the standard bracket table.
    pub fn new(
        repo: Arc<dyn DeductionRepository>,
        limits: DeductionLimits,
    ) -> Self {
        Self {
            repo,
            limits,
            table: BracketTable::standard(),
        }
    }

    pub fn with_table(
        mut self,
        table: BracketTable,
    ) -> Self {
        self.table = table;
        self
    }

    pub fn limits(&self) -> &DeductionLimits {
        &self.limits
    }

    pub fn table(&self) -> &BracketTable {
        &self.table
    }

    /// Validates `request` and computes its tax.
    pub async fn calculate(
        &self,
        request: &TaxRequest,
    ) -> Result<TaxResponse, TaxError> {
        if let Err(err) = validate_tax_request(request) {
            warn!(error = %err, "tax request rejected");
            return Err(err.into());
        }

        let response = self.compute(request).await?;
        info!(
            total_income = %request.total_income,
            tax = %response.tax,
            tax_refund = %response.tax_refund,
            "tax calculated"
        );
        Ok(response)
    }

    /// Runs the computation stages on a request that is already known to be
    /// valid.
    pub(crate) async fn compute(
        &self,
        request: &TaxRequest,
    ) -> Result<TaxResponse, TaxError> {
        let pipeline = DeductionPipeline::new(self.repo.as_ref(), &self.limits);

        let taxable = pipeline.deduct_personal_allowance(request.total_income).await?;
        let taxable = pipeline.deduct_allowances(taxable, &request.allowances).await?;

        let breakdown = self.table.apply(taxable);
        let settlement = settle(breakdown.total_tax, request.wht);
        debug!(
            %taxable,
            total_tax = %breakdown.total_tax,
            wht = %request.wht,
            "tax settled"
        );

        Ok(TaxResponse {
            tax: settlement.tax,
            tax_refund: settlement.tax_refund,
            tax_level: breakdown.brackets.iter().map(TaxLevel::from).collect(),
        })
    }

    /// Calculates every request in order. The first failure aborts the
    /// batch; validation messages are prefixed with the 1-based row number.
    pub async fn calculate_batch(
        &self,
        requests: &[TaxRequest],
    ) -> Result<TaxUploadResponse, TaxError> {
        let mut taxes = Vec::with_capacity(requests.len());

        for (index, request) in requests.iter().enumerate() {
            let row = index + 1;
            if let Err(err) = validate_tax_request(request) {
                warn!(row, error = %err, "batch row rejected");
                return Err(err.prefixed(&format!("row {row}")).into());
            }
            let response = self.compute(request).await?;
            taxes.push(TaxUpload::new(request.total_income, &response));
        }

        info!(rows = taxes.len(), "tax batch calculated");
        Ok(TaxUploadResponse { taxes })
    }

    /// Validates and stores a new amount for `id`, then reads it back.
    ///
    /// The write and the read-back are two separate store calls; a
    /// concurrent writer may land between them.
    pub async fn update_deduction(
        &self,
        id: DeductionId,
        amount: Decimal,
    ) -> Result<UpdateDeductionResponse, TaxError> {
        if let Err(err) = validate_allowance_amount(id, amount, &self.limits) {
            warn!(deduction = %id, %amount, error = %err, "deduction update rejected");
            return Err(err.into());
        }

        let affected = self.repo.update_by_id(id, amount).await.map_err(|err| {
            error!(deduction = %id, error = %err, "failed to update deduction config");
            TaxError::from_repository(id, err)
        })?;
        if affected == 0 {
            warn!(deduction = %id, "deduction update affected no rows");
            return Err(TaxError::UpdateFailed(id));
        }

        let current = self.repo.find_by_id(id).await.map_err(|err| {
            error!(deduction = %id, error = %err, "failed to read back deduction config");
            TaxError::from_repository(id, err)
        })?;

        info!(deduction = %id, amount = %current.amount, "deduction updated");
        Ok(UpdateDeductionResponse {
            amount: current.amount,
        })
    }

    pub async fn update_personal_allowance(
        &self,
        amount: Decimal,
    ) -> Result<UpdateDeductionResponse, TaxError> {
        self.update_deduction(DeductionId::Personal, amount).await
    }

    pub async fn update_k_receipt_allowance(
        &self,
        amount: Decimal,
    ) -> Result<UpdateDeductionResponse, TaxError> {
        self.update_deduction(DeductionId::KReceipt, amount).await
    }

    /// Current deduction configuration, in [`DeductionId`] order.
    pub async fn list_deductions(&self) -> Result<Vec<DeductionConfig>, TaxError> {
        self.repo.list_all().await.map_err(|err| {
            error!(error = %err, "failed to list deduction configs");
            TaxError::Unexpected(err.to_string())
        })
    }
}
