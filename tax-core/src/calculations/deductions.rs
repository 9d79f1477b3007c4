//! Reduces gross income to taxable income.
//!
//! The personal allowance and the k-receipt cap are read from the
//! [`DeductionRepository`] on every call. The donation cap comes from the
//! injected [`DeductionLimits`].

use rust_decimal::Decimal;
use tracing::{debug, error};

use super::common::capped;
use crate::db::DeductionRepository;
use crate::error::TaxError;
use crate::models::{Allowance, AllowanceType, DeductionId, DeductionLimits};

pub struct DeductionPipeline<'a> {
    repo: &'a dyn DeductionRepository,
    limits: &'a DeductionLimits,
}

impl<'a> DeductionPipeline<'a> {
    pub fn new(
        repo: &'a dyn DeductionRepository,
        limits: &'a DeductionLimits,
    ) -> Self {
        Self { repo, limits }
    }

    /// Subtracts the stored personal allowance from `income`.
    pub async fn deduct_personal_allowance(
        &self,
        income: Decimal,
    ) -> Result<Decimal, TaxError> {
        let personal = self.stored_amount(DeductionId::Personal).await?;
        let taxable = income - personal;
        debug!(%income, %personal, %taxable, "personal allowance deducted");
        Ok(taxable)
    }

    /// Subtracts each itemized allowance, capped per kind.
    ///
    /// Donations are capped at the fixed donation cap, k-receipts at the
    /// stored k-receipt amount. Negative claims deduct nothing and unknown
    /// kinds are skipped. The result is not clamped and may be negative.
    pub async fn deduct_allowances(
        &self,
        income: Decimal,
        allowances: &[Allowance],
    ) -> Result<Decimal, TaxError> {
        let mut taxable = income;
        let mut k_receipt_cap = None;

        for allowance in allowances {
            let deducted = match allowance.kind() {
                Some(AllowanceType::Donation) => capped(allowance.amount, self.limits.donation_cap),
                Some(AllowanceType::KReceipt) => {
                    let cap = match k_receipt_cap {
                        Some(cap) => cap,
                        None => {
                            let cap = self.stored_amount(DeductionId::KReceipt).await?;
                            k_receipt_cap = Some(cap);
                            cap
                        }
                    };
                    capped(allowance.amount, cap)
                }
                None => continue,
            };
            taxable -= deducted;
            debug!(
                allowance_type = %allowance.allowance_type,
                claimed = %allowance.amount,
                %deducted,
                "allowance deducted"
            );
        }

        debug!(%income, %taxable, "itemized allowances deducted");
        Ok(taxable)
    }

    async fn stored_amount(
        &self,
        id: DeductionId,
    ) -> Result<Decimal, TaxError> {
        let config = self.repo.find_by_id(id).await.map_err(|err| {
            error!(deduction = %id, error = %err, "failed to read deduction config");
            TaxError::from_repository(id, err)
        })?;
        Ok(config.amount)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::db::{InMemoryDeductionRepository, RepositoryError};
    use crate::models::DeductionConfig;

    struct BrokenRepository;

    #[async_trait]
    impl DeductionRepository for BrokenRepository {
        async fn find_by_id(
            &self,
            _id: DeductionId,
        ) -> Result<DeductionConfig, RepositoryError> {
            Err(RepositoryError::Connection("refused".to_string()))
        }

        async fn update_by_id(
            &self,
            _id: DeductionId,
            _amount: Decimal,
        ) -> Result<u64, RepositoryError> {
            Err(RepositoryError::Connection("refused".to_string()))
        }

        async fn list_all(&self) -> Result<Vec<DeductionConfig>, RepositoryError> {
            Err(RepositoryError::Connection("refused".to_string()))
        }
    }

    fn allowance(
        kind: &str,
        amount: Decimal,
    ) -> Allowance {
        Allowance {
            allowance_type: kind.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn personal_allowance_uses_stored_amount() {
        let repo = InMemoryDeductionRepository::with_defaults();
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&repo, &limits);

        let taxable = pipeline.deduct_personal_allowance(dec!(500000)).await;

        assert_eq!(taxable, Ok(dec!(440000)));
    }

    #[tokio::test]
    async fn personal_allowance_follows_updates() {
        let repo = InMemoryDeductionRepository::with_defaults();
        repo.update_by_id(DeductionId::Personal, dec!(100000)).await.unwrap();
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&repo, &limits);

        let taxable = pipeline.deduct_personal_allowance(dec!(500000)).await;

        assert_eq!(taxable, Ok(dec!(400000)));
    }

    #[tokio::test]
    async fn personal_allowance_may_go_negative() {
        let repo = InMemoryDeductionRepository::with_defaults();
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&repo, &limits);

        let taxable = pipeline.deduct_personal_allowance(dec!(1000)).await;

        assert_eq!(taxable, Ok(dec!(-59000)));
    }

    #[tokio::test]
    async fn missing_personal_row_is_config_not_found() {
        let repo = InMemoryDeductionRepository::new();
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&repo, &limits);

        let result = pipeline.deduct_personal_allowance(dec!(500000)).await;

        assert_eq!(result, Err(TaxError::ConfigNotFound(DeductionId::Personal)));
    }

    #[tokio::test]
    async fn store_failure_is_unexpected() {
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&BrokenRepository, &limits);

        let result = pipeline.deduct_personal_allowance(dec!(500000)).await;

        assert_eq!(
            result,
            Err(TaxError::Unexpected("Connection error: refused".to_string()))
        );
    }

    #[tokio::test]
    async fn donation_is_capped_at_fixed_cap() {
        let repo = InMemoryDeductionRepository::with_defaults();
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&repo, &limits);

        let taxable = pipeline
            .deduct_allowances(dec!(440000), &[allowance("donation", dec!(200000))])
            .await;

        assert_eq!(taxable, Ok(dec!(340000)));
    }

    #[tokio::test]
    async fn donation_below_cap_is_deducted_in_full() {
        let repo = InMemoryDeductionRepository::with_defaults();
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&repo, &limits);

        let taxable = pipeline
            .deduct_allowances(dec!(440000), &[allowance("donation", dec!(12345.67))])
            .await;

        assert_eq!(taxable, Ok(dec!(427654.33)));
    }

    #[tokio::test]
    async fn k_receipt_is_capped_at_stored_amount() {
        let repo = InMemoryDeductionRepository::with_defaults();
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&repo, &limits);

        let taxable = pipeline
            .deduct_allowances(dec!(440000), &[allowance("k-receipt", dec!(200000))])
            .await;

        assert_eq!(taxable, Ok(dec!(390000)));
    }

    #[tokio::test]
    async fn each_allowance_is_capped_separately() {
        let repo = InMemoryDeductionRepository::with_defaults();
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&repo, &limits);

        let taxable = pipeline
            .deduct_allowances(
                dec!(440000),
                &[
                    allowance("donation", dec!(150000)),
                    allowance("donation", dec!(150000)),
                    allowance("k-receipt", dec!(60000)),
                ],
            )
            .await;

        assert_eq!(taxable, Ok(dec!(190000)));
    }

    #[tokio::test]
    async fn negative_claim_never_raises_taxable_income() {
        let repo = InMemoryDeductionRepository::with_defaults();
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&repo, &limits);

        let taxable = pipeline
            .deduct_allowances(
                dec!(440000),
                &[
                    allowance("donation", dec!(-1000000)),
                    allowance("k-receipt", -Decimal::MAX),
                ],
            )
            .await;

        assert_eq!(taxable, Ok(dec!(440000)));
    }

    #[tokio::test]
    async fn unknown_allowance_is_ignored() {
        let repo = InMemoryDeductionRepository::with_defaults();
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&repo, &limits);

        let taxable = pipeline
            .deduct_allowances(dec!(440000), &[allowance("insurance", dec!(50000))])
            .await;

        assert_eq!(taxable, Ok(dec!(440000)));
    }

    #[tokio::test]
    async fn donations_only_never_touch_the_store() {
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&BrokenRepository, &limits);

        let taxable = pipeline
            .deduct_allowances(dec!(440000), &[allowance("donation", dec!(1000))])
            .await;

        assert_eq!(taxable, Ok(dec!(439000)));
    }

    #[tokio::test]
    async fn missing_k_receipt_row_is_config_not_found() {
        let repo = InMemoryDeductionRepository::from_amounts([(DeductionId::Personal, dec!(60000))]);
        let limits = DeductionLimits::default();
        let pipeline = DeductionPipeline::new(&repo, &limits);

        let result = pipeline
            .deduct_allowances(dec!(440000), &[allowance("k-receipt", dec!(1))])
            .await;

        assert_eq!(result, Err(TaxError::ConfigNotFound(DeductionId::KReceipt)));
    }
}
