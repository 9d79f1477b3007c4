//! Subcommands. Every command prints its result to stdout as pretty JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use tax_core::calculations::common::round_half_up;
use tax_core::{AllowanceType, BracketTable, DeductionId, TaxRequest, TaxService};
use tax_data::CsvBatchProcessor;

use crate::app;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

// ─── calculate ───────────────────────────────────────────────────────────────

/// Calculate tax for one person.
#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// Total yearly income
    #[arg(long, required_unless_present = "request", conflicts_with = "request")]
    income: Option<Decimal>,

    /// Tax already withheld
    #[arg(long, default_value = "0")]
    wht: Decimal,

    /// Donation amount; repeat for several donations
    #[arg(long)]
    donation: Vec<Decimal>,

    /// k-receipt amount; repeat for several receipts
    #[arg(long = "k-receipt")]
    k_receipt: Vec<Decimal>,

    /// JSON file holding a full request body instead of the flags above
    #[arg(long, conflicts_with_all = ["wht", "donation", "k_receipt"])]
    request: Option<PathBuf>,
}

impl CalculateCommand {
    pub fn to_request(&self) -> Result<TaxRequest> {
        if let Some(path) = &self.request {
            return app::read_request(path);
        }
        let income = self
            .income
            .context("--income is required unless --request is given")?;

        let donations = self
            .donation
            .iter()
            .map(|amount| (AllowanceType::Donation, *amount));
        let receipts = self
            .k_receipt
            .iter()
            .map(|amount| (AllowanceType::KReceipt, *amount));
        Ok(donations
            .chain(receipts)
            .fold(TaxRequest::new(income, self.wht), |request, (kind, amount)| {
                request.with_allowance(kind, amount)
            }))
    }

    pub async fn exec(
        &self,
        service: &TaxService,
    ) -> Result<()> {
        let request = self.to_request()?;
        let response = service.calculate(&request).await?;
        print_json(&response)
    }
}

// ─── upload ──────────────────────────────────────────────────────────────────

/// Calculate tax for every row of a CSV file (`totalIncome,wht,donation`).
#[derive(Args, Debug)]
pub struct UploadCommand {
    /// CSV file with a header row
    file: PathBuf,
}

impl UploadCommand {
    pub async fn exec(
        &self,
        service: &TaxService,
    ) -> Result<()> {
        let file = File::open(&self.file)
            .with_context(|| format!("Failed to open upload '{}'", self.file.display()))?;
        let result = CsvBatchProcessor::process(service, BufReader::new(file)).await?;
        print_json(&result)
    }
}

// ─── deduction ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeductionArg {
    Personal,
    KReceipt,
}

impl From<DeductionArg> for DeductionId {
    fn from(arg: DeductionArg) -> Self {
        match arg {
            DeductionArg::Personal => DeductionId::Personal,
            DeductionArg::KReceipt => DeductionId::KReceipt,
        }
    }
}

/// Show or change the stored deduction amounts.
#[derive(Subcommand, Debug)]
pub enum DeductionCommand {
    /// Set a stored amount and print the value read back
    Set {
        #[arg(value_enum)]
        deduction: DeductionArg,
        amount: Decimal,
    },
    /// Print every stored deduction
    Show,
}

impl DeductionCommand {
    pub async fn exec(
        &self,
        service: &TaxService,
    ) -> Result<()> {
        match self {
            Self::Set { deduction, amount } => {
                let response = service
                    .update_deduction(DeductionId::from(*deduction), *amount)
                    .await?;
                print_json(&response)
            }
            Self::Show => print_json(&service.list_deductions().await?),
        }
    }
}

// ─── brackets ────────────────────────────────────────────────────────────────

/// Print the bracket table, optionally applied to a taxable income.
#[derive(Args, Debug)]
pub struct BracketsCommand {
    /// Taxable income (after allowances) to break down
    #[arg(long)]
    income: Option<Decimal>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BracketRow {
    pub level: String,
    #[serde(rename = "lowerBound", with = "rust_decimal::serde::float")]
    pub lower_bound: Decimal,
    #[serde(rename = "upperBound", with = "rust_decimal::serde::float_option")]
    pub upper_bound: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub tax: Option<Decimal>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BracketsReport {
    #[serde(
        rename = "taxableIncome",
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub taxable_income: Option<Decimal>,
    #[serde(
        rename = "totalTax",
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub total_tax: Option<Decimal>,
    pub brackets: Vec<BracketRow>,
}

impl BracketsCommand {
    /// Builds the report; taxes are rounded to two places for display.
    pub fn report(
        &self,
        table: &BracketTable,
    ) -> BracketsReport {
        let breakdown = self.income.map(|income| table.apply(income));
        let brackets = table
            .brackets()
            .iter()
            .enumerate()
            .map(|(index, bracket)| BracketRow {
                level: bracket.level.clone(),
                lower_bound: bracket.lower_bound,
                upper_bound: bracket.upper_bound,
                rate: bracket.rate,
                tax: breakdown
                    .as_ref()
                    .map(|b| round_half_up(b.brackets[index].tax)),
            })
            .collect();

        BracketsReport {
            taxable_income: self.income,
            total_tax: breakdown.as_ref().map(|b| round_half_up(b.total_tax)),
            brackets,
        }
    }

    pub fn exec(
        &self,
        table: &BracketTable,
    ) -> Result<()> {
        print_json(&self.report(table))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: TestCommand,
    }

    #[derive(Subcommand, Debug)]
    enum TestCommand {
        Calculate(CalculateCommand),
        #[command(subcommand)]
        Deduction(DeductionCommand),
        Brackets(BracketsCommand),
    }

    fn parse(args: &[&str]) -> TestCommand {
        TestCli::try_parse_from(std::iter::once("tax-cli").chain(args.iter().copied()))
            .expect("arguments should parse")
            .command
    }

    #[test]
    fn calculate_flags_build_request() {
        let TestCommand::Calculate(cmd) = parse(&[
            "calculate",
            "--income",
            "500000",
            "--wht",
            "25000",
            "--donation",
            "1000",
            "--donation",
            "2000",
            "--k-receipt",
            "300",
        ]) else {
            panic!("expected calculate");
        };

        assert_eq!(
            cmd.to_request().unwrap(),
            TaxRequest::new(dec!(500000), dec!(25000))
                .with_allowance(AllowanceType::Donation, dec!(1000))
                .with_allowance(AllowanceType::Donation, dec!(2000))
                .with_allowance(AllowanceType::KReceipt, dec!(300))
        );
    }

    #[test]
    fn calculate_requires_income_or_request() {
        let result = TestCli::try_parse_from(["tax-cli", "calculate"]);

        assert!(result.is_err());
    }

    #[test]
    fn calculate_rejects_income_with_request() {
        let result = TestCli::try_parse_from([
            "tax-cli",
            "calculate",
            "--income",
            "1",
            "--request",
            "body.json",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn deduction_set_parses_kebab_case_id() {
        let TestCommand::Deduction(DeductionCommand::Set { deduction, amount }) =
            parse(&["deduction", "set", "k-receipt", "70000"])
        else {
            panic!("expected deduction set");
        };

        assert_eq!(DeductionId::from(deduction), DeductionId::KReceipt);
        assert_eq!(amount, dec!(70000));
    }

    #[test]
    fn brackets_report_without_income_has_no_taxes() {
        let cmd = BracketsCommand { income: None };

        let report = cmd.report(&BracketTable::standard());

        assert_eq!(report.total_tax, None);
        assert_eq!(report.brackets.len(), 5);
        assert!(report.brackets.iter().all(|row| row.tax.is_none()));
        assert_eq!(report.brackets[4].upper_bound, None);
    }

    #[test]
    fn brackets_report_rounds_for_display() {
        let cmd = BracketsCommand {
            income: Some(dec!(500001)),
        };

        let report = cmd.report(&BracketTable::standard());

        assert_eq!(report.total_tax, Some(dec!(35000.15)));
        assert_eq!(report.brackets[2].tax, Some(dec!(0.15)));
        assert_eq!(report.brackets[3].tax, Some(dec!(0)));
    }

    #[test]
    fn brackets_report_serializes_camel_case() {
        let cmd = BracketsCommand {
            income: Some(dec!(440000)),
        };

        let json = serde_json::to_value(cmd.report(&BracketTable::standard())).unwrap();

        assert_eq!(json["totalTax"], serde_json::json!(29000.0));
        assert_eq!(json["brackets"][1]["lowerBound"], serde_json::json!(150001.0));
        assert_eq!(json["brackets"][4]["upperBound"], serde_json::Value::Null);
    }
}
