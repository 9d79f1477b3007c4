mod allowance;
mod deduction_config;
mod deduction_limits;
mod tax_bracket;
mod tax_request;
mod tax_response;

pub use allowance::{Allowance, AllowanceType};
pub use deduction_config::{DeductionConfig, DeductionId, UpdateDeductionRequest, UpdateDeductionResponse};
pub use deduction_limits::{DeductionLimits, DeductionLimitsError};
pub use tax_bracket::TaxBracket;
pub use tax_request::TaxRequest;
pub use tax_response::{TaxLevel, TaxResponse, TaxUpload, TaxUploadResponse};
