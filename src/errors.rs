use serde::{Deserialize, Serialize};
use thiserror;

/// The single failure signal of the precompile core.
///
/// Every rejection (malformed input, point not on curve, failed recovery or
/// verification) surfaces as one of these variants; the caller translates any
/// of them into an empty output with a failure status and charges gas
/// regardless.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum PrecompileError {
    #[error("Error while parsing the calldata")]
    ParsingInputError,
    #[error("The point is not on the curve")]
    PointNotOnCurve,
    #[error("The G2 point is not in the order-n subgroup")]
    PointNotInSubgroup,
    #[error("The signature values are out of range or no key could be recovered")]
    InvalidSignature,
    #[error("Invalid precompile address. Tried to execute a precompile that does not exist.")]
    InvalidPrecompileAddress,
}
