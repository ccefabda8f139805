pub mod analysis;
pub mod arith;
pub mod bn254;
pub mod ecc;
pub mod errors;
pub mod precompiles;
pub mod secp256k1;
pub mod secp256r1;

pub use analysis::CodeAnalysis;
pub use errors::PrecompileError;
