pub mod modexp;
pub mod mont;
pub mod uint;

pub use modexp::modexp;
pub use mont::{inv_mod_u64, ModArith};
pub use uint::BigUint;

/// The 256-bit unsigned integer used by every curve in this crate.
pub type U256 = BigUint<4>;
