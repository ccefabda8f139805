//! Byte-in/byte-out entry points of the arithmetic precompiles at their
//! reserved addresses.
//!
//! Every integer on the wire is 256-bit big-endian; short calldata is
//! zero-padded on the right where the framing allows it. Any rejection is
//! reported as an error, which the interpreter translates into an empty
//! output with a failure status (gas is charged regardless).

use bytes::Bytes;
use ethereum_types::{H160, U256 as EthU256};

use crate::arith::modexp::MODEXP_MAX_INPUT_SIZE;
use crate::arith::{self, U256};
use crate::bn254::fp2::Fp2;
use crate::bn254::pairing::{pairing_check, G2Point};
use crate::bn254::{self, Bn254, Fp};
use crate::ecc::AffinePoint;
use crate::errors::PrecompileError;
use crate::secp256k1;
use crate::secp256r1;

pub type Address = H160;

pub const ECRECOVER_ADDRESS: H160 = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x01,
]);
pub const MODEXP_ADDRESS: H160 = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x05,
]);
pub const ECADD_ADDRESS: H160 = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x06,
]);
pub const ECMUL_ADDRESS: H160 = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x07,
]);
pub const ECPAIRING_ADDRESS: H160 = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x08,
]);
pub const P256VERIFY_ADDRESS: H160 = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00,
]);

pub const PRECOMPILES: [H160; 6] = [
    ECRECOVER_ADDRESS,
    MODEXP_ADDRESS,
    ECADD_ADDRESS,
    ECMUL_ADDRESS,
    ECPAIRING_ADDRESS,
    P256VERIFY_ADDRESS,
];

pub fn is_precompile(callee_address: &Address) -> bool {
    PRECOMPILES.contains(callee_address)
}

pub fn execute_precompile(address: Address, calldata: &Bytes) -> Result<Bytes, PrecompileError> {
    match address {
        address if address == ECRECOVER_ADDRESS => ecrecover(calldata),
        address if address == MODEXP_ADDRESS => modexp(calldata),
        address if address == ECADD_ADDRESS => ecadd(calldata),
        address if address == ECMUL_ADDRESS => ecmul(calldata),
        address if address == ECPAIRING_ADDRESS => ecpairing(calldata),
        address if address == P256VERIFY_ADDRESS => p256_verify(calldata),
        _ => Err(PrecompileError::InvalidPrecompileAddress),
    }
}

/// When the calldata is shorter than `target_len` the rest is filled with
/// zeros; longer calldata is passed through unchanged.
fn fill_with_zeros(calldata: &Bytes, target_len: usize) -> Bytes {
    if calldata.len() >= target_len {
        return calldata.clone();
    }
    let mut padded = calldata.to_vec();
    padded.resize(target_len, 0);
    padded.into()
}

fn word_at(calldata: &Bytes, offset: usize) -> Result<[u8; 32], PrecompileError> {
    calldata
        .get(offset..offset + 32)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(PrecompileError::ParsingInputError)
}

/// ECDSA public-key recovery on secp256k1 (address 0x01).
///
/// Input: `hash[32] ‖ v[32] ‖ r[32] ‖ s[32]` with `v` either 27 or 28.
/// Output: the recovered 20-byte address, left-padded to 32 bytes.
pub fn ecrecover(calldata: &Bytes) -> Result<Bytes, PrecompileError> {
    let calldata = fill_with_zeros(calldata, 128);

    let hash = word_at(&calldata, 0)?;
    let v = EthU256::from_big_endian(&word_at(&calldata, 32)?);

    // The recovery identifier encodes the parity of the nonce-point y.
    if v != EthU256::from(27) && v != EthU256::from(28) {
        return Err(PrecompileError::InvalidSignature);
    }
    let parity = v == EthU256::from(28);

    let r = word_at(&calldata, 64)?;
    let s = word_at(&calldata, 96)?;

    let address = secp256k1::ecrecover(&hash, &r, &s, parity)
        .ok_or(PrecompileError::InvalidSignature)?;

    let mut output = vec![0u8; 12];
    output.extend_from_slice(address.as_bytes());
    Ok(Bytes::from(output))
}

/// Arbitrary-precision modular exponentiation (address 0x05, EIP-198).
///
/// Input: `len_b[32] ‖ len_e[32] ‖ len_m[32] ‖ base ‖ exp ‖ mod`; operand
/// lengths are capped at 1024 bytes. Output: `len_m` big-endian bytes.
pub fn modexp(calldata: &Bytes) -> Result<Bytes, PrecompileError> {
    let header = fill_with_zeros(calldata, 96);

    let b_size = EthU256::from_big_endian(&word_at(&header, 0)?);
    let e_size = EthU256::from_big_endian(&word_at(&header, 32)?);
    let m_size = EthU256::from_big_endian(&word_at(&header, 64)?);

    if b_size.is_zero() && m_size.is_zero() {
        return Ok(Bytes::new());
    }

    let b_size = usize::try_from(b_size).map_err(|_| PrecompileError::ParsingInputError)?;
    let e_size = usize::try_from(e_size).map_err(|_| PrecompileError::ParsingInputError)?;
    let m_size = usize::try_from(m_size).map_err(|_| PrecompileError::ParsingInputError)?;

    if b_size > MODEXP_MAX_INPUT_SIZE
        || e_size > MODEXP_MAX_INPUT_SIZE
        || m_size > MODEXP_MAX_INPUT_SIZE
    {
        return Err(PrecompileError::ParsingInputError);
    }

    let base = get_slice_or_default(&header, 96, b_size);
    let exponent = get_slice_or_default(&header, 96 + b_size, e_size);
    let modulus = get_slice_or_default(&header, 96 + b_size + e_size, m_size);

    if m_size == 0 {
        return Ok(Bytes::new());
    }
    // Everything modulo zero is defined to be zero.
    if modulus.iter().all(|&b| b == 0) {
        return Ok(Bytes::from(vec![0u8; m_size]));
    }

    let mut output = vec![0u8; m_size];
    arith::modexp(&base, &exponent, &modulus, &mut output);
    Ok(Bytes::from(output))
}

/// The operand bytes at `[offset, offset + size)`, zero-extended on the
/// right when the calldata ends early.
fn get_slice_or_default(calldata: &Bytes, offset: usize, size: usize) -> Vec<u8> {
    let mut out = vec![0u8; size];
    if offset < calldata.len() {
        let available = (calldata.len() - offset).min(size);
        out[..available].copy_from_slice(&calldata[offset..offset + available]);
    }
    out
}

fn parse_g1_point(calldata: &Bytes, offset: usize) -> Result<AffinePoint<Bn254>, PrecompileError> {
    let mut bytes = [0u8; 64];
    bytes[..32].copy_from_slice(&word_at(calldata, offset)?);
    bytes[32..].copy_from_slice(&word_at(calldata, offset + 32)?);
    let point = AffinePoint::from_bytes(&bytes).ok_or(PrecompileError::ParsingInputError)?;
    if !bn254::validate(&point) {
        return Err(PrecompileError::PointNotOnCurve);
    }
    Ok(point)
}

/// BN254 point addition (address 0x06, EIP-196).
pub fn ecadd(calldata: &Bytes) -> Result<Bytes, PrecompileError> {
    let calldata = fill_with_zeros(calldata, 128);

    let first = parse_g1_point(&calldata, 0)?;
    let second = parse_g1_point(&calldata, 64)?;

    let sum = bn254::add(&first, &second);
    Ok(Bytes::copy_from_slice(&sum.to_bytes()))
}

/// BN254 scalar multiplication (address 0x07, EIP-196).
pub fn ecmul(calldata: &Bytes) -> Result<Bytes, PrecompileError> {
    let calldata = fill_with_zeros(calldata, 96);

    let point = parse_g1_point(&calldata, 0)?;
    let scalar = U256::from_be_bytes(&word_at(&calldata, 64)?);

    let product = bn254::mul(&point, &scalar);
    Ok(Bytes::copy_from_slice(&product.to_bytes()))
}

/// BN254 pairing check (address 0x08, EIP-197).
///
/// The input is a concatenation of 192-byte pairs `g1(64) ‖ g2(128)`. The G2
/// coordinates come imaginary part first: `a + b·i` is encoded `b ‖ a`.
/// Output: a 32-byte word holding 1 when the pairing product is the
/// identity, 0 otherwise. Empty input succeeds with 1.
pub fn ecpairing(calldata: &Bytes) -> Result<Bytes, PrecompileError> {
    if calldata.len() % 192 != 0 {
        return Err(PrecompileError::ParsingInputError);
    }

    let mut pairs = Vec::with_capacity(calldata.len() / 192);
    for index in 0..calldata.len() / 192 {
        let offset = index * 192;

        let mut g1_bytes = [0u8; 64];
        g1_bytes[..32].copy_from_slice(&word_at(calldata, offset)?);
        g1_bytes[32..].copy_from_slice(&word_at(calldata, offset + 32)?);
        let g1 =
            AffinePoint::from_bytes(&g1_bytes).ok_or(PrecompileError::ParsingInputError)?;

        let x_imag = fp_at(calldata, offset + 64)?;
        let x_real = fp_at(calldata, offset + 96)?;
        let y_imag = fp_at(calldata, offset + 128)?;
        let y_real = fp_at(calldata, offset + 160)?;
        let g2 = G2Point::new(Fp2::new(x_real, x_imag), Fp2::new(y_real, y_imag));

        pairs.push((g1, g2));
    }

    let success = pairing_check(&pairs)?;
    let mut result = [0u8; 32];
    result[31] = u8::from(success);
    Ok(Bytes::copy_from_slice(&result))
}

fn fp_at(calldata: &Bytes, offset: usize) -> Result<Fp, PrecompileError> {
    Fp::from_bytes(&word_at(calldata, offset)?).ok_or(PrecompileError::ParsingInputError)
}

/// ECDSA verification on secp256r1 (address 0x100, EIP-7951).
///
/// Input: exactly 160 bytes `hash[32] ‖ r[32] ‖ s[32] ‖ qx[32] ‖ qy[32]`.
/// Output: a 32-byte word holding 1 on success.
pub fn p256_verify(calldata: &Bytes) -> Result<Bytes, PrecompileError> {
    if calldata.len() != 160 {
        return Err(PrecompileError::ParsingInputError);
    }

    let hash = word_at(calldata, 0)?;
    let r = U256::from_be_bytes(&word_at(calldata, 32)?);
    let s = U256::from_be_bytes(&word_at(calldata, 64)?);
    let qx = U256::from_be_bytes(&word_at(calldata, 96)?);
    let qy = U256::from_be_bytes(&word_at(calldata, 128)?);

    if !secp256r1::verify(&hash, &r, &s, &qx, &qy) {
        return Err(PrecompileError::InvalidSignature);
    }

    let mut result = [0u8; 32];
    result[31] = 1;
    Ok(Bytes::copy_from_slice(&result))
}
