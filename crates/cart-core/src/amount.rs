//! # Amounts
//!
//! SOL amounts held as integer lamports.
//! Decimal SOL only appears at the edges (request bodies, display).

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// An amount in lamports (the smallest SOL unit)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lamports(pub u64);

impl Lamports {
    pub const ZERO: Lamports = Lamports(0);

    /// Convert a decimal SOL amount to lamports.
    ///
    /// Rounds half away from zero after multiplying by 10^9. Negative,
    /// non-finite and out-of-range amounts are rejected.
    pub fn from_sol(amount_sol: f64) -> PaymentResult<Self> {
        if !amount_sol.is_finite() {
            return Err(PaymentError::InvalidAmount(format!(
                "{} is not a finite number",
                amount_sol
            )));
        }
        if amount_sol < 0.0 {
            return Err(PaymentError::InvalidAmount(format!(
                "{} SOL is negative",
                amount_sol
            )));
        }

        let lamports = (amount_sol * LAMPORTS_PER_SOL as f64).round();
        if lamports >= u64::MAX as f64 {
            return Err(PaymentError::InvalidAmount(format!(
                "{} SOL exceeds the maximum transferable amount",
                amount_sol
            )));
        }

        Ok(Lamports(lamports as u64))
    }

    /// Raw lamport value
    pub fn get(self) -> u64 {
        self.0
    }

    /// Decimal SOL value (lossy for very large amounts)
    pub fn as_sol(self) -> f64 {
        self.0 as f64 / LAMPORTS_PER_SOL as f64
    }

    /// Multiply by a quantity, saturating on overflow
    pub fn times(self, quantity: u32) -> Lamports {
        Lamports(self.0.saturating_mul(quantity as u64))
    }

    /// Format for display (e.g., "0.50 SOL")
    pub fn display(&self) -> String {
        format!("{:.2} SOL", self.as_sol())
    }
}

impl std::ops::Add for Lamports {
    type Output = Lamports;

    fn add(self, rhs: Lamports) -> Lamports {
        Lamports(self.0.saturating_add(rhs.0))
    }
}

impl std::iter::Sum for Lamports {
    fn sum<I: Iterator<Item = Lamports>>(iter: I) -> Lamports {
        iter.fold(Lamports::ZERO, |acc, x| acc + x)
    }
}

impl std::fmt::Display for Lamports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} lamports", self.0)
    }
}
