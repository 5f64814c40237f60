use anchor_lang::prelude::*;

/// Seed of the single raffle PDA. The PDA also holds the pooled lamports.
#[constant]
pub const RAFFLE_SEED: &[u8] = b"raffle";

/// Random words requested per draw.
#[constant]
pub const NUM_WORDS: u32 = 1;

/// Default confirmation depth (slots) between a request and its fulfillment.
#[constant]
pub const REQUEST_CONFIRMATIONS: u16 = 3;

/// Default compute budget keepers attach to the fulfillment transaction.
#[constant]
pub const CALLBACK_COMPUTE_LIMIT: u32 = 200_000;

/// Solana's per-transaction compute ceiling.
pub const MAX_COMPUTE_UNITS: u32 = 1_400_000;

/// Entry slots per round. Bounded by the raffle account size.
pub const MAX_ENTRANTS: usize = 256;
