use anchor_lang::prelude::*;

#[event]
pub struct EntryAccepted {
    pub participant: Pubkey,
    pub amount: u64,
    pub round: u64,
}

/// Emitted when a keeper closes the round and the draw is requested.
#[event]
pub struct RoundClosing {
    pub request_id: Pubkey,
    pub round: u64,
    pub entrant_count: u32,
    pub pot_amount: u64,
}

#[event]
pub struct WinnerSelected {
    pub winner: Pubkey,
    pub amount: u64,
    pub round: u64,
}
