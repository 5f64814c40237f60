use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    // --- entries ---
    #[msg("Raffle is not accepting entries")]
    NotOpen,
    #[msg("Entry amount is below the entry fee")]
    InsufficientEntry,
    #[msg("Raffle has no free entry slots this round")]
    RaffleFull,
    #[msg("Entrant index is out of range")]
    EntrantIndexOutOfRange,

    // --- upkeep ---
    #[msg("Upkeep not needed")]
    UpkeepNotNeeded,

    // --- fulfillment ---
    #[msg("Fulfillment does not match the pending randomness request")]
    UnexpectedFulfillment,
    #[msg("Winner account does not match the selected entrant")]
    WinnerAccountMismatch,
    #[msg("Transfer of the pot to the winner failed")]
    PayoutFailed,

    // --- randomness oracle ---
    #[msg("Invalid or empty randomness account")]
    InvalidRandomnessAccount,
    #[msg("Randomness account belongs to another queue or subscription")]
    OracleQueueMismatch,
    #[msg("Randomness has expired (not from previous slot)")]
    RandomnessExpired,
    #[msg("Randomness already revealed, cannot commit")]
    RandomnessAlreadyRevealed,
    #[msg("Randomness not yet resolved by oracle")]
    RandomnessNotResolved,

    // --- configuration ---
    #[msg("Invalid raffle configuration")]
    InvalidConfig,

    #[msg("Math overflow")]
    MathOverflow,
}
