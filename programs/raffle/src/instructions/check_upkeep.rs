use anchor_lang::prelude::*;

use crate::constants::*;
use crate::state::{Raffle, UpkeepCheck};

/// Read-only view polled by keepers.
#[derive(Accounts)]
pub struct CheckUpkeep<'info> {
    #[account(
        seeds = [RAFFLE_SEED],
        bump = raffle.bump
    )]
    pub raffle: Account<'info, Raffle>,
}

/// Reports whether `perform_upkeep` would close the round now.
/// The answer is returned to the caller as instruction return data.
pub fn process_check_upkeep(ctx: Context<CheckUpkeep>) -> Result<UpkeepCheck> {
    let clock = Clock::get()?;
    Ok(ctx.accounts.raffle.check_upkeep(clock.unix_timestamp))
}
