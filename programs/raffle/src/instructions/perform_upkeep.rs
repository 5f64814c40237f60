use anchor_lang::prelude::*;

use crate::constants::*;
use crate::oracle::RandomnessCommitment;
use crate::state::Raffle;

/// Accounts required to close the round and request randomness.
///
/// Permissionless: any keeper may call it. The client bundles
/// [ Switchboard commitIx, perform_upkeep IX ] in one transaction.
#[derive(Accounts)]
pub struct PerformUpkeep<'info> {
    /// The keeper paying transaction fees.
    #[account(mut)]
    pub keeper: Signer<'info>,

    #[account(
        mut,
        seeds = [RAFFLE_SEED],
        bump = raffle.bump
    )]
    pub raffle: Account<'info, Raffle>,

    /// CHECK: Switchboard On-Demand randomness account.
    /// Validated manually via RandomnessAccountData::parse.
    pub randomness_account_data: UncheckedAccount<'info>,
}

/// `perform_data` is whatever `check_upkeep` handed the keeper. It is not
/// trusted: eligibility is evaluated again here.
pub fn process_perform_upkeep(ctx: Context<PerformUpkeep>, _perform_data: Vec<u8>) -> Result<()> {
    let clock = Clock::get()?;
    let raffle = &mut ctx.accounts.raffle;

    // Losing keepers stop here, before the randomness account is looked at.
    raffle.require_upkeep(clock.unix_timestamp)?;

    let commitment = RandomnessCommitment::load(
        &ctx.accounts.randomness_account_data.to_account_info(),
        &clock,
    )?;
    let request = commitment.open_request(&raffle.oracle, clock.slot)?;

    let closing = raffle.begin_draw(clock.unix_timestamp, request)?;

    msg!(
        "Round {} closing: {} entrants, pot {}, request {}",
        closing.round,
        closing.entrant_count,
        closing.pot_amount,
        closing.request_id
    );
    emit!(closing);

    Ok(())
}
