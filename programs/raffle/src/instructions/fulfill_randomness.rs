use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::WinnerSelected;
use crate::oracle::RandomnessCommitment;
use crate::state::Raffle;

/// Accounts required to deliver the revealed randomness and pay the winner.
///
/// The client bundles [ Switchboard revealIx, fulfill_randomness IX ]. The
/// winner is known off-chain once the value is revealed, so the keeper passes
/// the winner account in; it is checked against the on-chain selection.
#[derive(Accounts)]
pub struct FulfillRandomness<'info> {
    /// Account paying for the transaction fees.
    #[account(mut)]
    pub keeper: Signer<'info>,

    #[account(
        mut,
        seeds = [RAFFLE_SEED],
        bump = raffle.bump
    )]
    pub raffle: Account<'info, Raffle>,

    /// CHECK: Switchboard On-Demand randomness account. Must match the
    /// pending request recorded by perform_upkeep.
    pub randomness_account_data: UncheckedAccount<'info>,

    /// CHECK: Receives the pot. Must be the entrant selected by the draw.
    #[account(mut)]
    pub winner: UncheckedAccount<'info>,
}

/// Settles the pending draw.
///
/// Steps:
/// 1. Correlate the randomness account with the pending request.
/// 2. Pick `entrants[word mod entrants]` and reopen the raffle.
/// 3. Move the pot from the raffle PDA to the winner.
///
/// Any failure aborts the instruction, so the raffle stays `Calculating`
/// until a valid fulfillment lands.
pub fn process_fulfill_randomness(ctx: Context<FulfillRandomness>) -> Result<()> {
    let clock = Clock::get()?;
    let raffle = &mut ctx.accounts.raffle;

    let pending = raffle.pending().ok_or(ErrorCode::UnexpectedFulfillment)?;
    let commitment = RandomnessCommitment::load_pending(
        &ctx.accounts.randomness_account_data.to_account_info(),
        &pending,
        &clock,
    )?;
    let random_words = commitment.reveal(&raffle.oracle, &pending, clock.slot)?;

    let selected = raffle.settle(commitment.key, &random_words, clock.unix_timestamp)?;

    let raffle_info = ctx.accounts.raffle.to_account_info();
    let winner_info = ctx.accounts.winner.to_account_info();
    let rent_floor = Rent::get()?.minimum_balance(raffle_info.data_len());
    let (raffle_lamports, winner_lamports) = payout_to(
        &selected,
        winner_info.key(),
        raffle_info.lamports(),
        winner_info.lamports(),
        rent_floor,
    )?;

    **raffle_info.try_borrow_mut_lamports()? = raffle_lamports;
    **winner_info.try_borrow_mut_lamports()? = winner_lamports;

    msg!(
        "Winner of round {}: {} takes {} lamports",
        selected.round,
        selected.winner,
        selected.amount
    );
    emit!(selected);

    Ok(())
}

/// Balances of the raffle PDA and `winner_key` after paying out `selected`.
/// `winner_key` must be the selected entrant.
pub fn payout_to(
    selected: &WinnerSelected,
    winner_key: Pubkey,
    raffle_lamports: u64,
    winner_lamports: u64,
    rent_floor: u64,
) -> Result<(u64, u64)> {
    require_keys_eq!(winner_key, selected.winner, ErrorCode::WinnerAccountMismatch);
    split_payout(raffle_lamports, winner_lamports, selected.amount, rent_floor)
}

/// Balances of the raffle PDA and the winner after paying `amount`.
/// The raffle must stay rent exempt.
fn split_payout(
    raffle_lamports: u64,
    winner_lamports: u64,
    amount: u64,
    rent_floor: u64,
) -> Result<(u64, u64)> {
    let remaining = raffle_lamports
        .checked_sub(amount)
        .filter(|remaining| *remaining >= rent_floor);
    let Some(remaining) = remaining else {
        msg!("Raffle lamports: {}", raffle_lamports);
        msg!("Payout: {}", amount);
        msg!("Rent floor: {}", rent_floor);
        return err!(ErrorCode::PayoutFailed);
    };
    let credited = winner_lamports
        .checked_add(amount)
        .ok_or(ErrorCode::PayoutFailed)?;
    Ok((remaining, credited))
}
