use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::constants::*;
use crate::state::Raffle;

#[derive(Accounts)]
pub struct EnterRaffle<'info> {
    /// The participant paying for the entry.
    #[account(mut)]
    pub participant: Signer<'info>,

    #[account(
        mut,
        seeds = [RAFFLE_SEED],
        bump = raffle.bump
    )]
    pub raffle: Account<'info, Raffle>,

    /// System program for lamports transfers.
    pub system_program: Program<'info, System>,
}

/// Buys one entry slot with `amount` lamports.
///
/// The whole amount moves into the pot, including anything above the
/// entry fee.
pub fn process_enter_raffle(ctx: Context<EnterRaffle>, amount: u64) -> Result<()> {
    let participant = ctx.accounts.participant.key();
    let accepted = ctx.accounts.raffle.submit_entry(participant, amount)?;

    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: ctx.accounts.participant.to_account_info(),
                to: ctx.accounts.raffle.to_account_info(),
            },
        ),
        amount,
    )?;

    msg!(
        "Entry {} accepted from {}, pot {}",
        ctx.accounts.raffle.entrant_count(),
        participant,
        ctx.accounts.raffle.pot_amount
    );
    emit!(accepted);

    Ok(())
}
