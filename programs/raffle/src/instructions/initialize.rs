use anchor_lang::prelude::*;

use crate::constants::*;
use crate::oracle::OracleConfig;
use crate::state::Raffle;

/// Accounts required to create the raffle.
/// The raffle PDA stores the round state and also holds the pooled lamports.
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// The account paying for account creation and fees.
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        init,
        payer = payer,
        space = 8 + Raffle::INIT_SPACE,
        seeds = [RAFFLE_SEED],
        bump
    )]
    pub raffle: Box<Account<'info, Raffle>>,

    /// System program to create accounts.
    pub system_program: Program<'info, System>,
}

/// Creates the raffle with its immutable configuration and opens round zero.
///
/// # Arguments
/// * `ctx` - Context holding the Initialize accounts
/// * `entry_fee` - Minimum lamports per entry
/// * `round_duration` - Seconds a round stays open before upkeep may close it
/// * `oracle` - Switchboard routing for randomness requests
pub fn process_initialize(
    ctx: Context<Initialize>,
    entry_fee: u64,
    round_duration: i64,
    oracle: OracleConfig,
) -> Result<()> {
    let clock = Clock::get()?;
    let raffle = &mut ctx.accounts.raffle;

    raffle.configure(
        ctx.bumps.raffle,
        entry_fee,
        round_duration,
        oracle,
        clock.unix_timestamp,
    )?;

    msg!(
        "Raffle initialized: fee {} lamports, round {}s, queue {}",
        entry_fee,
        round_duration,
        oracle.queue
    );

    Ok(())
}
