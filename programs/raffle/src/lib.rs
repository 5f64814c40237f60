use anchor_lang::prelude::*;
use instructions::*;

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod oracle;
pub mod state;

use oracle::OracleConfig;
use state::UpkeepCheck;

declare_id!("51dwjShumFTM1HXDbvVUCLaBbyfHFzYa4Wnznv9wrUHW");

#[program]
pub mod raffle {
    use super::*;

    pub fn initialize(
        ctx: Context<Initialize>,
        entry_fee: u64,
        round_duration: i64,
        oracle: OracleConfig,
    ) -> Result<()> {
        process_initialize(ctx, entry_fee, round_duration, oracle)
    }

    pub fn enter_raffle(ctx: Context<EnterRaffle>, amount: u64) -> Result<()> {
        process_enter_raffle(ctx, amount)
    }

    pub fn check_upkeep(ctx: Context<CheckUpkeep>) -> Result<UpkeepCheck> {
        process_check_upkeep(ctx)
    }

    pub fn perform_upkeep(ctx: Context<PerformUpkeep>, perform_data: Vec<u8>) -> Result<()> {
        process_perform_upkeep(ctx, perform_data)
    }

    pub fn fulfill_randomness(ctx: Context<FulfillRandomness>) -> Result<()> {
        process_fulfill_randomness(ctx)
    }
}
