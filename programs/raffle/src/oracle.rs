use anchor_lang::prelude::*;
use solana_program::clock::Clock;
use switchboard_on_demand::accounts::RandomnessAccountData;

use crate::constants::*;
use crate::error::ErrorCode;

/// Routing parameters for randomness requests. Written once by `initialize`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct OracleConfig {
    /// Switchboard queue every randomness account must be bound to.
    pub queue: Pubkey,
    /// Authority owning the funded randomness accounts provisioned for this raffle.
    pub subscription: Pubkey,
    /// Slots that must pass between the request and its fulfillment.
    pub request_confirmations: u16,
    /// Compute units keepers request for the fulfillment transaction.
    pub callback_compute_limit: u32,
    pub num_words: u32,
}

impl OracleConfig {
    pub fn validate(&self) -> Result<()> {
        require!(self.num_words == NUM_WORDS, ErrorCode::InvalidConfig);
        require!(
            self.callback_compute_limit > 0 && self.callback_compute_limit <= MAX_COMPUTE_UNITS,
            ErrorCode::InvalidConfig
        );
        require_keys_neq!(self.queue, Pubkey::default(), ErrorCode::InvalidConfig);
        Ok(())
    }
}

/// An in-flight randomness request, as recorded on the raffle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomnessRequest {
    /// Key of the committed randomness account; correlates the fulfillment.
    pub request_id: Pubkey,
    pub seed_slot: u64,
    pub requested_at_slot: u64,
}

/// What the raffle needs to know about a Switchboard randomness account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomnessCommitment {
    pub key: Pubkey,
    pub authority: Pubkey,
    pub queue: Pubkey,
    pub seed_slot: u64,
    /// Revealed value, present only in the slot the oracle revealed it.
    pub revealed: Option<[u8; 32]>,
}

impl RandomnessCommitment {
    pub fn load(account: &AccountInfo, clock: &Clock) -> Result<Self> {
        let randomness_data = RandomnessAccountData::parse(account.data.borrow())
            .map_err(|_| ErrorCode::InvalidRandomnessAccount)?;

        Ok(Self {
            key: *account.key,
            authority: randomness_data.authority,
            queue: randomness_data.queue,
            seed_slot: randomness_data.seed_slot,
            revealed: randomness_data.get_value(clock).ok(),
        })
    }

    /// Loads the account answering `pending`. A foreign account is rejected
    /// before its data is parsed.
    pub fn load_pending(
        account: &AccountInfo,
        pending: &RandomnessRequest,
        clock: &Clock,
    ) -> Result<Self> {
        require_keys_eq!(
            *account.key,
            pending.request_id,
            ErrorCode::UnexpectedFulfillment
        );
        Self::load(account, clock)
    }

    /// Turns a freshly committed account into a request for the raffle.
    ///
    /// The keeper bundles Switchboard's commit instruction ahead of
    /// `perform_upkeep`, so the seed must come from the previous slot and the
    /// value must still be hidden.
    pub fn open_request(&self, config: &OracleConfig, slot: u64) -> Result<RandomnessRequest> {
        self.check_routing(config)?;

        require!(
            self.seed_slot == slot.saturating_sub(1),
            ErrorCode::RandomnessExpired
        );
        require!(self.revealed.is_none(), ErrorCode::RandomnessAlreadyRevealed);

        Ok(RandomnessRequest {
            request_id: self.key,
            seed_slot: self.seed_slot,
            requested_at_slot: slot,
        })
    }

    /// Reads the random words answering `pending`.
    ///
    /// Anything that is not the exact account and seed recorded at request
    /// time is rejected as an unexpected fulfillment.
    pub fn reveal(
        &self,
        config: &OracleConfig,
        pending: &RandomnessRequest,
        slot: u64,
    ) -> Result<Vec<u64>> {
        require_keys_eq!(self.key, pending.request_id, ErrorCode::UnexpectedFulfillment);
        require!(
            self.seed_slot == pending.seed_slot,
            ErrorCode::UnexpectedFulfillment
        );
        self.check_routing(config)?;

        let confirmed_at = pending
            .requested_at_slot
            .checked_add(u64::from(config.request_confirmations))
            .ok_or(ErrorCode::MathOverflow)?;
        if slot < confirmed_at {
            msg!("Current slot: {}", slot);
            msg!("Confirmed at slot: {}", confirmed_at);
            return err!(ErrorCode::RandomnessNotResolved);
        }

        let value = self.revealed.ok_or(ErrorCode::RandomnessNotResolved)?;
        Ok(random_words(&value, config.num_words))
    }

    fn check_routing(&self, config: &OracleConfig) -> Result<()> {
        require_keys_eq!(self.queue, config.queue, ErrorCode::OracleQueueMismatch);
        require_keys_eq!(
            self.authority,
            config.subscription,
            ErrorCode::OracleQueueMismatch
        );
        Ok(())
    }
}

/// Splits the 32 revealed bytes into little-endian u64 words.
pub fn random_words(value: &[u8; 32], num_words: u32) -> Vec<u64> {
    value
        .chunks_exact(8)
        .take(num_words as usize)
        .map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            u64::from_le_bytes(word)
        })
        .collect()
}
