use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::{EntryAccepted, RoundClosing, WinnerSelected};
use crate::oracle::{OracleConfig, RandomnessRequest};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum RaffleState {
    /// Accepting entries.
    Open,
    /// Round closed, waiting for the oracle to answer `pending_request`.
    Calculating,
}

/// Answer to a keeper's `check_upkeep` poll.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct UpkeepCheck {
    pub upkeep_needed: bool,
    pub perform_data: Vec<u8>,
}

#[account]
#[derive(InitSpace)]
pub struct Raffle {
    /// The bump seed used for deriving the PDA address of this account.
    pub bump: u8,

    pub state: RaffleState,

    /// One slot per accepted entry, in entry order. The same key may
    /// appear several times.
    #[max_len(MAX_ENTRANTS)]
    pub entrants: Vec<Pubkey>,

    /// Lamports pooled this round. The lamports themselves sit on this
    /// account on top of its rent-exempt minimum.
    pub pot_amount: u64,

    /// UNIX timestamp of initialization or of the last payout.
    pub round_started_at: i64,

    /// Randomness account committed for the current draw.
    /// `None` while the raffle is open.
    pub pending_request: Option<Pubkey>,
    pub pending_seed_slot: u64,
    pub requested_at_slot: u64,

    /// `Pubkey::default()` until the first payout.
    pub recent_winner: Pubkey,

    /// Number of completed rounds.
    pub round: u64,

    /// The minimum amount (in lamports) accepted for one entry.
    pub entry_fee: u64,

    /// Seconds a round stays open before keepers may close it.
    pub round_duration: i64,

    pub oracle: OracleConfig,
}

impl Raffle {
    pub fn configure(
        &mut self,
        bump: u8,
        entry_fee: u64,
        round_duration: i64,
        oracle: OracleConfig,
        now: i64,
    ) -> Result<()> {
        require!(entry_fee > 0, ErrorCode::InvalidConfig);
        require!(round_duration >= 0, ErrorCode::InvalidConfig);
        oracle.validate()?;

        self.bump = bump;
        self.state = RaffleState::Open;
        self.entrants = Vec::new();
        self.pot_amount = 0;
        self.round_started_at = now;
        self.pending_request = None;
        self.pending_seed_slot = 0;
        self.requested_at_slot = 0;
        self.recent_winner = Pubkey::default();
        self.round = 0;
        self.entry_fee = entry_fee;
        self.round_duration = round_duration;
        self.oracle = oracle;
        Ok(())
    }

    /// Records one entry slot for `participant`. Amounts above the fee are
    /// pooled in full; nothing is refunded.
    pub fn submit_entry(&mut self, participant: Pubkey, amount: u64) -> Result<EntryAccepted> {
        require!(self.state == RaffleState::Open, ErrorCode::NotOpen);
        if amount < self.entry_fee {
            msg!("Entry amount: {}", amount);
            msg!("Entry fee: {}", self.entry_fee);
            return err!(ErrorCode::InsufficientEntry);
        }
        require!(self.entrants.len() < MAX_ENTRANTS, ErrorCode::RaffleFull);

        let pot_amount = self
            .pot_amount
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;

        self.entrants.push(participant);
        self.pot_amount = pot_amount;

        Ok(EntryAccepted {
            participant,
            amount,
            round: self.round,
        })
    }

    pub fn is_round_expired(&self, now: i64) -> bool {
        now.saturating_sub(self.round_started_at) > self.round_duration
    }

    fn reset_clock(&mut self, now: i64) {
        self.round_started_at = now;
    }

    pub fn upkeep_needed(&self, now: i64) -> bool {
        self.state == RaffleState::Open
            && self.is_round_expired(now)
            && !self.entrants.is_empty()
            && self.pot_amount > 0
    }

    pub fn check_upkeep(&self, now: i64) -> UpkeepCheck {
        UpkeepCheck {
            upkeep_needed: self.upkeep_needed(now),
            perform_data: Vec::new(),
        }
    }

    /// Fails with `UpkeepNotNeeded`, logging a snapshot of the round,
    /// unless the round can be closed right now.
    pub fn require_upkeep(&self, now: i64) -> Result<()> {
        if !self.upkeep_needed(now) {
            msg!(
                "Upkeep not needed: state {:?}, entrants {}, pot {}, started at {}",
                self.state,
                self.entrants.len(),
                self.pot_amount,
                self.round_started_at
            );
            return err!(ErrorCode::UpkeepNotNeeded);
        }
        Ok(())
    }

    /// Closes the round and parks the raffle until `request` is fulfilled.
    /// Entrants and pot stay untouched until settlement.
    pub fn begin_draw(&mut self, now: i64, request: RandomnessRequest) -> Result<RoundClosing> {
        self.require_upkeep(now)?;

        self.state = RaffleState::Calculating;
        self.pending_request = Some(request.request_id);
        self.pending_seed_slot = request.seed_slot;
        self.requested_at_slot = request.requested_at_slot;

        Ok(RoundClosing {
            request_id: request.request_id,
            round: self.round,
            entrant_count: self.entrants.len() as u32,
            pot_amount: self.pot_amount,
        })
    }

    pub fn pending(&self) -> Option<RandomnessRequest> {
        self.pending_request.map(|request_id| RandomnessRequest {
            request_id,
            seed_slot: self.pending_seed_slot,
            requested_at_slot: self.requested_at_slot,
        })
    }

    /// Entry slot selected by `random_value`.
    pub fn winner_for(&self, random_value: u64) -> Option<Pubkey> {
        let count = self.entrants.len() as u64;
        if count == 0 {
            return None;
        }
        self.entrants.get((random_value % count) as usize).copied()
    }

    /// Picks the winner for the pending request and reopens the raffle.
    ///
    /// The returned event carries the payout the caller must transfer in the
    /// same instruction; if that transfer fails the instruction fails and
    /// every write here is discarded with it.
    pub fn settle(
        &mut self,
        request_id: Pubkey,
        random_words: &[u64],
        now: i64,
    ) -> Result<WinnerSelected> {
        require!(
            self.state == RaffleState::Calculating,
            ErrorCode::UnexpectedFulfillment
        );
        require!(
            self.pending_request == Some(request_id),
            ErrorCode::UnexpectedFulfillment
        );

        let random_value = *random_words
            .first()
            .ok_or(ErrorCode::RandomnessNotResolved)?;
        let winner = self
            .winner_for(random_value)
            .ok_or(ErrorCode::UnexpectedFulfillment)?;

        msg!("Randomness result: {}", random_value);
        msg!("Entrants: {}", self.entrants.len());

        self.recent_winner = winner;
        self.entrants.clear();
        let amount = self.pot_amount;
        self.pot_amount = 0;
        self.reset_clock(now);
        self.pending_request = None;
        self.pending_seed_slot = 0;
        self.requested_at_slot = 0;
        let round = self.round;
        self.round = self.round.checked_add(1).ok_or(ErrorCode::MathOverflow)?;
        self.state = RaffleState::Open;

        Ok(WinnerSelected {
            winner,
            amount,
            round,
        })
    }

    pub fn entrant_count(&self) -> usize {
        self.entrants.len()
    }

    pub fn entrant_at(&self, index: usize) -> Result<Pubkey> {
        self.entrants
            .get(index)
            .copied()
            .ok_or_else(|| error!(ErrorCode::EntrantIndexOutOfRange))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    const FEE: u64 = 100;
    const DURATION: i64 = 300;

    fn raffle() -> Raffle {
        let mut raffle = Raffle {
            bump: 0,
            state: RaffleState::Open,
            entrants: Vec::new(),
            pot_amount: 0,
            round_started_at: 0,
            pending_request: None,
            pending_seed_slot: 0,
            requested_at_slot: 0,
            recent_winner: Pubkey::default(),
            round: 0,
            entry_fee: 0,
            round_duration: 0,
            oracle: OracleConfig {
                queue: Pubkey::new_unique(),
                subscription: Pubkey::new_unique(),
                request_confirmations: REQUEST_CONFIRMATIONS,
                callback_compute_limit: CALLBACK_COMPUTE_LIMIT,
                num_words: NUM_WORDS,
            },
        };
        let oracle = raffle.oracle;
        raffle.configure(254, FEE, DURATION, oracle, 0).unwrap();
        raffle
    }

    fn request(slot: u64) -> RandomnessRequest {
        RandomnessRequest {
            request_id: Pubkey::new_unique(),
            seed_slot: slot - 1,
            requested_at_slot: slot,
        }
    }

    fn assert_error<T>(result: Result<T>, expected: ErrorCode) {
        match result {
            Ok(_) => panic!("transition succeeded, expected an error"),
            Err(err) => assert_eq!(err, Error::from(expected)),
        }
    }

    fn closed(raffle: &mut Raffle, now: i64) -> Pubkey {
        let request = request(500);
        raffle.begin_draw(now, request).unwrap();
        request.request_id
    }

    #[test]
    fn configure_rejects_zero_fee_and_negative_duration() {
        let mut raffle = raffle();
        let oracle = raffle.oracle;
        assert_error(
            raffle.configure(1, 0, DURATION, oracle, 0),
            ErrorCode::InvalidConfig,
        );
        assert_error(
            raffle.configure(1, FEE, -1, oracle, 0),
            ErrorCode::InvalidConfig,
        );
    }

    #[test]
    fn entry_appends_slot_and_pools_amount() {
        let mut raffle = raffle();
        let alice = Pubkey::new_unique();

        let accepted = raffle.submit_entry(alice, FEE).unwrap();
        assert_eq!(accepted.participant, alice);
        assert_eq!(accepted.amount, FEE);
        assert_eq!(raffle.entrant_count(), 1);
        assert_eq!(raffle.pot_amount, FEE);

        // overpayment is pooled, not refunded
        raffle.submit_entry(alice, FEE + 42).unwrap();
        assert_eq!(raffle.entrant_count(), 2);
        assert_eq!(raffle.pot_amount, 2 * FEE + 42);
        assert_eq!(raffle.entrant_at(0).unwrap(), alice);
        assert_eq!(raffle.entrant_at(1).unwrap(), alice);
    }

    #[test]
    fn entry_below_fee_is_rejected() {
        let mut raffle = raffle();
        assert_error(
            raffle.submit_entry(Pubkey::new_unique(), FEE - 1),
            ErrorCode::InsufficientEntry,
        );
        assert_eq!(raffle.entrant_count(), 0);
        assert_eq!(raffle.pot_amount, 0);
    }

    #[test]
    fn entry_while_calculating_is_rejected() {
        let mut raffle = raffle();
        raffle.submit_entry(Pubkey::new_unique(), FEE).unwrap();
        closed(&mut raffle, DURATION + 1);

        assert_error(
            raffle.submit_entry(Pubkey::new_unique(), FEE),
            ErrorCode::NotOpen,
        );
        assert_eq!(raffle.entrant_count(), 1);
        assert_eq!(raffle.pot_amount, FEE);
    }

    #[test]
    fn entry_is_rejected_when_ledger_is_full() {
        let mut raffle = raffle();
        for _ in 0..MAX_ENTRANTS {
            raffle.submit_entry(Pubkey::new_unique(), FEE).unwrap();
        }
        assert_error(
            raffle.submit_entry(Pubkey::new_unique(), FEE),
            ErrorCode::RaffleFull,
        );
        assert_eq!(raffle.entrant_count(), MAX_ENTRANTS);
    }

    #[test]
    fn round_expires_strictly_after_duration() {
        let raffle = raffle();
        assert!(!raffle.is_round_expired(DURATION - 1));
        assert!(!raffle.is_round_expired(DURATION));
        assert!(raffle.is_round_expired(DURATION + 1));
    }

    #[test]
    fn upkeep_needs_open_expired_entrants_and_pot() {
        // (open, expired, has entrants, has pot)
        for open in [true, false] {
            for expired in [true, false] {
                for has_entrants in [true, false] {
                    for has_pot in [true, false] {
                        let mut raffle = raffle();
                        if has_entrants {
                            raffle.entrants.push(Pubkey::new_unique());
                        }
                        if has_pot {
                            raffle.pot_amount = FEE;
                        }
                        if !open {
                            raffle.state = RaffleState::Calculating;
                        }
                        let now = if expired { DURATION + 1 } else { DURATION };

                        let check = raffle.check_upkeep(now);
                        assert_eq!(
                            check.upkeep_needed,
                            open && expired && has_entrants && has_pot,
                            "open={open} expired={expired} entrants={has_entrants} pot={has_pot}"
                        );
                        assert!(check.perform_data.is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn begin_draw_without_upkeep_leaves_state() {
        let mut raffle = raffle();
        raffle.submit_entry(Pubkey::new_unique(), FEE).unwrap();

        assert_error(
            raffle.begin_draw(DURATION, request(500)),
            ErrorCode::UpkeepNotNeeded,
        );
        assert_eq!(raffle.state, RaffleState::Open);
        assert_eq!(raffle.pending_request, None);
    }

    #[test]
    fn begin_draw_records_request_and_keeps_ledger() {
        let mut raffle = raffle();
        let alice = Pubkey::new_unique();
        raffle.submit_entry(alice, FEE).unwrap();
        let request = request(500);

        let closing = raffle.begin_draw(DURATION + 1, request).unwrap();

        assert_eq!(closing.request_id, request.request_id);
        assert_eq!(closing.entrant_count, 1);
        assert_eq!(closing.pot_amount, FEE);
        assert_eq!(raffle.state, RaffleState::Calculating);
        assert_eq!(raffle.pending(), Some(request));
        assert_eq!(raffle.entrants, vec![alice]);
        assert_eq!(raffle.pot_amount, FEE);
    }

    #[test]
    fn competing_keeper_fails_after_first_trigger() {
        let mut raffle = raffle();
        raffle.submit_entry(Pubkey::new_unique(), FEE).unwrap();
        let first = closed(&mut raffle, DURATION + 1);

        assert_error(
            raffle.begin_draw(DURATION + 2, request(501)),
            ErrorCode::UpkeepNotNeeded,
        );
        assert_eq!(raffle.pending_request, Some(first));
    }

    #[test]
    fn settle_rejects_mismatched_request() {
        let mut raffle = raffle();
        raffle.submit_entry(Pubkey::new_unique(), FEE).unwrap();
        let request_id = closed(&mut raffle, DURATION + 1);

        assert_error(
            raffle.settle(Pubkey::new_unique(), &[457], DURATION + 10),
            ErrorCode::UnexpectedFulfillment,
        );
        assert_eq!(raffle.state, RaffleState::Calculating);
        assert_eq!(raffle.pending_request, Some(request_id));
        assert_eq!(raffle.entrant_count(), 1);
    }

    #[test]
    fn settle_while_open_is_rejected() {
        let mut raffle = raffle();
        raffle.submit_entry(Pubkey::new_unique(), FEE).unwrap();
        assert_error(
            raffle.settle(Pubkey::new_unique(), &[1], DURATION + 1),
            ErrorCode::UnexpectedFulfillment,
        );
        assert_eq!(raffle.state, RaffleState::Open);
    }

    #[test]
    fn single_entrant_round_pays_out_and_reopens() {
        let mut raffle = raffle();
        let alice = Pubkey::new_unique();
        raffle.submit_entry(alice, FEE).unwrap();

        assert!(raffle.check_upkeep(301).upkeep_needed);
        let request_id = closed(&mut raffle, 301);
        assert_eq!(raffle.state, RaffleState::Calculating);

        let selected = raffle.settle(request_id, &[457], 320).unwrap();

        assert_eq!(selected.winner, alice);
        assert_eq!(selected.amount, FEE);
        assert_eq!(selected.round, 0);
        assert_eq!(raffle.recent_winner, alice);
        assert_eq!(raffle.state, RaffleState::Open);
        assert!(raffle.entrants.is_empty());
        assert_eq!(raffle.pot_amount, 0);
        assert_eq!(raffle.round_started_at, 320);
        assert_eq!(raffle.pending(), None);
        assert_error(raffle.entrant_at(0), ErrorCode::EntrantIndexOutOfRange);
    }

    #[test]
    fn winner_index_is_random_value_mod_entrants() {
        for (value, expected) in [(0u64, 0usize), (1, 1), (2, 2), (3, 0)] {
            let mut raffle = raffle();
            let players = [
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                Pubkey::new_unique(),
            ];
            for (i, player) in players.iter().enumerate() {
                raffle.submit_entry(*player, FEE).unwrap();
                assert_eq!(raffle.entrant_count(), i + 1);
            }
            let request_id = closed(&mut raffle, DURATION + 1);

            let selected = raffle.settle(request_id, &[value], DURATION + 5).unwrap();

            assert_eq!(selected.winner, players[expected], "value {value}");
            assert_eq!(selected.amount, 3 * FEE);
        }
    }

    #[test]
    fn raffle_cycles_over_repeated_rounds() {
        let mut raffle = raffle();
        let mut now = 0;

        for round in 0..5u64 {
            let player = Pubkey::new_unique();
            raffle.submit_entry(player, FEE).unwrap();
            raffle.submit_entry(Pubkey::new_unique(), FEE).unwrap();

            now += DURATION + 1;
            let request_id = closed(&mut raffle, now);
            let selected = raffle.settle(request_id, &[round * 2], now).unwrap();

            assert_eq!(selected.winner, player);
            assert_eq!(selected.round, round);
            assert_eq!(raffle.round, round + 1);
            assert_eq!(raffle.state, RaffleState::Open);
            assert!(!raffle.check_upkeep(now + DURATION).upkeep_needed);
        }
    }

    #[test]
    fn settle_without_words_keeps_round_pending() {
        let mut raffle = raffle();
        raffle.submit_entry(Pubkey::new_unique(), FEE).unwrap();
        let request_id = closed(&mut raffle, DURATION + 1);

        assert_error(
            raffle.settle(request_id, &[], DURATION + 2),
            ErrorCode::RandomnessNotResolved,
        );
        assert_eq!(raffle.state, RaffleState::Calculating);
    }
}
