//! In-memory `KnockoutStore` for unit tests
//!
//! `MemoryStore` holds committed state. `begin` hands out a `MemoryTx` working
//! on a copy; only `MemoryStore::commit` makes its writes visible, so dropping
//! a transaction behaves like a rollback. Each write advances a fake clock by
//! one millisecond, keeping `updated` tokens distinct.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use super::store::KnockoutStore;
use crate::shared::knockout::{
    Match, MatchId, MatchSlot, MatchStatus, NewParticipant, Participant, ParticipantId, Tournament,
    TournamentId, TournamentSummary, Winner,
};

#[derive(Debug, Clone)]
pub struct MemoryData {
    pub tournaments: BTreeMap<TournamentId, Tournament>,
    pub admins: HashSet<(TournamentId, Uuid)>,
    pub grants: HashSet<(Uuid, i32)>,
    pub participants: BTreeMap<ParticipantId, Participant>,
    pub matches: BTreeMap<MatchId, Match>,
    next_id: i64,
    clock: DateTime<Utc>,
}

impl Default for MemoryData {
    fn default() -> Self {
        Self {
            tournaments: BTreeMap::new(),
            admins: HashSet::new(),
            grants: HashSet::new(),
            participants: BTreeMap::new(),
            matches: BTreeMap::new(),
            next_id: 1,
            clock: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single().unwrap_or_default(),
        }
    }
}

impl MemoryData {
    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += Duration::milliseconds(1);
        self.clock
    }

    /// Match at `(stage, number)` of a tournament
    pub fn match_at(&self, tournament_id: TournamentId, stage: i16, number: i16) -> Option<&Match> {
        self.matches.values().find(|m| {
            m.tournament_id == tournament_id && m.stage_number == stage && m.match_number == number
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: MemoryData,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &MemoryData {
        &self.data
    }

    /// Grant an action to a user outside any transaction
    pub fn grant(&mut self, user_id: Uuid, action_id: i32) {
        self.data.grants.insert((user_id, action_id));
    }

    pub fn begin(&self) -> MemoryTx {
        MemoryTx {
            data: self.data.clone(),
            writes: 0,
            fail_on_write: None,
        }
    }

    pub fn commit(&mut self, tx: MemoryTx) {
        self.data = tx.data;
    }
}

/// Working copy for one transaction
#[derive(Debug)]
pub struct MemoryTx {
    data: MemoryData,
    /// Number of writes issued so far
    pub writes: usize,
    /// Fail the write with this 1-based index
    pub fail_on_write: Option<usize>,
}

impl MemoryTx {
    pub fn data(&self) -> &MemoryData {
        &self.data
    }

    fn write(&mut self) -> Result<DateTime<Utc>, sqlx::Error> {
        self.writes += 1;
        if self.fail_on_write == Some(self.writes) {
            return Err(sqlx::Error::Protocol("injected write failure".to_string()));
        }
        Ok(self.data.tick())
    }

    fn stored_match(&mut self, match_id: MatchId) -> Result<&mut Match, sqlx::Error> {
        self.data.matches.get_mut(&match_id).ok_or(sqlx::Error::RowNotFound)
    }
}

impl KnockoutStore for MemoryTx {
    async fn is_tournament_admin(&mut self, tournament_id: TournamentId, user_id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.data.admins.contains(&(tournament_id, user_id)))
    }

    async fn has_action(&mut self, user_id: Uuid, action_id: i32) -> Result<bool, sqlx::Error> {
        Ok(self.data.grants.contains(&(user_id, action_id)))
    }

    async fn insert_tournament(
        &mut self,
        name: &str,
        description: Option<&str>,
        public_access: bool,
    ) -> Result<Tournament, sqlx::Error> {
        let now = self.write()?;
        let tournament = Tournament {
            id: self.data.next_id(),
            name: name.to_string(),
            description: description.map(str::to_string),
            public_access,
            created: now,
            updated: now,
        };
        self.data.tournaments.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn insert_participants(
        &mut self,
        tournament_id: TournamentId,
        participants: &[NewParticipant],
    ) -> Result<Vec<Participant>, sqlx::Error> {
        self.write()?;
        let mut inserted = Vec::with_capacity(participants.len());
        for participant in participants {
            let stored = Participant {
                id: self.data.next_id(),
                tournament_id,
                name: participant.name.clone(),
                team: participant.team.clone(),
                country_id: participant.country_id.clone(),
            };
            self.data.participants.insert(stored.id, stored.clone());
            inserted.push(stored);
        }
        Ok(inserted)
    }

    async fn link_admin(&mut self, tournament_id: TournamentId, user_id: Uuid) -> Result<(), sqlx::Error> {
        self.write()?;
        self.data.admins.insert((tournament_id, user_id));
        Ok(())
    }

    async fn insert_stage(
        &mut self,
        tournament_id: TournamentId,
        stage_number: i16,
        slots: &[(Option<ParticipantId>, Option<ParticipantId>)],
    ) -> Result<Vec<Match>, sqlx::Error> {
        let now = self.write()?;
        let mut inserted = Vec::with_capacity(slots.len());
        for (match_number, (first, second)) in slots.iter().enumerate() {
            let stored = Match {
                id: self.data.next_id(),
                tournament_id,
                stage_number,
                match_number: match_number as i16,
                participant_1_id: *first,
                participant_2_id: *second,
                date: None,
                information: None,
                status: MatchStatus::Future,
                winner: Winner::Undetermined,
                created: now,
                updated: now,
            };
            self.data.matches.insert(stored.id, stored.clone());
            inserted.push(stored);
        }
        Ok(inserted)
    }

    async fn find_match(&mut self, match_id: MatchId) -> Result<Option<Match>, sqlx::Error> {
        Ok(self.data.matches.get(&match_id).cloned())
    }

    async fn match_at(
        &mut self,
        tournament_id: TournamentId,
        stage_number: i16,
        match_number: i16,
    ) -> Result<Option<Match>, sqlx::Error> {
        Ok(self.data.match_at(tournament_id, stage_number, match_number).cloned())
    }

    async fn participant_in_tournament(
        &mut self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> Result<bool, sqlx::Error> {
        Ok(self
            .data
            .participants
            .get(&participant_id)
            .is_some_and(|p| p.tournament_id == tournament_id))
    }

    async fn update_match(&mut self, next: &Match) -> Result<Match, sqlx::Error> {
        let now = self.write()?;
        let stored = self.stored_match(next.id)?;
        stored.date = next.date;
        stored.information = next.information.clone();
        stored.participant_1_id = next.participant_1_id;
        stored.participant_2_id = next.participant_2_id;
        stored.status = next.status;
        stored.winner = next.winner;
        stored.updated = now;
        Ok(stored.clone())
    }

    async fn write_slot(
        &mut self,
        match_id: MatchId,
        slot: MatchSlot,
        participant: Option<ParticipantId>,
        reset_winner: bool,
    ) -> Result<Match, sqlx::Error> {
        let now = self.write()?;
        let stored = self.stored_match(match_id)?;
        match slot {
            MatchSlot::Participant1 => stored.participant_1_id = participant,
            MatchSlot::Participant2 => stored.participant_2_id = participant,
        }
        if reset_winner {
            stored.winner = Winner::Undetermined;
        }
        stored.updated = now;
        Ok(stored.clone())
    }

    async fn lock_tournament(&mut self, tournament_id: TournamentId) -> Result<Option<Tournament>, sqlx::Error> {
        Ok(self.data.tournaments.get(&tournament_id).cloned())
    }

    async fn touch_tournament(&mut self, tournament_id: TournamentId) -> Result<Tournament, sqlx::Error> {
        let now = self.write()?;
        let stored = self
            .data
            .tournaments
            .get_mut(&tournament_id)
            .ok_or(sqlx::Error::RowNotFound)?;
        stored.updated = now;
        Ok(stored.clone())
    }

    async fn find_tournament(&mut self, tournament_id: TournamentId) -> Result<Option<Tournament>, sqlx::Error> {
        Ok(self.data.tournaments.get(&tournament_id).cloned())
    }

    async fn tournament_participants(&mut self, tournament_id: TournamentId) -> Result<Vec<Participant>, sqlx::Error> {
        Ok(self
            .data
            .participants
            .values()
            .filter(|p| p.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn tournament_matches(&mut self, tournament_id: TournamentId) -> Result<Vec<Match>, sqlx::Error> {
        let mut matches: Vec<Match> = self
            .data
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.stage_number, m.match_number));
        Ok(matches)
    }

    async fn update_tournament(
        &mut self,
        tournament_id: TournamentId,
        name: &str,
        description: Option<&str>,
        public_access: bool,
    ) -> Result<Tournament, sqlx::Error> {
        let now = self.write()?;
        let stored = self
            .data
            .tournaments
            .get_mut(&tournament_id)
            .ok_or(sqlx::Error::RowNotFound)?;
        stored.name = name.to_string();
        stored.description = description.map(str::to_string);
        stored.public_access = public_access;
        stored.updated = now;
        Ok(stored.clone())
    }

    async fn tournaments_for_user(&mut self, user_id: Uuid) -> Result<Vec<TournamentSummary>, sqlx::Error> {
        let mut summaries: Vec<TournamentSummary> = self
            .data
            .tournaments
            .values()
            .filter(|t| self.data.admins.contains(&(t.id, user_id)))
            .map(|t| TournamentSummary {
                id: t.id,
                name: t.name.clone(),
                description: t.description.clone(),
                public_access: t.public_access,
                created: t.created,
                updated: t.updated,
                participants: self
                    .data
                    .participants
                    .values()
                    .filter(|p| p.tournament_id == t.id)
                    .count() as i64,
            })
            .collect();
        summaries.sort_by(|a, b| b.updated.cmp(&a.updated));
        Ok(summaries)
    }
}
