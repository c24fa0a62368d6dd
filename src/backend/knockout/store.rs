/**
 * Knockout Storage
 *
 * Repository trait used by bracket generation, match edits and the read
 * endpoints, plus its PostgreSQL implementation.
 *
 * Every logical operation runs against one `PgKnockoutTx`, which owns one
 * pooled connection inside one transaction. `commit` consumes the handle;
 * dropping it without committing rolls every write back, so an early `?`
 * return or a cancelled future never leaves a partial bracket or a partial
 * cascade behind.
 */

use std::future::Future;

use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::shared::knockout::{
    Match, MatchId, MatchSlot, NewParticipant, Participant, ParticipantId, Tournament, TournamentId,
    TournamentSummary,
};

/// Bind parameters PostgreSQL accepts in one statement
const MAX_BINDS_PER_STATEMENT: usize = u16::MAX as usize;

const PARTICIPANT_BINDS: usize = 4;
const MATCH_BINDS: usize = 5;

/// Rows of a multi-row insert that fit in one statement
fn rows_per_statement(binds_per_row: usize) -> usize {
    MAX_BINDS_PER_STATEMENT / binds_per_row
}

/// Storage operations needed by the knockout feature
///
/// Implementations are scoped to a single transaction. Methods return `Send`
/// futures so generic callers stay usable from axum handlers.
pub trait KnockoutStore: Send {
    /// Whether `user_id` is linked to the tournament as an admin
    fn is_tournament_admin(
        &mut self,
        tournament_id: TournamentId,
        user_id: Uuid,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Whether any role of `user_id` grants `action_id`
    fn has_action(
        &mut self,
        user_id: Uuid,
        action_id: i32,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    fn insert_tournament(
        &mut self,
        name: &str,
        description: Option<&str>,
        public_access: bool,
    ) -> impl Future<Output = Result<Tournament, sqlx::Error>> + Send;

    /// Insert participants, returned in the order given
    fn insert_participants(
        &mut self,
        tournament_id: TournamentId,
        participants: &[NewParticipant],
    ) -> impl Future<Output = Result<Vec<Participant>, sqlx::Error>> + Send;

    fn link_admin(
        &mut self,
        tournament_id: TournamentId,
        user_id: Uuid,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Insert one stage, `slots[k]` becoming match number `k`
    fn insert_stage(
        &mut self,
        tournament_id: TournamentId,
        stage_number: i16,
        slots: &[(Option<ParticipantId>, Option<ParticipantId>)],
    ) -> impl Future<Output = Result<Vec<Match>, sqlx::Error>> + Send;

    fn find_match(
        &mut self,
        match_id: MatchId,
    ) -> impl Future<Output = Result<Option<Match>, sqlx::Error>> + Send;

    /// Match at `(stage_number, match_number)`, `None` past the final
    fn match_at(
        &mut self,
        tournament_id: TournamentId,
        stage_number: i16,
        match_number: i16,
    ) -> impl Future<Output = Result<Option<Match>, sqlx::Error>> + Send;

    fn participant_in_tournament(
        &mut self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Write every editable field of `next` and bump its `updated` token
    fn update_match(&mut self, next: &Match) -> impl Future<Output = Result<Match, sqlx::Error>> + Send;

    /// Set one participant slot, optionally resetting the winner to undetermined
    fn write_slot(
        &mut self,
        match_id: MatchId,
        slot: MatchSlot,
        participant: Option<ParticipantId>,
        reset_winner: bool,
    ) -> impl Future<Output = Result<Match, sqlx::Error>> + Send;

    /// Take the tournament row lock until the transaction ends
    fn lock_tournament(
        &mut self,
        tournament_id: TournamentId,
    ) -> impl Future<Output = Result<Option<Tournament>, sqlx::Error>> + Send;

    /// Bump the tournament's `updated` token
    fn touch_tournament(
        &mut self,
        tournament_id: TournamentId,
    ) -> impl Future<Output = Result<Tournament, sqlx::Error>> + Send;

    fn find_tournament(
        &mut self,
        tournament_id: TournamentId,
    ) -> impl Future<Output = Result<Option<Tournament>, sqlx::Error>> + Send;

    fn tournament_participants(
        &mut self,
        tournament_id: TournamentId,
    ) -> impl Future<Output = Result<Vec<Participant>, sqlx::Error>> + Send;

    /// All matches ordered by stage then match number
    fn tournament_matches(
        &mut self,
        tournament_id: TournamentId,
    ) -> impl Future<Output = Result<Vec<Match>, sqlx::Error>> + Send;

    fn update_tournament(
        &mut self,
        tournament_id: TournamentId,
        name: &str,
        description: Option<&str>,
        public_access: bool,
    ) -> impl Future<Output = Result<Tournament, sqlx::Error>> + Send;

    /// Tournaments administered by `user_id` with participant counts
    fn tournaments_for_user(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<TournamentSummary>, sqlx::Error>> + Send;
}

/// PostgreSQL implementation bound to one transaction
pub struct PgKnockoutTx {
    tx: Transaction<'static, Postgres>,
}

impl PgKnockoutTx {
    /// Open a transaction on a pooled connection
    pub async fn begin(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self { tx: pool.begin().await? })
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

impl KnockoutStore for PgKnockoutTx {
    async fn is_tournament_admin(&mut self, tournament_id: TournamentId, user_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM tournaments_users
                WHERE tournament_id = $1 AND user_id = $2
            )
            "#
        )
        .bind(tournament_id)
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn has_action(&mut self, user_id: Uuid, action_id: i32) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM users_roles AS ur
                INNER JOIN roles_actions AS ra ON ra.role_id = ur.role_id
                WHERE ur.user_id = $1 AND ra.action_id = $2
            )
            "#
        )
        .bind(user_id)
        .bind(action_id)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn insert_tournament(
        &mut self,
        name: &str,
        description: Option<&str>,
        public_access: bool,
    ) -> Result<Tournament, sqlx::Error> {
        sqlx::query_as::<_, Tournament>(
            r#"
            INSERT INTO tournaments (name, description, public_access)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, public_access, created, updated
            "#
        )
        .bind(name)
        .bind(description)
        .bind(public_access)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn insert_participants(
        &mut self,
        tournament_id: TournamentId,
        participants: &[NewParticipant],
    ) -> Result<Vec<Participant>, sqlx::Error> {
        if participants.is_empty() {
            return Ok(Vec::new());
        }

        let mut inserted = Vec::with_capacity(participants.len());
        for chunk in participants.chunks(rows_per_statement(PARTICIPANT_BINDS)) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO participants (tournament_id, name, team, country_id) ",
            );
            builder.push_values(chunk, |mut row, participant| {
                row.push_bind(tournament_id)
                    .push_bind(participant.name.clone())
                    .push_bind(participant.team.clone())
                    .push_bind(participant.country_id.clone());
            });
            builder.push(" RETURNING id, tournament_id, name, team, country_id");

            inserted.extend(
                builder
                    .build_query_as::<Participant>()
                    .fetch_all(&mut *self.tx)
                    .await?,
            );
        }

        // Ids come from one sequence in VALUES order, chunks run in order
        inserted.sort_by_key(|p| p.id);
        Ok(inserted)
    }

    async fn link_admin(&mut self, tournament_id: TournamentId, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO tournaments_users (tournament_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#
        )
        .bind(tournament_id)
        .bind(user_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_stage(
        &mut self,
        tournament_id: TournamentId,
        stage_number: i16,
        slots: &[(Option<ParticipantId>, Option<ParticipantId>)],
    ) -> Result<Vec<Match>, sqlx::Error> {
        if slots.is_empty() {
            return Ok(Vec::new());
        }

        let numbered: Vec<_> = slots.iter().enumerate().collect();
        let mut inserted = Vec::with_capacity(slots.len());
        for chunk in numbered.chunks(rows_per_statement(MATCH_BINDS)) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO matches (tournament_id, stage_number, match_number, participant_1_id, participant_2_id) ",
            );
            builder.push_values(chunk, |mut row, (match_number, (first, second))| {
                row.push_bind(tournament_id)
                    .push_bind(stage_number)
                    .push_bind(*match_number as i16)
                    .push_bind(*first)
                    .push_bind(*second);
            });
            builder.push(
                " RETURNING id, tournament_id, stage_number, match_number, participant_1_id, participant_2_id, \
                 date, information, status, winner, created, updated",
            );

            inserted.extend(
                builder
                    .build_query_as::<Match>()
                    .fetch_all(&mut *self.tx)
                    .await?,
            );
        }

        inserted.sort_by_key(|m| m.match_number);
        Ok(inserted)
    }

    async fn find_match(&mut self, match_id: MatchId) -> Result<Option<Match>, sqlx::Error> {
        sqlx::query_as::<_, Match>(
            r#"
            SELECT id, tournament_id, stage_number, match_number, participant_1_id, participant_2_id,
                   date, information, status, winner, created, updated
            FROM matches
            WHERE id = $1
            "#
        )
        .bind(match_id)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn match_at(
        &mut self,
        tournament_id: TournamentId,
        stage_number: i16,
        match_number: i16,
    ) -> Result<Option<Match>, sqlx::Error> {
        sqlx::query_as::<_, Match>(
            r#"
            SELECT id, tournament_id, stage_number, match_number, participant_1_id, participant_2_id,
                   date, information, status, winner, created, updated
            FROM matches
            WHERE tournament_id = $1 AND stage_number = $2 AND match_number = $3
            "#
        )
        .bind(tournament_id)
        .bind(stage_number)
        .bind(match_number)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn participant_in_tournament(
        &mut self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM participants
                WHERE id = $1 AND tournament_id = $2
            )
            "#
        )
        .bind(participant_id)
        .bind(tournament_id)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn update_match(&mut self, next: &Match) -> Result<Match, sqlx::Error> {
        sqlx::query_as::<_, Match>(
            r#"
            UPDATE matches
            SET date = $2,
                information = $3,
                participant_1_id = $4,
                participant_2_id = $5,
                status = $6,
                winner = $7,
                updated = clock_timestamp()
            WHERE id = $1
            RETURNING id, tournament_id, stage_number, match_number, participant_1_id, participant_2_id,
                      date, information, status, winner, created, updated
            "#
        )
        .bind(next.id)
        .bind(next.date)
        .bind(&next.information)
        .bind(next.participant_1_id)
        .bind(next.participant_2_id)
        .bind(next.status)
        .bind(next.winner)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn write_slot(
        &mut self,
        match_id: MatchId,
        slot: MatchSlot,
        participant: Option<ParticipantId>,
        reset_winner: bool,
    ) -> Result<Match, sqlx::Error> {
        let sql = match slot {
            MatchSlot::Participant1 => {
                r#"
                UPDATE matches
                SET participant_1_id = $2,
                    winner = CASE WHEN $3 THEN 0::SMALLINT ELSE winner END,
                    updated = clock_timestamp()
                WHERE id = $1
                RETURNING id, tournament_id, stage_number, match_number, participant_1_id, participant_2_id,
                          date, information, status, winner, created, updated
                "#
            }
            MatchSlot::Participant2 => {
                r#"
                UPDATE matches
                SET participant_2_id = $2,
                    winner = CASE WHEN $3 THEN 0::SMALLINT ELSE winner END,
                    updated = clock_timestamp()
                WHERE id = $1
                RETURNING id, tournament_id, stage_number, match_number, participant_1_id, participant_2_id,
                          date, information, status, winner, created, updated
                "#
            }
        };

        sqlx::query_as::<_, Match>(sql)
            .bind(match_id)
            .bind(participant)
            .bind(reset_winner)
            .fetch_one(&mut *self.tx)
            .await
    }

    async fn lock_tournament(&mut self, tournament_id: TournamentId) -> Result<Option<Tournament>, sqlx::Error> {
        sqlx::query_as::<_, Tournament>(
            r#"
            SELECT id, name, description, public_access, created, updated
            FROM tournaments
            WHERE id = $1
            FOR UPDATE
            "#
        )
        .bind(tournament_id)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn touch_tournament(&mut self, tournament_id: TournamentId) -> Result<Tournament, sqlx::Error> {
        sqlx::query_as::<_, Tournament>(
            r#"
            UPDATE tournaments
            SET updated = clock_timestamp()
            WHERE id = $1
            RETURNING id, name, description, public_access, created, updated
            "#
        )
        .bind(tournament_id)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn find_tournament(&mut self, tournament_id: TournamentId) -> Result<Option<Tournament>, sqlx::Error> {
        sqlx::query_as::<_, Tournament>(
            r#"
            SELECT id, name, description, public_access, created, updated
            FROM tournaments
            WHERE id = $1
            "#
        )
        .bind(tournament_id)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn tournament_participants(&mut self, tournament_id: TournamentId) -> Result<Vec<Participant>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, tournament_id, name, team, country_id
            FROM participants
            WHERE tournament_id = $1
            ORDER BY id
            "#
        )
        .bind(tournament_id)
        .fetch_all(&mut *self.tx)
        .await
    }

    async fn tournament_matches(&mut self, tournament_id: TournamentId) -> Result<Vec<Match>, sqlx::Error> {
        sqlx::query_as::<_, Match>(
            r#"
            SELECT id, tournament_id, stage_number, match_number, participant_1_id, participant_2_id,
                   date, information, status, winner, created, updated
            FROM matches
            WHERE tournament_id = $1
            ORDER BY stage_number, match_number
            "#
        )
        .bind(tournament_id)
        .fetch_all(&mut *self.tx)
        .await
    }

    async fn update_tournament(
        &mut self,
        tournament_id: TournamentId,
        name: &str,
        description: Option<&str>,
        public_access: bool,
    ) -> Result<Tournament, sqlx::Error> {
        sqlx::query_as::<_, Tournament>(
            r#"
            UPDATE tournaments
            SET name = $2, description = $3, public_access = $4, updated = clock_timestamp()
            WHERE id = $1
            RETURNING id, name, description, public_access, created, updated
            "#
        )
        .bind(tournament_id)
        .bind(name)
        .bind(description)
        .bind(public_access)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn tournaments_for_user(&mut self, user_id: Uuid) -> Result<Vec<TournamentSummary>, sqlx::Error> {
        sqlx::query_as::<_, TournamentSummary>(
            r#"
            SELECT t.id, t.name, t.description, t.public_access, t.created, t.updated,
                   COUNT(p.id) AS participants
            FROM tournaments AS t
            INNER JOIN tournaments_users AS tu ON tu.tournament_id = t.id
            LEFT JOIN participants AS p ON p.tournament_id = t.id
            WHERE tu.user_id = $1
            GROUP BY t.id
            ORDER BY t.updated DESC
            "#
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_chunks_stay_under_bind_limit() {
        for binds in [PARTICIPANT_BINDS, MATCH_BINDS] {
            let rows = rows_per_statement(binds);
            assert!(rows * binds <= MAX_BINDS_PER_STATEMENT);
            assert!((rows + 1) * binds > MAX_BINDS_PER_STATEMENT);
        }
    }

    #[test]
    fn test_largest_field_needs_several_statements() {
        let participants = crate::shared::knockout::plan::MAX_PARTICIPANTS;
        assert!(participants > rows_per_statement(PARTICIPANT_BINDS));
        assert!(participants.div_ceil(2) > rows_per_statement(MATCH_BINDS));
    }
}
