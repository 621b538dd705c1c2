use std::cmp::Ordering;
use std::collections::HashMap;

use uuid::Uuid;

use super::matches::Match;

pub const POINTS_FOR_WIN: i64 = 3;
pub const POINTS_FOR_DRAW: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingRow {
    pub position: i64,
    pub team_id: Uuid,
    pub team_name: String,
    pub played: i64,
    pub won: i64,
    pub drawn: i64,
    pub lost: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub goal_difference: i64,
    pub points: i64,
}

impl StandingRow {
    fn empty(team_id: Uuid, team_name: String) -> Self {
        Self {
            position: 0,
            team_id,
            team_name,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }

    fn record(&mut self, scored: i32, conceded: i32) {
        let (scored, conceded) = (scored as i64, conceded as i64);
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_difference = self.goals_for - self.goals_against;
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won += 1;
                self.points += POINTS_FOR_WIN;
            }
            Ordering::Equal => {
                self.drawn += 1;
                self.points += POINTS_FOR_DRAW;
            }
            Ordering::Less => self.lost += 1,
        }
    }
}

/// Builds the league table for one season's matches.
///
/// Every team that appears in `matches` gets a row, even with no finished
/// games. Only finished matches with both scores count. Rows are ordered by
/// points, goal difference, goals scored, wins, then team name.
pub fn compute_standings(matches: &[Match], team_names: &HashMap<Uuid, String>) -> Vec<StandingRow> {
    let mut rows: HashMap<Uuid, StandingRow> = HashMap::new();
    let name_of = |id: &Uuid| {
        team_names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    };

    for m in matches {
        for team in [m.home_team_id, m.away_team_id] {
            rows.entry(team)
                .or_insert_with(|| StandingRow::empty(team, name_of(&team)));
        }
        if let Some((home, away)) = m.final_score() {
            if let Some(row) = rows.get_mut(&m.home_team_id) {
                row.record(home, away);
            }
            if let Some(row) = rows.get_mut(&m.away_team_id) {
                row.record(away, home);
            }
        }
    }

    let mut table: Vec<StandingRow> = rows.into_values().collect();
    table.sort_by(standings_order);
    for (idx, row) in table.iter_mut().enumerate() {
        row.position = idx as i64 + 1;
    }
    table
}

fn standings_order(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.goal_difference.cmp(&a.goal_difference))
        .then(b.goals_for.cmp(&a.goals_for))
        .then(b.won.cmp(&a.won))
        .then_with(|| a.team_name.cmp(&b.team_name))
}

/// Re-ranks a table by wins, then goals scored, then name, keeping the first `limit` rows.
pub fn rank_by_wins(mut rows: Vec<StandingRow>, limit: usize) -> Vec<StandingRow> {
    rows.sort_by(|a, b| {
        b.won
            .cmp(&a.won)
            .then(b.goals_for.cmp(&a.goals_for))
            .then_with(|| a.team_name.cmp(&b.team_name))
    });
    rows.truncate(limit);
    for (idx, row) in rows.iter_mut().enumerate() {
        row.position = idx as i64 + 1;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::league::matches::MatchStatus;

    fn finished(home: Uuid, away: Uuid, hs: i32, aw: i32) -> Match {
        let now = chrono::Utc::now();
        Match {
            id: Uuid::new_v4(),
            season_id: Uuid::nil(),
            home_team_id: home,
            away_team_id: away,
            kickoff_at: now,
            venue: None,
            status: MatchStatus::Finished,
            home_score: Some(hs),
            away_score: Some(aw),
            created_at: now,
            updated_at: now,
        }
    }

    fn names(pairs: &[(Uuid, &str)]) -> HashMap<Uuid, String> {
        pairs.iter().map(|(id, n)| (*id, n.to_string())).collect()
    }

    #[test]
    fn awards_points_and_orders_table() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let matches = vec![
            finished(a, b, 2, 0),
            finished(b, c, 1, 1),
            finished(c, a, 0, 3),
        ];
        let table = compute_standings(&matches, &names(&[(a, "Alpha"), (b, "Bravo"), (c, "Charlie")]));

        assert_eq!(table.len(), 3);
        assert_eq!(table[0].team_id, a);
        assert_eq!(table[0].points, 6);
        assert_eq!(table[0].goal_difference, 5);
        assert_eq!(table[0].position, 1);
        // Bravo and Charlie both have one point; Bravo has the better goal difference.
        assert_eq!(table[1].team_name, "Bravo");
        assert_eq!(table[1].goal_difference, -2);
        assert_eq!(table[2].team_name, "Charlie");
        assert_eq!(table[2].goal_difference, -3);
        assert_eq!(table[2].position, 3);
    }

    #[test]
    fn unfinished_matches_only_register_teams() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut scheduled = finished(a, b, 0, 0);
        scheduled.status = MatchStatus::Scheduled;
        scheduled.home_score = None;
        scheduled.away_score = None;

        let table = compute_standings(&[scheduled], &names(&[(a, "Alpha"), (b, "Bravo")]));
        assert_eq!(table.len(), 2);
        assert!(table.iter().all(|r| r.played == 0 && r.points == 0));
        // Ties fall back to alphabetical order.
        assert_eq!(table[0].team_name, "Alpha");
    }

    #[test]
    fn goals_scored_break_equal_goal_difference() {
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let matches = vec![finished(a, c, 3, 2), finished(b, d, 1, 0)];
        let table = compute_standings(
            &matches,
            &names(&[(a, "Alpha"), (b, "Bravo"), (c, "Charlie"), (d, "Delta")]),
        );
        assert_eq!(table[0].team_id, a);
        assert_eq!(table[1].team_id, b);
    }

    #[test]
    fn rank_by_wins_truncates() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let matches = vec![
            finished(a, b, 1, 0),
            finished(a, c, 1, 0),
            finished(b, c, 4, 0),
        ];
        let table = compute_standings(&matches, &names(&[(a, "Alpha"), (b, "Bravo"), (c, "Charlie")]));
        let top = rank_by_wins(table, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].team_id, a);
        assert_eq!(top[0].won, 2);
        assert_eq!(top[1].team_id, b);
        assert_eq!(top[1].position, 2);
    }
}
