//! In-memory port implementations and fixtures shared by unit and HTTP tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::dto::league::{GoalInput, MatchInput, PlayerInput, SeasonInput, TeamInput};
use crate::application::ports::audit_repository::AuditRepository;
use crate::application::ports::goal_repository::GoalRepository;
use crate::application::ports::google_verifier::{GoogleIdentity, GoogleTokenVerifier};
use crate::application::ports::mailer::{MailMessage, Mailer};
use crate::application::ports::match_repository::{MatchFilter, MatchRepository};
use crate::application::ports::player_repository::{PlayerFilter, PlayerRepository};
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::season_repository::SeasonRepository;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::team_repository::{TeamFilter, TeamRepository};
use crate::application::ports::user_repository::UserRepository;
use crate::application::ports::UniqueViolation;
use crate::application::services::auth_settings::AuthSettings;
use crate::bootstrap::app_context::{AppContext, AppServices};
use crate::bootstrap::config::Config;
use crate::domain::audit::{AuditEntry, AuditFilter, NewAuditEntry};
use crate::domain::identity::permission::Permission;
use crate::domain::identity::role::{Role, system_roles};
use crate::domain::identity::session::{NewSession, TerminationReason, UserSession};
use crate::domain::identity::user::{NewUser, User};
use crate::domain::league::goal::{Goal, ScorerTally};
use crate::domain::league::matches::Match;
use crate::domain::league::player::Player;
use crate::domain::league::season::Season;
use crate::domain::league::team::Team;
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::security::jwt::JwtAccessTokenIssuer;

type Timestamp = chrono::DateTime<chrono::Utc>;

fn now() -> Timestamp {
    chrono::Utc::now()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryTeams {
    rows: Mutex<Vec<Team>>,
}

#[async_trait]
impl TeamRepository for InMemoryTeams {
    async fn create(&self, input: &TeamInput) -> anyhow::Result<Team> {
        let team = Team {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            short_name: input.short_name.clone(),
            city: input.city.clone(),
            stadium: input.stadium.clone(),
            founded_year: input.founded_year,
            logo_url: input.logo_url.clone(),
            created_at: now(),
            updated_at: now(),
        };
        self.rows.lock().unwrap().push(team.clone());
        Ok(team)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Team>> {
        Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Team>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Team>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, input: &TeamInput) -> anyhow::Result<Option<Team>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(team) = rows.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        team.name = input.name.clone();
        team.short_name = input.short_name.clone();
        team.city = input.city.clone();
        team.stadium = input.stadium.clone();
        team.founded_year = input.founded_year;
        team.logo_url = input.logo_url.clone();
        team.updated_at = now();
        Ok(Some(team.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| t.id != id);
        Ok(rows.len() != before)
    }

    async fn list(&self, filter: &TeamFilter, page: PageRequest) -> anyhow::Result<Page<Team>> {
        let mut all: Vec<Team> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| filter.name.as_deref().is_none_or(|n| contains_ci(&t.name, n)))
            .filter(|t| {
                filter
                    .city
                    .as_deref()
                    .is_none_or(|c| t.city.as_deref().is_some_and(|tc| tc.eq_ignore_ascii_case(c)))
            })
            .cloned()
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Page::from_slice(all, page))
    }
}

#[derive(Default)]
pub struct InMemoryPlayers {
    rows: Mutex<Vec<Player>>,
}

impl InMemoryPlayers {
    fn name_of(&self, id: Uuid) -> Option<(String, Option<Uuid>)> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .map(|p| (p.full_name(), p.team_id))
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayers {
    async fn create(&self, input: &PlayerInput) -> anyhow::Result<Player> {
        let player = Player {
            id: Uuid::new_v4(),
            team_id: input.team_id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            position: input.position,
            shirt_number: input.shirt_number,
            nationality: input.nationality.clone(),
            date_of_birth: input.date_of_birth,
            created_at: now(),
            updated_at: now(),
        };
        self.rows.lock().unwrap().push(player.clone());
        Ok(player)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Player>> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: Uuid, input: &PlayerInput) -> anyhow::Result<Option<Player>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(p) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        p.team_id = input.team_id;
        p.first_name = input.first_name.clone();
        p.last_name = input.last_name.clone();
        p.position = input.position;
        p.shirt_number = input.shirt_number;
        p.nationality = input.nationality.clone();
        p.date_of_birth = input.date_of_birth;
        p.updated_at = now();
        Ok(Some(p.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }

    async fn list(
        &self,
        filter: &PlayerFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Player>> {
        let mut all: Vec<Player> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| filter.team_id.is_none_or(|t| p.team_id == Some(t)))
            .filter(|p| filter.position.is_none_or(|pos| p.position == pos))
            .filter(|p| {
                filter.name.as_deref().is_none_or(|n| {
                    contains_ci(&p.first_name, n) || contains_ci(&p.last_name, n)
                })
            })
            .cloned()
            .collect();
        all.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then(a.first_name.cmp(&b.first_name))
        });
        Ok(Page::from_slice(all, page))
    }

    async fn find_by_shirt(
        &self,
        team_id: Uuid,
        shirt_number: i32,
    ) -> anyhow::Result<Option<Player>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.team_id == Some(team_id) && p.shirt_number == Some(shirt_number))
            .cloned())
    }

    async fn release_team(&self, team_id: Uuid) -> anyhow::Result<u64> {
        let mut released = 0;
        for p in self.rows.lock().unwrap().iter_mut() {
            if p.team_id == Some(team_id) {
                p.team_id = None;
                released += 1;
            }
        }
        Ok(released)
    }
}

#[derive(Default)]
pub struct InMemorySeasons {
    rows: Mutex<Vec<Season>>,
}

#[async_trait]
impl SeasonRepository for InMemorySeasons {
    async fn create(&self, input: &SeasonInput) -> anyhow::Result<Season> {
        let season = Season {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            is_current: input.is_current,
            created_at: now(),
            updated_at: now(),
        };
        self.rows.lock().unwrap().push(season.clone());
        Ok(season)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Season>> {
        Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Season>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn update(&self, id: Uuid, input: &SeasonInput) -> anyhow::Result<Option<Season>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(s) = rows.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        s.name = input.name.clone();
        s.start_date = input.start_date;
        s.end_date = input.end_date;
        s.is_current = input.is_current;
        s.updated_at = now();
        Ok(Some(s.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok(rows.len() != before)
    }

    async fn list(&self, page: PageRequest) -> anyhow::Result<Page<Season>> {
        let mut all = self.rows.lock().unwrap().clone();
        all.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(Page::from_slice(all, page))
    }

    async fn current(&self) -> anyhow::Result<Option<Season>> {
        Ok(self.rows.lock().unwrap().iter().find(|s| s.is_current).cloned())
    }

    async fn mark_current(&self, id: Uuid) -> anyhow::Result<()> {
        for s in self.rows.lock().unwrap().iter_mut() {
            s.is_current = s.id == id;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryMatches {
    rows: Mutex<Vec<Match>>,
}

impl InMemoryMatches {
    fn season_of(&self, match_id: Uuid) -> Option<Uuid> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == match_id)
            .map(|m| m.season_id)
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatches {
    async fn create(&self, input: &MatchInput) -> anyhow::Result<Match> {
        let m = Match {
            id: Uuid::new_v4(),
            season_id: input.season_id,
            home_team_id: input.home_team_id,
            away_team_id: input.away_team_id,
            kickoff_at: input.kickoff_at,
            venue: input.venue.clone(),
            status: input.status,
            home_score: input.home_score,
            away_score: input.away_score,
            created_at: now(),
            updated_at: now(),
        };
        self.rows.lock().unwrap().push(m.clone());
        Ok(m)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Match>> {
        Ok(self.rows.lock().unwrap().iter().find(|m| m.id == id).cloned())
    }

    async fn update(&self, id: Uuid, input: &MatchInput) -> anyhow::Result<Option<Match>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(m) = rows.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        m.season_id = input.season_id;
        m.home_team_id = input.home_team_id;
        m.away_team_id = input.away_team_id;
        m.kickoff_at = input.kickoff_at;
        m.venue = input.venue.clone();
        m.status = input.status;
        m.home_score = input.home_score;
        m.away_score = input.away_score;
        m.updated_at = now();
        Ok(Some(m.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|m| m.id != id);
        Ok(rows.len() != before)
    }

    async fn list(&self, filter: &MatchFilter, page: PageRequest) -> anyhow::Result<Page<Match>> {
        let mut all: Vec<Match> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| filter.season_id.is_none_or(|s| m.season_id == s))
            .filter(|m| filter.team_id.is_none_or(|t| m.involves(t)))
            .filter(|m| filter.status.is_none_or(|s| m.status == s))
            .cloned()
            .collect();
        all.sort_by(|a, b| a.kickoff_at.cmp(&b.kickoff_at));
        Ok(Page::from_slice(all, page))
    }

    async fn list_for_season(&self, season_id: Uuid) -> anyhow::Result<Vec<Match>> {
        let mut all: Vec<Match> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.season_id == season_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| a.kickoff_at.cmp(&b.kickoff_at));
        Ok(all)
    }

    async fn count_for_team(&self, team_id: Uuid) -> anyhow::Result<i64> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.involves(team_id))
            .count() as i64)
    }

    async fn count_for_season(&self, season_id: Uuid) -> anyhow::Result<i64> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.season_id == season_id)
            .count() as i64)
    }
}

pub struct InMemoryGoals {
    rows: Mutex<Vec<Goal>>,
    matches: Arc<InMemoryMatches>,
    players: Arc<InMemoryPlayers>,
}

impl InMemoryGoals {
    pub fn new(matches: Arc<InMemoryMatches>, players: Arc<InMemoryPlayers>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            matches,
            players,
        }
    }
}

#[async_trait]
impl GoalRepository for InMemoryGoals {
    async fn create(&self, match_id: Uuid, input: &GoalInput) -> anyhow::Result<Goal> {
        let goal = Goal {
            id: Uuid::new_v4(),
            match_id,
            player_id: input.player_id,
            team_id: input.team_id,
            minute: input.minute,
            own_goal: input.own_goal,
            created_at: now(),
        };
        self.rows.lock().unwrap().push(goal.clone());
        Ok(goal)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Goal>> {
        Ok(self.rows.lock().unwrap().iter().find(|g| g.id == id).cloned())
    }

    async fn list_for_match(&self, match_id: Uuid) -> anyhow::Result<Vec<Goal>> {
        let mut all: Vec<Goal> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.match_id == match_id)
            .cloned()
            .collect();
        all.sort_by_key(|g| g.minute);
        Ok(all)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|g| g.id != id);
        Ok(rows.len() != before)
    }

    async fn delete_for_match(&self, match_id: Uuid) -> anyhow::Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|g| g.match_id != match_id);
        Ok((before - rows.len()) as u64)
    }

    async fn count_for_player(&self, player_id: Uuid) -> anyhow::Result<i64> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.player_id == player_id)
            .count() as i64)
    }

    async fn top_scorers(&self, season_id: Uuid, limit: i64) -> anyhow::Result<Vec<ScorerTally>> {
        let goals = self.rows.lock().unwrap().clone();
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for g in goals.iter().filter(|g| !g.own_goal) {
            if self.matches.season_of(g.match_id) == Some(season_id) {
                *counts.entry(g.player_id).or_default() += 1;
            }
        }
        let mut out: Vec<ScorerTally> = counts
            .into_iter()
            .map(|(player_id, goals)| {
                let (player_name, team_id) = self
                    .players
                    .name_of(player_id)
                    .unwrap_or_else(|| (player_id.to_string(), None));
                ScorerTally {
                    player_id,
                    player_name,
                    team_id,
                    goals,
                }
            })
            .collect();
        out.sort_by(|a, b| b.goals.cmp(&a.goals).then(a.player_name.cmp(&b.player_name)));
        out.truncate(limit.max(0) as usize);
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    pub fn snapshot(&self, id: Uuid) -> Option<User> {
        self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    /// Overwrites a stored row directly, for arranging test state.
    pub fn put(&self, user: &User) {
        if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|u| u.id == user.id) {
            *row = user.clone();
        }
    }

    fn modify<T>(&self, id: Uuid, f: impl FnOnce(&mut User) -> T) -> Option<T> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|u| u.id == id)?;
        let out = f(row);
        row.updated_at = now();
        Some(out)
    }

    pub fn id_of(&self, email: &str) -> Uuid {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.id)
            .unwrap_or_else(|| panic!("no user {email}"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<User> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            return Err(UniqueViolation("email is already registered".into()).into());
        }
        let row = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            password_hash: user.password_hash.clone(),
            email_verified: user.email_verified,
            verification_token_hash: None,
            verification_expires_at: None,
            reset_token_hash: None,
            reset_expires_at: None,
            failed_login_attempts: 0,
            locked_until: None,
            google_subject: user.google_subject.clone(),
            is_active: true,
            last_login_at: None,
            created_at: now(),
            updated_at: now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.snapshot(id))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_google_subject(&self, subject: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.google_subject.as_deref() == Some(subject))
            .cloned())
    }

    async fn find_by_verification_token(&self, token_hash: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.verification_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.reset_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn list_users(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> anyhow::Result<Page<User>> {
        let mut all: Vec<User> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|u| {
                search.is_none_or(|s| contains_ci(&u.email, s) || contains_ci(&u.display_name, s))
            })
            .cloned()
            .collect();
        all.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(Page::from_slice(all, page))
    }

    async fn record_login(&self, id: Uuid, at: Timestamp) -> anyhow::Result<Option<User>> {
        Ok(self
            .modify(id, |u| {
                if !u.is_active {
                    return None;
                }
                u.last_login_at = Some(at);
                u.clear_lockout();
                Some(u.clone())
            })
            .flatten())
    }

    async fn record_failed_login(
        &self,
        id: Uuid,
        max_attempts: i32,
        lock_until: Timestamp,
    ) -> anyhow::Result<Option<Timestamp>> {
        Ok(self
            .modify(id, |u| u.register_failed_login(max_attempts, lock_until))
            .flatten())
    }

    async fn clear_lockout(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.modify(id, |u| u.clear_lockout()).is_some())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> anyhow::Result<bool> {
        Ok(self.modify(id, |u| u.is_active = active).is_some())
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        Ok(self
            .modify(id, |u| u.password_hash = Some(password_hash.to_string()))
            .is_some())
    }

    async fn set_verification_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> anyhow::Result<bool> {
        Ok(self
            .modify(id, |u| {
                u.verification_token_hash = Some(token_hash.to_string());
                u.verification_expires_at = Some(expires_at);
            })
            .is_some())
    }

    async fn mark_email_verified(&self, id: Uuid, token_hash: &str) -> anyhow::Result<bool> {
        Ok(self
            .modify(id, |u| {
                if u.verification_token_hash.as_deref() != Some(token_hash) {
                    return false;
                }
                u.email_verified = true;
                u.verification_token_hash = None;
                u.verification_expires_at = None;
                true
            })
            .unwrap_or(false))
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> anyhow::Result<bool> {
        Ok(self
            .modify(id, |u| {
                u.reset_token_hash = Some(token_hash.to_string());
                u.reset_expires_at = Some(expires_at);
            })
            .is_some())
    }

    async fn reset_password(
        &self,
        id: Uuid,
        token_hash: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        Ok(self
            .modify(id, |u| {
                if u.reset_token_hash.as_deref() != Some(token_hash) {
                    return false;
                }
                u.password_hash = Some(password_hash.to_string());
                u.reset_token_hash = None;
                u.reset_expires_at = None;
                u.clear_lockout();
                true
            })
            .unwrap_or(false))
    }

    async fn link_google_subject(&self, id: Uuid, subject: &str) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|u| u.id != id && u.google_subject.as_deref() == Some(subject))
        {
            return Err(UniqueViolation("this Google account is linked to another user".into()).into());
        }
        match rows.iter_mut().find(|u| u.id == id) {
            Some(u) => {
                u.google_subject = Some(subject.to_string());
                u.email_verified = true;
                u.updated_at = now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Session store that counts mutating calls so tests can assert "no writes".
#[derive(Default)]
pub struct InMemorySessions {
    rows: Mutex<Vec<UserSession>>,
    writes: AtomicUsize,
}

impl InMemorySessions {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self, id: Uuid) -> Option<UserSession> {
        self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned()
    }

    pub fn all_for_user(&self, user_id: Uuid) -> Vec<UserSession> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Moves a session's expiry, bypassing the write counter.
    pub fn force_expiry(&self, id: Uuid, expires_at: Timestamp) {
        if let Some(s) = self.rows.lock().unwrap().iter_mut().find(|s| s.id == id) {
            s.expires_at = expires_at;
        }
    }

    fn bump(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn close(s: &mut UserSession, reason: TerminationReason, at: Timestamp) {
        s.is_active = false;
        s.terminated_at = Some(at);
        s.termination_reason = Some(reason);
    }
}

#[async_trait]
impl SessionRepository for InMemorySessions {
    async fn create_session(&self, session: &NewSession) -> anyhow::Result<UserSession> {
        self.bump();
        let at = now();
        let row = UserSession {
            id: Uuid::new_v4(),
            user_id: session.user_id,
            refresh_token_hash: session.refresh_token_hash.clone(),
            created_at: at,
            expires_at: session.expires_at,
            last_activity_at: at,
            is_active: true,
            terminated_at: None,
            termination_reason: None,
            device_id: session.device_id.clone(),
            ip_address: session.ip_address.clone(),
            user_agent: session.user_agent.clone(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> anyhow::Result<Option<UserSession>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.refresh_token_hash == token_hash)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserSession>> {
        Ok(self.snapshot(id))
    }

    async fn list_active_for_user(
        &self,
        user_id: Uuid,
        now: Timestamp,
    ) -> anyhow::Result<Vec<UserSession>> {
        let mut out: Vec<UserSession> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active && s.expires_at > now)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn rotate(
        &self,
        id: Uuid,
        current_hash: &str,
        new_hash: &str,
        at: Timestamp,
    ) -> anyhow::Result<bool> {
        self.bump();
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|s| s.id == id && s.is_active && s.refresh_token_hash == current_hash)
        {
            Some(s) => {
                s.refresh_token_hash = new_hash.to_string();
                s.last_activity_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn terminate(
        &self,
        id: Uuid,
        reason: TerminationReason,
        at: Timestamp,
    ) -> anyhow::Result<bool> {
        self.bump();
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|s| s.id == id && s.is_active) {
            Some(s) => {
                Self::close(s, reason, at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn terminate_all_for_user(
        &self,
        user_id: Uuid,
        reason: TerminationReason,
        at: Timestamp,
        except: Option<Uuid>,
    ) -> anyhow::Result<u64> {
        self.bump();
        let mut n = 0;
        for s in self.rows.lock().unwrap().iter_mut() {
            if s.user_id == user_id && s.is_active && Some(s.id) != except {
                Self::close(s, reason, at);
                n += 1;
            }
        }
        Ok(n)
    }

    async fn terminate_for_device(
        &self,
        user_id: Uuid,
        device_id: &str,
        reason: TerminationReason,
        at: Timestamp,
    ) -> anyhow::Result<u64> {
        self.bump();
        let mut n = 0;
        for s in self.rows.lock().unwrap().iter_mut() {
            if s.user_id == user_id && s.is_active && s.device_id.as_deref() == Some(device_id) {
                Self::close(s, reason, at);
                n += 1;
            }
        }
        Ok(n)
    }

    async fn expire_stale(&self, now: Timestamp) -> anyhow::Result<u64> {
        self.bump();
        let mut n = 0;
        for s in self.rows.lock().unwrap().iter_mut() {
            if s.is_active && s.expires_at <= now {
                Self::close(s, TerminationReason::Expired, now);
                n += 1;
            }
        }
        Ok(n)
    }
}

#[derive(Default)]
pub struct InMemoryRoles {
    rows: Mutex<Vec<Role>>,
    links: Mutex<HashMap<Uuid, Vec<Uuid>>>,
}

impl InMemoryRoles {
    /// Store pre-seeded with the system roles.
    pub fn seeded() -> Self {
        let store = Self::default();
        {
            let mut rows = store.rows.lock().unwrap();
            for (name, description, permissions) in system_roles() {
                rows.push(Role {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    permissions,
                    is_system: true,
                    created_at: now(),
                    updated_at: now(),
                });
            }
        }
        store
    }

    pub fn id_of(&self, name: &str) -> Uuid {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .map(|r| r.id)
            .expect("role present")
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoles {
    async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
        permissions: &[Permission],
        is_system: bool,
    ) -> anyhow::Result<Role> {
        let role = Role {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            permissions: permissions.to_vec(),
            is_system,
            created_at: now(),
            updated_at: now(),
        };
        self.rows.lock().unwrap().push(role.clone());
        Ok(role)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Role>> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Role>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn find_by_names(&self, names: &[String]) -> anyhow::Result<Vec<Role>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| names.iter().any(|n| r.name.eq_ignore_ascii_case(n)))
            .cloned()
            .collect())
    }

    async fn list_roles(&self) -> anyhow::Result<Vec<Role>> {
        let mut all = self.rows.lock().unwrap().clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update_role(&self, role: &Role) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id == role.id) {
            Some(row) => {
                *row = role.clone();
                row.updated_at = now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_role(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        for ids in self.links.lock().unwrap().values_mut() {
            ids.retain(|r| *r != id);
        }
        Ok(rows.len() != before)
    }

    async fn roles_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Role>> {
        let ids = self
            .links
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn set_user_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> anyhow::Result<()> {
        self.links
            .lock()
            .unwrap()
            .insert(user_id, role_ids.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAudit {
    rows: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAudit {
    pub fn actions(&self) -> Vec<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.action.clone())
            .collect()
    }
}

fn audit_matches(filter: &AuditFilter, entry: &AuditEntry) -> bool {
    filter.actor_id.is_none_or(|id| entry.actor_id == Some(id))
        && filter
            .action_prefix
            .as_deref()
            .is_none_or(|p| entry.action.starts_with(p))
        && filter
            .entity_type
            .as_deref()
            .is_none_or(|t| entry.entity_type.as_deref() == Some(t))
        && filter
            .entity_id
            .as_deref()
            .is_none_or(|i| entry.entity_id.as_deref() == Some(i))
        && filter.outcome.is_none_or(|o| entry.outcome == o)
        && filter.from.is_none_or(|from| entry.occurred_at >= from)
        && filter.to.is_none_or(|to| entry.occurred_at <= to)
}

#[async_trait]
impl AuditRepository for InMemoryAudit {
    async fn append(&self, entry: &NewAuditEntry) -> anyhow::Result<AuditEntry> {
        let row = AuditEntry {
            id: Uuid::new_v4(),
            occurred_at: now(),
            actor_id: entry.actor_id,
            actor_email: entry.actor_email.clone(),
            action: entry.action.clone(),
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id.clone(),
            outcome: entry.outcome,
            ip_address: entry.ip_address.clone(),
            user_agent: entry.user_agent.clone(),
            details: entry.details.clone(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<AuditEntry>> {
        let mut all: Vec<AuditEntry> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|e| audit_matches(filter, e))
            .cloned()
            .collect();
        all.reverse();
        Ok(Page::from_slice(all, page))
    }
}

// ---------------------------------------------------------------------------
// Gateways
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Pulls the `token=` query value out of the last mail sent to `to`.
    pub fn last_token_for(&self, to: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let body = &sent.iter().rev().find(|m| m.to == to)?.text_body;
        let start = body.find("token=")? + "token=".len();
        let rest = &body[start..];
        let end = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        urlencoding::decode(&rest[..end]).ok().map(|s| s.into_owned())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Accepts exactly the tokens registered with `allow`.
#[derive(Default)]
pub struct StubGoogleVerifier {
    known: Mutex<HashMap<String, GoogleIdentity>>,
}

impl StubGoogleVerifier {
    pub fn allow(&self, token: &str, identity: GoogleIdentity) {
        self.known
            .lock()
            .unwrap()
            .insert(token.to_string(), identity);
    }
}

#[async_trait]
impl GoogleTokenVerifier for StubGoogleVerifier {
    async fn verify(&self, id_token: &str) -> anyhow::Result<Option<GoogleIdentity>> {
        Ok(self.known.lock().unwrap().get(id_token).cloned())
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub const TEST_JWT_SECRET: &str = "test-secret-key-min-32-characters-long";
pub const TEST_GOOGLE_CLIENT_ID: &str = "test-client.apps.googleusercontent.com";

pub fn test_settings() -> AuthSettings {
    AuthSettings {
        lockout_max_attempts: 3,
        google_client_id: Some(TEST_GOOGLE_CLIENT_ID.to_string()),
        ..AuthSettings::default()
    }
}

pub fn test_issuer() -> JwtAccessTokenIssuer {
    JwtAccessTokenIssuer::new(TEST_JWT_SECRET, "league-api-test", 900)
}

/// Every in-memory store behind one handle, plus an `AppContext` wired to them.
pub struct TestWorld {
    pub teams: Arc<InMemoryTeams>,
    pub players: Arc<InMemoryPlayers>,
    pub seasons: Arc<InMemorySeasons>,
    pub matches: Arc<InMemoryMatches>,
    pub goals: Arc<InMemoryGoals>,
    pub users: Arc<InMemoryUsers>,
    pub sessions: Arc<InMemorySessions>,
    pub roles: Arc<InMemoryRoles>,
    pub audit: Arc<InMemoryAudit>,
    pub mailer: Arc<RecordingMailer>,
    pub google: Arc<StubGoogleVerifier>,
    pub issuer: Arc<JwtAccessTokenIssuer>,
    pub settings: AuthSettings,
}

impl TestWorld {
    pub fn new() -> Self {
        let matches = Arc::new(InMemoryMatches::default());
        let players = Arc::new(InMemoryPlayers::default());
        Self {
            teams: Arc::new(InMemoryTeams::default()),
            goals: Arc::new(InMemoryGoals::new(matches.clone(), players.clone())),
            players,
            seasons: Arc::new(InMemorySeasons::default()),
            matches,
            users: Arc::new(InMemoryUsers::default()),
            sessions: Arc::new(InMemorySessions::default()),
            roles: Arc::new(InMemoryRoles::seeded()),
            audit: Arc::new(InMemoryAudit::default()),
            mailer: Arc::new(RecordingMailer::default()),
            google: Arc::new(StubGoogleVerifier::default()),
            issuer: Arc::new(test_issuer()),
            settings: test_settings(),
        }
    }

    pub fn context(&self) -> AppContext {
        let services = AppServices::new(
            self.teams.clone(),
            self.players.clone(),
            self.seasons.clone(),
            self.matches.clone(),
            self.goals.clone(),
            self.users.clone(),
            self.sessions.clone(),
            self.roles.clone(),
            self.audit.clone(),
            self.mailer.clone(),
            self.google.clone(),
            self.issuer.clone(),
        );
        AppContext::new(Config::for_tests(), self.settings.clone(), services)
    }

    /// Creates a verified user with a password and the given role names.
    pub async fn user_with_roles(&self, email: &str, password: &str, roles: &[&str]) -> User {
        let hash = crate::application::services::passwords::hash_password(password).unwrap();
        let user = self
            .users
            .create_user(&NewUser {
                email: email.to_string(),
                display_name: email.split('@').next().unwrap_or(email).to_string(),
                password_hash: Some(hash),
                email_verified: true,
                google_subject: None,
            })
            .await
            .unwrap();
        let ids: Vec<Uuid> = roles.iter().map(|r| self.roles.id_of(r)).collect();
        self.roles.set_user_roles(user.id, &ids).await.unwrap();
        user
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

pub const TEST_PASSWORD: &str = "correct-horse-9";

/// Creates a user with `roles` and returns an access token for a fresh session.
pub async fn login_as(world: &TestWorld, email: &str, roles: &[&str]) -> String {
    use crate::application::dto::auth::ClientContext;
    use crate::application::use_cases::auth::issue_session::IssueSession;

    let user = world.user_with_roles(email, TEST_PASSWORD, roles).await;
    IssueSession {
        users: world.users.as_ref(),
        sessions: world.sessions.as_ref(),
        roles: world.roles.as_ref(),
        tokens: world.issuer.as_ref(),
        settings: &world.settings,
    }
    .execute(user, &ClientContext::default())
    .await
    .unwrap()
    .access_token
}

/// Runs one request through `app` and decodes the JSON envelope.
pub async fn send(
    app: &axum::Router,
    method: axum::http::Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use tower::ServiceExt;

    let mut req = axum::http::Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => req
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json.to_string())),
        None => req.body(axum::body::Body::empty()),
    }
    .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
