use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "league.read")]
    LeagueRead,
    #[serde(rename = "league.write")]
    LeagueWrite,
    #[serde(rename = "users.read")]
    UsersRead,
    #[serde(rename = "users.manage")]
    UsersManage,
    #[serde(rename = "roles.manage")]
    RolesManage,
    #[serde(rename = "sessions.manage")]
    SessionsManage,
    #[serde(rename = "audit.read")]
    AuditRead,
}

impl Permission {
    pub const ALL: [Permission; 7] = [
        Permission::LeagueRead,
        Permission::LeagueWrite,
        Permission::UsersRead,
        Permission::UsersManage,
        Permission::RolesManage,
        Permission::SessionsManage,
        Permission::AuditRead,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Permission::LeagueRead => "league.read",
            Permission::LeagueWrite => "league.write",
            Permission::UsersRead => "users.read",
            Permission::UsersManage => "users.manage",
            Permission::RolesManage => "roles.manage",
            Permission::SessionsManage => "sessions.manage",
            Permission::AuditRead => "audit.read",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Permission::LeagueRead => "View teams, players, seasons, matches and stats",
            Permission::LeagueWrite => "Create, edit and delete league data",
            Permission::UsersRead => "View user accounts",
            Permission::UsersManage => "Assign roles, lock, unlock and deactivate users",
            Permission::RolesManage => "Create, edit and delete roles",
            Permission::SessionsManage => "Revoke other users' sessions",
            Permission::AuditRead => "Read the audit log",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Permission {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.code() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown permission: {s}"))
    }
}
