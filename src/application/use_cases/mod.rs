pub mod audit;
pub mod auth;
pub mod matches;
pub mod players;
pub mod roles;
pub mod seasons;
pub mod stats;
pub mod teams;
pub mod users;
