pub mod goal;
pub mod matches;
pub mod player;
pub mod season;
pub mod standings;
pub mod team;
