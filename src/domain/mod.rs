pub mod audit;
pub mod identity;
pub mod league;
pub mod pagination;
