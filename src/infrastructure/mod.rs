pub mod db;
pub mod google;
pub mod mail;
pub mod security;
