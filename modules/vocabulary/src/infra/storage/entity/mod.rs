pub mod language;
pub mod translation;
pub mod user;
pub mod word;
