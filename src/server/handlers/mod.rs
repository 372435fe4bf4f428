pub mod documents;
pub mod export;
pub mod health;
pub mod research;
