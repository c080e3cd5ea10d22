pub mod documents;
pub mod health;
pub mod taxes;
