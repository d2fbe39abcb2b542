pub mod health;
pub mod panels;
