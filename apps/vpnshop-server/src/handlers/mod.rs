pub mod health;
pub mod orders;
pub mod plans;
pub mod webhook;
