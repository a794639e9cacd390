pub mod periodic;
pub mod persistence;
pub mod refill;
