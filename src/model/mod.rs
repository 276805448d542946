pub mod outcome;
pub mod session;
pub mod turn;
