pub mod deal;
pub mod loan;
