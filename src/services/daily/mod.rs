pub mod gate;
pub mod reset;
pub mod schedule;
