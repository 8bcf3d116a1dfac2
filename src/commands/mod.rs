pub mod bank;
pub mod daily;
pub mod slots;
