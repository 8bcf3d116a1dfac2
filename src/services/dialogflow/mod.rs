pub mod actions;
pub mod client;
pub mod flow;
pub mod session;
