pub mod machine;
pub mod payouts;
