pub mod intern;
pub mod money;
