pub mod prelude;

pub mod intern;
pub mod reward;
