#![allow(unused_imports)]

pub use super::intern::Entity as Intern;
pub use super::reward::Entity as Reward;
