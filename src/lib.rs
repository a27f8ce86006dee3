pub mod agent;
pub mod conversation;
pub mod errors;
pub mod providers;
pub mod tools;
