pub mod content;
pub mod message;
pub mod objectid;
pub mod tool;
