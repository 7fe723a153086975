pub mod core;
pub mod institute;
pub mod shell;
pub mod supervisors;
