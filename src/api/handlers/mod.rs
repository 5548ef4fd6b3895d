pub mod classes;
pub mod participants;
pub mod payments;
pub mod root;
