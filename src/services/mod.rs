pub mod generation;
pub mod presenter;
pub mod session;
pub mod wizard;
