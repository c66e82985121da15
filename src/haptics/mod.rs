pub mod ahap;
pub mod classify;
pub mod event;
pub mod features;
pub mod generate;
pub mod stem;
