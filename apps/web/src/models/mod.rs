pub mod ranking;
pub mod upload;
