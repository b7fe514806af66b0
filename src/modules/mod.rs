pub mod movie;
pub mod upload;
