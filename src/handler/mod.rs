pub mod auth;
pub mod category;
pub mod dashboard;
pub mod message;
pub mod public;
pub mod setting;
pub mod tour;
pub mod upload;
