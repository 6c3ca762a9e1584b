pub mod alerts;
pub mod auth;
pub mod plants;
pub mod readings;
pub mod sensors;
pub mod users;

pub mod utils;
