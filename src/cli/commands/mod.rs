pub mod auth;
pub mod invite;
pub mod jobs;
pub mod onboard;
pub mod verify;
