mod common;

mod applications;
mod auth;
mod listings;
mod reviews;
