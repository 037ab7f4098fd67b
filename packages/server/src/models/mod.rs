pub mod application;
pub mod auth;
pub mod company;
pub mod institution;
pub mod internship;
pub mod review;
pub mod shared;
pub mod student;
