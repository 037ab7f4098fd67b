pub mod application;
pub mod auth;
pub mod company;
pub mod company_portal;
pub mod institution;
pub mod internship;
pub mod media;
pub mod review;
