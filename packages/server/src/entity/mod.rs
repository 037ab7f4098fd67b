pub mod application;
pub mod company;
pub mod institution;
pub mod internship;
pub mod internship_institution;
pub mod review;
pub mod session;
pub mod student;
pub mod user;
