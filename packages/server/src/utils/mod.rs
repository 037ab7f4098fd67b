pub mod access;
pub mod filter;
pub mod hash;
pub mod jwt;
pub mod media;
pub mod present;
pub mod tags;
