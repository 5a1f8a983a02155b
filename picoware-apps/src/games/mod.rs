//! Games

pub mod snake;
