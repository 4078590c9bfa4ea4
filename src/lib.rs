pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod sampling;
pub mod state;
pub mod upload;
pub mod views;
