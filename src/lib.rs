pub mod api;
pub mod assets;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod model;
pub mod routes;
