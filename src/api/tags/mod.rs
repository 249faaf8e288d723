/*
* Tag management for analysts.
*/

pub mod handler;
pub mod routes;

pub use routes::tag_routes;
