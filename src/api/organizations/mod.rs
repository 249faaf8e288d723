/*
* Constituent organization management for analysts.
*/

pub mod handler;
pub mod routes;

pub use routes::organization_routes;
