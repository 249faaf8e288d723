/*
* Deliverable files for analysts: registering uploaded files and listing them.
*/

pub mod handler;
pub mod routes;

pub use routes::file_routes;
