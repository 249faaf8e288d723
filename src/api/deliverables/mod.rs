/*
* Deliverable types (CIMBL, CITAR, ...) for analysts.
*/

pub mod handler;
pub mod routes;

pub use routes::deliverable_routes;
