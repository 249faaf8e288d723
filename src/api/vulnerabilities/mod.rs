/*
* Vulnerability reports for analysts.
*/

pub mod handler;
pub mod routes;

pub use routes::vulnerability_routes;
