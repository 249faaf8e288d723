/*
* FQDNs of every constituent, for analysts.
*/

pub mod handler;
pub mod routes;

pub use routes::fqdn_routes;
