/*
* Customer portal endpoints. Every request acts for the organization named by
* the `CP-Organization-Id` header and only sees that organization's data, or
* the data of the organizations below it.
*/

pub mod access;
pub mod files;
pub mod handler;
pub mod memberships;
pub mod routes;
pub mod users;

pub use routes::cp_resource_routes;
