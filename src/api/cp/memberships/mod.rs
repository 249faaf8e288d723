/*
* Organization memberships and the roles they grant. The caller may manage
* memberships of its own organization tree only.
*/

pub mod handler;
pub mod routes;

pub use routes::membership_routes;
