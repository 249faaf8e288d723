/*
* Analyst API landing endpoints: the endpoint listing and the teapot.
*/

pub mod handler;
pub mod routes;

pub use routes::index_routes;
