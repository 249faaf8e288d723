/*
* Portal user administration, limited to users of the caller's organization tree.
*/

pub mod handler;
pub mod routes;

pub use routes::user_routes;
