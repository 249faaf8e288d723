/*
* Deliverable files as seen by a constituent. SLA-only files are listed for
* SLA organizations only.
*/

pub mod handler;
pub mod routes;

pub use routes::file_routes;
