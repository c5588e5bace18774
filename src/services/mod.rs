pub mod routes;
pub mod whois;

pub use routes::parse_prefixes;
pub use whois::{RouteRegistry, WhoisRegistry, query_whois};
