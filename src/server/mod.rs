pub mod handlers;
pub mod router;


pub use router::router;
