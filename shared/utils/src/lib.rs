pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod cache;
pub mod summary;


pub use config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
pub use cache::*;
pub use summary::*;
