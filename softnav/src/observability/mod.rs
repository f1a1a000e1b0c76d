//! Observability utilities.

mod logging;
mod timing;

pub use logging::{init_tracing, try_init_tracing};
pub use timing::{NavigationTimer, NavigationTiming};
