//! HTTP request handlers.

mod health;
mod links;
mod redirect;
mod stats;

pub use health::health_handler;
pub use links::create_link_handler;
pub use redirect::redirect_handler;
pub use stats::{access_check_handler, url_stats_handler};
