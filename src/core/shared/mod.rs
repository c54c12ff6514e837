pub mod schema;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod utils;

pub use schema::*;

pub use utils::{build_slug, create_conn, html_escape, slugify, unique_suffix, DbPool};
