pub mod calc;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;
