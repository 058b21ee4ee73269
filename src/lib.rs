pub mod auth;
pub mod config;
pub mod grading;
pub mod input;
pub mod report;
pub mod sheets;

#[cfg(test)]
mod test_http;
