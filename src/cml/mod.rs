pub mod client;
pub mod job_history;
pub mod resources;
pub mod types;

#[cfg(test)]
mod fake;

pub use client::CmlClient;
