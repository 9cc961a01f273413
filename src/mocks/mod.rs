//! Test double for the Auth Service.

pub mod mock_client;

pub use mock_client::MockAuthApi;
