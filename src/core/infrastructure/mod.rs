pub mod api_client;
pub mod cancellation;
pub mod fetch_options;
