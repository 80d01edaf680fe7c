pub mod collection;
pub mod device;
pub mod device_interface;
pub mod device_system_status;
mod lenient;
pub mod session;
pub mod vmanage_connection;
