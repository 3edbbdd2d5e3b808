pub mod period;
pub mod provider;
pub mod status;
