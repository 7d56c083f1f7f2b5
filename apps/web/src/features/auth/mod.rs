pub(crate) mod client;
pub(crate) mod guards;
pub(crate) mod state;
pub(crate) mod types;
