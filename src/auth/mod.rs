pub mod extractors;
pub mod jwt;
pub mod otp;
pub mod password;
pub mod policy;
