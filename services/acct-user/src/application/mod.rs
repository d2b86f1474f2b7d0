mod service;

pub use service::{LoginResponse, RegisterRequest, UserAccountService, UserDto};
