pub mod events;
pub mod repository;
pub mod services;
pub mod user;
pub mod value_objects;
pub mod verification;

pub use events::{AccountEvent, LoginEvent, RegistrationEvent};
pub use repository::UserRepository;
pub use services::{IssuedToken, PasswordHasher, TokenClaims, TokenIssuer};
pub use user::User;
pub use value_objects::Email;
pub use verification::{CodeGenerator, VerificationCode};
