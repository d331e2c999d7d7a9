pub mod extractors;
pub mod jwt;
pub mod password;

pub use extractors::{AuthEmployee, AuthUser};
pub use jwt::{JwtKeys, TokenKind};
