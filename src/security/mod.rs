pub mod password;

pub use password::{check_password, hash_password, verify_password, PasswordHasher2, PasswordIssue};
