//! Credential handling for user accounts.
//!
//! Passwords are stored only as Argon2id PHC strings. Login compares a submitted
//! password against the stored hash; no session or token is issued.

pub mod password;
