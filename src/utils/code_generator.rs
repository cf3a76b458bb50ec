//! Short code generation.

use rand::distr::Alphanumeric;
use rand::Rng;

/// Length of generated short codes.
pub const CODE_LENGTH: usize = 5;

/// Generates a random short code.
///
/// Codes are mixed-case alphanumeric (`[A-Za-z0-9]`), 5 characters long,
/// drawn from the thread-local RNG. Uniqueness is NOT guaranteed here; the
/// service layer retries against the durable map on collision.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 5);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}
