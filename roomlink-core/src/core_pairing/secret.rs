//! Lock token generation

use rand::Rng;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a generated lock token
pub const LOCK_LEN: usize = 3;

/// Generate a random lock token
///
/// Three characters from a 36-symbol charset give ~46k combinations, enough
/// to make opportunistic guessing impractical within one rotation interval.
/// Collision with the previous value is possible but statistically
/// negligible.
pub fn generate_lock() -> String {
    let mut rng = rand::rng();
    (0..LOCK_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
