use chrono::{DateTime, Utc};
use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const SUFFIX_LEN: usize = 4;

/// Human-presentable booking number, e.g. `TRF-20260827-K7Q2`. Uniqueness
/// is enforced by the store on insert; the suffix alphabet drops the
/// ambiguous characters (0/O, 1/I).
pub fn booking_number(now: DateTime<Utc>) -> String {
    format!("TRF-{}-{}", now.format("%Y%m%d"), random_suffix())
}

/// Quote-request counterpart, e.g. `COT-20260827-M3XD`.
pub fn quote_number(now: DateTime<Utc>) -> String {
    format!("COT-{}-{}", now.format("%Y%m%d"), random_suffix())
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..SUFFIX_ALPHABET.len());
            SUFFIX_ALPHABET[idx] as char
        })
        .collect()
}
