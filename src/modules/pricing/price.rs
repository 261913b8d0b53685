//! Deterministic stand-in for a pricing service.
//!
//! The price is derived from a 32-bit rolling hash of the identifier text
//! exactly as typed. Two spellings of one ISBN (with and without hyphens)
//! can therefore price differently.

/// Lowest price the hash can produce.
pub const MIN_PRICE: u32 = 10;
/// Number of distinct prices, so the highest is `MIN_PRICE + PRICE_SPAN - 1`.
pub const PRICE_SPAN: u32 = 4990;

/// Base price for `identifier`, or `None` when no price is available.
pub fn price_for(identifier: &str) -> Option<u32> {
    let magnitude = identifier_hash(identifier).unsigned_abs();

    (magnitude % 2 == 0).then(|| MIN_PRICE + magnitude % PRICE_SPAN)
}

/// `hash = hash * 31 + unit` over UTF-16 code units, wrapping at 32 bits.
fn identifier_hash(identifier: &str) -> i32 {
    identifier.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_mul(31).wrapping_add(i32::from(unit))
    })
}
