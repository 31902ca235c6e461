/// Greatest common divisor of two signed integers, returned as an absolute value.
/// `gcd_signed(0, 0)` is `0`, and `gcd_signed(0, n)` is `|n|`.
pub fn gcd_signed(mut a: i64, mut b: i64) -> u64 {
    let mut c;
    while a != 0 {
        c = a;
        // only wraps when i64::MIN % -1 and that still yields 0
        a = b.wrapping_rem(a);
        b = c;
    }
    b.unsigned_abs()
}

/// Compute `base^exp` with 64-bit wrap-around on overflow.
pub fn wrapping_pow_i64(mut base: i64, mut exp: u64) -> i64 {
    let mut acc: i64 = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc.wrapping_mul(base);
        }
        exp >>= 1;
        if exp > 0 {
            base = base.wrapping_mul(base);
        }
    }
    acc
}
