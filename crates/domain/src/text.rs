//! Small string helpers shared by the truncation code paths.

/// Largest index `<= max` that falls on a UTF-8 char boundary of `s`.
pub fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Prefix of `s` holding at most `max` bytes, never splitting a char.
pub fn clip(s: &str, max: usize) -> &str {
    &s[..floor_char_boundary(s, max)]
}
