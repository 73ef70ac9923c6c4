//! EBCDIC signed-overpunch numerics.
//!
//! A negative zoned number carries its sign in the last column: the final
//! digit is replaced by a designator character that encodes both the minus
//! sign and the digit itself. Positive numbers are left as plain digits.
//!
//! Designators used by the legacy feeds:
//! - `ü` → -0
//! - `J`..`R` → -1..-9
//!
//! Both directions are pure string transforms. Scale is implied: with two
//! decimal places `"12345"` reads as `123.45` and no point is ever stored.

/// Designator for each digit, indexed by digit value.
const NEGATIVE_DESIGNATORS: [char; 10] = ['ü', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R'];

/// Maps a designator character back to the digit it replaces.
pub fn designator_digit(ch: char) -> Option<char> {
    NEGATIVE_DESIGNATORS
        .iter()
        .position(|&d| d == ch)
        .and_then(|digit| char::from_digit(digit as u32, 10))
}

/// Designator character standing in for a negative final `digit`.
pub fn digit_designator(digit: char) -> Option<char> {
    digit
        .to_digit(10)
        .map(|d| NEGATIVE_DESIGNATORS[d as usize])
}

/// Decodes an overpunched numeral into a plain decimal string.
///
/// Empty input reads as zero. Leading zeros are dropped, the numeral is
/// re-padded so that at least one digit precedes the implied decimal point,
/// and the point is inserted `decimals` places from the right.
///
/// Characters outside the designator table are passed through untouched;
/// rejecting them is left to the numeric parse that follows.
pub fn decode(text: &str, decimals: usize) -> String {
    let mut digits: Vec<char> = if text.is_empty() {
        vec!['0']
    } else {
        text.chars().collect()
    };

    let mut negative = false;
    if let Some(last) = digits.last_mut() {
        if let Some(digit) = designator_digit(*last) {
            negative = true;
            *last = digit;
        }
    }

    let mut numeral = strip_leading_zeros(&digits);
    let len = numeral.chars().count();
    if len < decimals + 1 {
        numeral.insert_str(0, &"0".repeat(decimals + 1 - len));
    }

    if decimals > 0 {
        let split = numeral.chars().count() - decimals;
        let (int_part, frac_part) = split_at_char(&numeral, split);
        numeral = format!("{int_part}.{frac_part}");
    }

    if negative {
        numeral.insert(0, '-');
    }
    numeral
}

/// Encodes a plain decimal string into its overpunched form.
///
/// With `decimals > 0` the fraction is right-padded or truncated to exactly
/// `decimals` digits and the point removed. With `decimals == 0` anything
/// after a point is dropped. A negative value has its last digit replaced by
/// the matching designator; `-0` therefore encodes to `ü`.
pub fn encode(text: &str, decimals: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let (negative, magnitude) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (int_part, frac_part) = match magnitude.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (magnitude, ""),
    };

    let mut joined = String::from(int_part);
    if decimals > 0 {
        joined.extend(frac_part.chars().chain(std::iter::repeat('0')).take(decimals));
    }

    let digits: Vec<char> = joined.chars().collect();
    let mut numeral = if digits.is_empty() {
        String::from("0")
    } else {
        strip_leading_zeros(&digits)
    };

    if negative {
        if let Some(last) = numeral.pop() {
            match digit_designator(last) {
                Some(designator) => numeral.push(designator),
                None => {
                    // Not a digit: leave the value as given.
                    numeral.push(last);
                    numeral.insert(0, '-');
                }
            }
        }
    }
    numeral
}

/// Drops leading `'0'`s that are followed by another digit, so an all-zero
/// numeral keeps one zero and `0.5` stays intact.
fn strip_leading_zeros(digits: &[char]) -> String {
    let mut start = 0;
    while start + 1 < digits.len() && digits[start] == '0' && digits[start + 1].is_ascii_digit() {
        start += 1;
    }
    digits[start..].iter().collect()
}

fn split_at_char(s: &str, chars: usize) -> (&str, &str) {
    let byte = s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i);
    s.split_at(byte)
}
