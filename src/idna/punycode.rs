//! Punycode (RFC 3492) encoding and decoding for IDN labels.
//!
//! Labels carry the `xn--` ACE prefix elsewhere; these functions operate
//! on the bare bootstring form.

const BASE: u32 = 36;
const TMIN: u32 = 1;
const TMAX: u32 = 26;
const SKEW: u32 = 38;
const DAMP: u32 = 700;
const INITIAL_BIAS: u32 = 72;
const INITIAL_N: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PunycodeError;

fn adapt(mut delta: u32, num_points: u32, first_time: bool) -> u32 {
    delta /= if first_time { DAMP } else { 2 };
    delta += delta / num_points;
    let mut k = 0;
    while delta > ((BASE - TMIN) * TMAX) / 2 {
        delta /= BASE - TMIN;
        k += BASE;
    }
    k + (((BASE - TMIN + 1) * delta) / (delta + SKEW))
}

fn digit_value(byte: u8) -> Option<u32> {
    match byte {
        b'a'..=b'z' => Some(u32::from(byte - b'a')),
        b'A'..=b'Z' => Some(u32::from(byte - b'A')),
        b'0'..=b'9' => Some(u32::from(byte - b'0') + 26),
        _ => None,
    }
}

fn digit_char(digit: u32) -> char {
    debug_assert!(digit < BASE);
    if digit < 26 {
        (b'a' + digit as u8) as char
    } else {
        (b'0' + (digit - 26) as u8) as char
    }
}

/// Decode a bare Punycode label into its code points.
pub fn decode(input: &str) -> Result<Vec<char>, PunycodeError> {
    let bytes = input.as_bytes();

    // Everything before the last delimiter is copied verbatim
    let (mut output, mut pos): (Vec<char>, usize) = match bytes.iter().rposition(|&b| b == b'-') {
        Some(delim) => {
            let basic = &input[..delim];
            if !basic.is_ascii() {
                return Err(PunycodeError);
            }
            (basic.chars().collect(), delim + 1)
        }
        None => (Vec::new(), 0),
    };

    let mut n = INITIAL_N;
    let mut i: u32 = 0;
    let mut bias = INITIAL_BIAS;

    while pos < bytes.len() {
        let old_i = i;
        let mut weight: u32 = 1;
        let mut k = BASE;
        loop {
            if pos >= bytes.len() {
                return Err(PunycodeError);
            }
            let digit = digit_value(bytes[pos]).ok_or(PunycodeError)?;
            pos += 1;
            i = digit
                .checked_mul(weight)
                .and_then(|d| i.checked_add(d))
                .ok_or(PunycodeError)?;
            let threshold = if k <= bias {
                TMIN
            } else if k >= bias + TMAX {
                TMAX
            } else {
                k - bias
            };
            if digit < threshold {
                break;
            }
            weight = weight
                .checked_mul(BASE - threshold)
                .ok_or(PunycodeError)?;
            k += BASE;
        }

        let len = output.len() as u32 + 1;
        bias = adapt(i - old_i, len, old_i == 0);
        n = n.checked_add(i / len).ok_or(PunycodeError)?;
        i %= len;

        let c = char::from_u32(n).ok_or(PunycodeError)?;
        output.insert(i as usize, c);
        i += 1;
    }

    Ok(output)
}

/// Encode code points into a bare Punycode label.
pub fn encode(input: &[char]) -> Result<String, PunycodeError> {
    let mut output: String = input.iter().filter(|c| c.is_ascii()).collect();
    let basic_len = output.len() as u32;
    if basic_len > 0 {
        output.push('-');
    }

    let mut n = INITIAL_N;
    let mut delta: u32 = 0;
    let mut bias = INITIAL_BIAS;
    let mut handled = basic_len;
    let total = input.len() as u32;

    while handled < total {
        let min_next = input
            .iter()
            .map(|&c| c as u32)
            .filter(|&c| c >= n)
            .min()
            .ok_or(PunycodeError)?;
        delta = delta
            .checked_add(
                (min_next - n)
                    .checked_mul(handled + 1)
                    .ok_or(PunycodeError)?,
            )
            .ok_or(PunycodeError)?;
        n = min_next;

        for &c in input {
            let cp = c as u32;
            if cp < n {
                delta = delta.checked_add(1).ok_or(PunycodeError)?;
            }
            if cp == n {
                let mut q = delta;
                let mut k = BASE;
                loop {
                    let threshold = if k <= bias {
                        TMIN
                    } else if k >= bias + TMAX {
                        TMAX
                    } else {
                        k - bias
                    };
                    if q < threshold {
                        break;
                    }
                    output.push(digit_char(threshold + ((q - threshold) % (BASE - threshold))));
                    q = (q - threshold) / (BASE - threshold);
                    k += BASE;
                }
                output.push(digit_char(q));
                bias = adapt(delta, handled + 1, handled == basic_len);
                delta = 0;
                handled += 1;
            }
        }
        delta += 1;
        n += 1;
    }

    Ok(output)
}
