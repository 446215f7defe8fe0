use crate::domain::error::DecodeError;

/// Decode backslash escapes in a typed entry into raw bytes.
///
/// Entries are ASCII only. Recognised escapes are `\\`, `\'`, `\"`, `\a`, `\b`,
/// `\f`, `\n`, `\r`, `\t`, `\v`, octal `\ooo`, `\xhh`, and `\uXXXX` /
/// `\UXXXXXXXX` as long as the value fits in a byte. A backslash before a
/// newline is dropped. Any other escape is kept verbatim, backslash included.
pub fn decode_escaped_entry(text: &str) -> Result<Vec<u8>, DecodeError> {
    if let Some((position, ch)) = text.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
        return Err(DecodeError::NonAscii { ch, position });
    }

    let input = text.as_bytes();
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        let b = input[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }

        let start = i;
        let Some(&kind) = input.get(i + 1) else {
            return Err(DecodeError::TruncatedEscape { position: start });
        };
        i += 2;

        match kind {
            b'\\' | b'\'' | b'"' => out.push(kind),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'n' => out.push(0x0A),
            b'r' => out.push(0x0D),
            b't' => out.push(0x09),
            b'v' => out.push(0x0B),
            b'\n' => {}
            b'0'..=b'7' => {
                let mut value = u32::from(kind - b'0');
                for _ in 0..2 {
                    match input.get(i) {
                        Some(&digit @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(digit - b'0');
                            i += 1;
                        }
                        _ => break,
                    }
                }
                out.push(to_byte(value, start)?);
            }
            b'x' => out.push(to_byte(hex_escape(input, &mut i, 2, start)?, start)?),
            b'u' => out.push(to_byte(hex_escape(input, &mut i, 4, start)?, start)?),
            b'U' => out.push(to_byte(hex_escape(input, &mut i, 8, start)?, start)?),
            b'N' => {
                return Err(DecodeError::UnsupportedEscape {
                    position: start,
                    escape: "\\N".to_string(),
                })
            }
            other => {
                out.push(b'\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

fn hex_escape(
    input: &[u8],
    cursor: &mut usize,
    digits: usize,
    position: usize,
) -> Result<u32, DecodeError> {
    let end = *cursor + digits;
    let Some(raw) = input.get(*cursor..end) else {
        return Err(DecodeError::TruncatedEscape { position });
    };

    let bytes = hex::decode(raw).map_err(|_| DecodeError::InvalidHex {
        position,
        digits: String::from_utf8_lossy(raw).into_owned(),
    })?;
    *cursor = end;

    Ok(bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
}

fn to_byte(value: u32, position: usize) -> Result<u8, DecodeError> {
    u8::try_from(value).map_err(|_| DecodeError::OutOfRange { position, value })
}
