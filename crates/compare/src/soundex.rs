//! American Soundex phonetic encoding.

/// Numeric Soundex class for a letter, or `None` for vowels and H/W/Y.
fn soundex_class(c: char) -> Option<u8> {
    match c {
        'b' | 'f' | 'p' | 'v' => Some(1),
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some(2),
        'd' | 't' => Some(3),
        'l' => Some(4),
        'm' | 'n' => Some(5),
        'r' => Some(6),
        _ => None,
    }
}

/// Encode a word as a four-character Soundex code, e.g. `Robert -> R163`.
///
/// Case folds internally. Runs of letters sharing a class collapse to one
/// digit; H and W are transparent between like-classed consonants, while
/// vowels reset the run. Digits already present in the input pass through
/// as their own class, so re-encoding a code yields the same code. Inputs
/// with no letters or digits encode to the empty string.
pub fn soundex_code(input: &str) -> String {
    let chars: Vec<char> = input
        .chars()
        .flat_map(|c| c.to_lowercase())
        .filter(|c| c.is_ascii_alphabetic() || c.is_ascii_digit())
        .collect();

    let Some(&first) = chars.first() else {
        return String::new();
    };

    let mut code = String::with_capacity(4);
    if first.is_ascii_digit() {
        code.push(first);
    } else {
        code.push(first.to_ascii_uppercase());
    }

    let mut last_class = if first.is_ascii_digit() {
        Some(first as u8 - b'0')
    } else {
        soundex_class(first)
    };

    for &c in &chars[1..] {
        if code.len() == 4 {
            break;
        }
        if c == 'h' || c == 'w' {
            // Transparent: like-classed consonants around H/W still collapse.
            continue;
        }
        if c.is_ascii_digit() {
            // Digits are already code material and pass through verbatim,
            // so re-encoding a code reproduces it.
            code.push(c);
            last_class = Some(c as u8 - b'0');
            continue;
        }
        match soundex_class(c) {
            Some(digit) => {
                if last_class != Some(digit) {
                    code.push((b'0' + digit) as char);
                }
                last_class = Some(digit);
            }
            // Vowels (and Y) separate runs of equal classes.
            None => last_class = None,
        }
    }

    while code.len() < 4 {
        code.push('0');
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_codes() {
        assert_eq!(soundex_code("Robert"), "R163");
        assert_eq!(soundex_code("Rupert"), "R163");
        assert_eq!(soundex_code("Jones"), "J520");
        assert_eq!(soundex_code("Tymczak"), "T522");
        assert_eq!(soundex_code("Pfister"), "P236");
        assert_eq!(soundex_code("Honeyman"), "H555");
    }

    #[test]
    fn h_and_w_are_transparent() {
        // C and K share a class; the intervening H must not split them.
        assert_eq!(soundex_code("Ashcraft"), "A261");
        assert_eq!(soundex_code("Ashcroft"), "A261");
    }

    #[test]
    fn vowels_reset_runs() {
        // The two Ts in "Tatum" are separated by a vowel and both encode.
        assert_eq!(soundex_code("Tatum"), "T350");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(soundex_code("ROBERT"), soundex_code("robert"));
    }

    #[test]
    fn encoding_is_idempotent() {
        for word in ["Robert", "Jones", "Ashcraft", "Honeyman", "Lee", "X"] {
            let once = soundex_code(word);
            assert_eq!(soundex_code(&once), once, "word {word:?}");
        }
    }

    #[test]
    fn no_letters_encodes_empty() {
        assert_eq!(soundex_code(""), "");
        assert_eq!(soundex_code("!!!"), "");
    }
}
