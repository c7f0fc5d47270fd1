//! Metaphone phonetic encoding.
//!
//! A compact Metaphone variant: transformation rules over uppercased
//! alphabetic input, producing a bounded-length code. Words that sound
//! alike under common English spelling patterns (silent initial letters,
//! PH/TH/SCH/CH digraphs, soft C and G) encode to the same code.
//!
//! The rule set is chosen so that codes are fixed points: encoding an
//! emitted code yields the code again. Digits in the input (the `0`
//! symbol stands for the TH sound) pass through verbatim, initial
//! silent-letter pairs are only dropped when a vowel follows, and code
//! symbols never trigger digraph rules among themselves.

use crate::options::MetaphoneParams;

fn is_vowel(c: u8) -> bool {
    matches!(c, b'A' | b'E' | b'I' | b'O' | b'U')
}

/// Encode a word with Metaphone, e.g. `Knight -> NT`, `Philip -> FLP`.
///
/// Case folds internally; characters outside `[A-Za-z0-9]` are dropped
/// before encoding. Inputs with nothing encodable yield the empty string.
pub fn metaphone_code(input: &str, params: &MetaphoneParams) -> String {
    let word: Vec<u8> = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase() as u8)
        .collect();

    if word.is_empty() {
        return String::new();
    }

    // Initial silent letters: KN, GN, PN, WR drop the first letter, AE
    // drops the A, WH collapses to W. Only when a vowel follows the pair,
    // which is where English actually silences them.
    let mut start = 0usize;
    let mut word = word;
    if word.len() >= 3 {
        let vowel_after = is_vowel(word[2]);
        match (word[0], word[1]) {
            (b'K', b'N') | (b'G', b'N') | (b'P', b'N') | (b'W', b'R') if vowel_after => start = 1,
            (b'A', b'E') if vowel_after => start = 1,
            (b'W', b'H') if vowel_after => {
                word.remove(1);
            }
            _ => {}
        }
    }

    let word = &word[start..];
    let max = params.max_code_length.max(1);
    let mut code: Vec<u8> = Vec::with_capacity(max);
    let mut i = 0usize;

    let push = |code: &mut Vec<u8>, sym: u8| {
        // Collapse doubled output symbols (JUDGE would otherwise emit JJ).
        if code.last() != Some(&sym) {
            code.push(sym);
        }
    };

    while i < word.len() && code.len() < max {
        let c = word[i];
        let next = word.get(i + 1).copied();
        let next2 = word.get(i + 2).copied();
        let prev = if i > 0 { Some(word[i - 1]) } else { None };

        // Doubled input letters encode once.
        if prev == Some(c) && c != b'C' {
            i += 1;
            continue;
        }

        match c {
            b'0'..=b'9' => code.push(c),
            b'A' | b'E' | b'I' | b'O' | b'U' => {
                // Vowels survive only at the head of the word.
                if i == 0 {
                    push(&mut code, c);
                }
            }
            b'B' => {
                // Silent in terminal MB (dumb, plumb).
                let terminal_mb = prev == Some(b'M') && i == word.len() - 1;
                if !terminal_mb {
                    push(&mut code, b'B');
                }
            }
            b'C' => {
                if next == Some(b'H') {
                    // SCH -> SK, otherwise CH -> X.
                    push(&mut code, if prev == Some(b'S') { b'K' } else { b'X' });
                    i += 1;
                } else if matches!(next, Some(b'I') | Some(b'E') | Some(b'Y')) {
                    push(&mut code, b'S');
                } else {
                    push(&mut code, b'K');
                }
            }
            b'D' => {
                if next == Some(b'G') && matches!(next2, Some(b'E') | Some(b'I') | Some(b'Y')) {
                    // DGE/DGI/DGY -> J (edge, judge).
                    push(&mut code, b'J');
                    i += 2;
                } else {
                    push(&mut code, b'T');
                }
            }
            b'F' => push(&mut code, b'F'),
            b'G' => {
                let gh_silent =
                    next == Some(b'H') && !next2.map(is_vowel).unwrap_or(false);
                if gh_silent {
                    // GH not followed by a vowel is silent (night, weigh).
                    i += 1;
                } else if matches!(next, Some(b'I') | Some(b'E') | Some(b'Y')) {
                    push(&mut code, b'J');
                } else {
                    push(&mut code, b'K');
                }
            }
            b'H' => {
                // Kept only word-initially; silent after vowels and the
                // digraph consonants, which the digraph rules consume.
                if i == 0 {
                    push(&mut code, b'H');
                }
            }
            b'J' => push(&mut code, b'J'),
            b'K' => {
                if prev != Some(b'C') {
                    push(&mut code, b'K');
                }
            }
            b'L' => push(&mut code, b'L'),
            b'M' => push(&mut code, b'M'),
            b'N' => push(&mut code, b'N'),
            b'P' => {
                if next == Some(b'H') {
                    // PH -> F.
                    push(&mut code, b'F');
                    i += 1;
                } else {
                    push(&mut code, b'P');
                }
            }
            b'Q' => push(&mut code, b'K'),
            b'R' => push(&mut code, b'R'),
            b'S' => {
                if next == Some(b'H') {
                    // SH -> X.
                    push(&mut code, b'X');
                    i += 1;
                } else if next == Some(b'I')
                    && matches!(next2, Some(b'O') | Some(b'A'))
                {
                    // SIO/SIA -> X (vision-adjacent spellings).
                    push(&mut code, b'X');
                } else {
                    push(&mut code, b'S');
                }
            }
            b'T' => {
                if next == Some(b'H') {
                    // TH -> the 0 symbol.
                    push(&mut code, b'0');
                    i += 1;
                } else if next == Some(b'I')
                    && matches!(next2, Some(b'O') | Some(b'A'))
                {
                    // TIO/TIA -> X (nation).
                    push(&mut code, b'X');
                } else {
                    push(&mut code, b'T');
                }
            }
            b'V' => push(&mut code, b'F'),
            b'W' => push(&mut code, b'W'),
            b'X' => push(&mut code, b'X'),
            b'Y' => {
                // Y carries sound only word-initially (year); elsewhere it
                // behaves as a vowel (Smyth = Smith).
                if i == 0 {
                    push(&mut code, b'Y');
                }
            }
            b'Z' => push(&mut code, b'S'),
            _ => {}
        }
        i += 1;
    }

    String::from_utf8(code).unwrap_or_default()
}
