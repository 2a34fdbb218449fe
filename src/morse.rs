//! Morse encoding and keying-time model.
//!
//! Timing follows the PARIS convention: one unit lasts `60000 / (50 * wpm)`
//! milliseconds in integer arithmetic, as the keying device computes it; a dot is one unit, a dash three, symbols inside a letter
//! are separated by one unit, letters by three and words by seven.

use std::time::Duration;

use serde::Serialize;

use crate::scheduler::Speed;

pub const DOT_UNITS: u64 = 1;
pub const DASH_UNITS: u64 = 3;
pub const SYMBOL_GAP_UNITS: u64 = 1;
pub const LETTER_GAP_UNITS: u64 = 3;
pub const WORD_GAP_UNITS: u64 = 7;

const TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('/', "-..-."),
    ('-', "-....-"),
    (':', "---..."),
    (';', "-.-.-."),
    ('@', ".--.-."),
    ('=', "-...-"),
];

/// Code for a single character, case-insensitive.
pub fn lookup(c: char) -> Option<&'static str> {
    let upper = c.to_ascii_uppercase();
    TABLE
        .iter()
        .find(|(letter, _)| *letter == upper)
        .map(|(_, code)| *code)
}

/// Duration of one keying unit at the given speed, truncated to whole
/// milliseconds.
pub fn unit_duration(speed: Speed) -> Duration {
    Duration::from_millis(60_000 / (50 * u64::from(speed.wpm())))
}

/// Units taken by one letter's symbols and the gaps between them.
fn letter_units(code: &str) -> u64 {
    let symbols: u64 = code
        .chars()
        .map(|s| if s == '-' { DASH_UNITS } else { DOT_UNITS })
        .sum();
    let gaps = code.len().saturating_sub(1) as u64 * SYMBOL_GAP_UNITS;
    symbols + gaps
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Letter { ch: char, code: &'static str },
    WordGap,
}

/// A message translated to Morse elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoded {
    elements: Vec<Element>,
    skipped: Vec<char>,
}

/// Encode `text`, skipping characters that have no Morse code.
///
/// Runs of whitespace collapse into a single word gap; leading and trailing
/// whitespace produce nothing.
pub fn encode(text: &str) -> Encoded {
    let mut encoded = Encoded::default();
    let mut pending_gap = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_gap = true;
            continue;
        }
        match lookup(ch) {
            Some(code) => {
                if pending_gap && !encoded.elements.is_empty() {
                    encoded.elements.push(Element::WordGap);
                }
                pending_gap = false;
                encoded.elements.push(Element::Letter {
                    ch: ch.to_ascii_uppercase(),
                    code,
                });
            }
            None => encoded.skipped.push(ch),
        }
    }

    encoded
}

impl Encoded {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Characters dropped because they have no code.
    pub fn skipped(&self) -> &[char] {
        &self.skipped
    }

    /// True when nothing would be keyed.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn letter_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, Element::Letter { .. }))
            .count()
    }

    /// Total keying time in units, without a trailing gap.
    pub fn units(&self) -> u64 {
        let mut units = 0;
        let mut after_letter = false;
        for element in &self.elements {
            match element {
                Element::Letter { code, .. } => {
                    if after_letter {
                        units += LETTER_GAP_UNITS;
                    }
                    units += letter_units(code);
                    after_letter = true;
                }
                Element::WordGap => {
                    units += WORD_GAP_UNITS;
                    after_letter = false;
                }
            }
        }
        units
    }

    pub fn duration(&self, speed: Speed) -> Duration {
        let units = u32::try_from(self.units()).unwrap_or(u32::MAX);
        unit_duration(speed).saturating_mul(units)
    }

    /// Letters separated by spaces, words by ` / `.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for element in &self.elements {
            match element {
                Element::Letter { code, .. } => {
                    if !out.is_empty() && !out.ends_with("/ ") {
                        out.push(' ');
                    }
                    out.push_str(code);
                }
                Element::WordGap => out.push_str(" / "),
            }
        }
        out
    }

    /// Per-letter rows, as shown by the demo page.
    pub fn letters(&self) -> Vec<LetterCode> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::Letter { ch, code } => Some(LetterCode {
                    ch: *ch,
                    code: (*code).to_string(),
                }),
                Element::WordGap => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LetterCode {
    pub ch: char,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed(wpm: i64) -> Speed {
        Speed::clamped(wpm)
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup('a'), Some(".-"));
        assert_eq!(lookup('A'), Some(".-"));
        assert_eq!(lookup('0'), Some("-----"));
        assert_eq!(lookup('@'), Some(".--.-."));
        assert_eq!(lookup('#'), None);
    }

    #[test]
    fn encode_sos() {
        let encoded = encode("sos");
        assert_eq!(encoded.render(), "... --- ...");
        assert_eq!(encoded.letter_count(), 3);
        assert!(encoded.skipped().is_empty());
        // 5 + 3 + 11 + 3 + 5
        assert_eq!(encoded.units(), 27);
    }

    #[test]
    fn whitespace_collapses_into_one_word_gap() {
        let encoded = encode("  E \t\n  E  ");
        assert_eq!(encoded.render(), ". / .");
        assert_eq!(
            encoded.elements(),
            &[
                Element::Letter { ch: 'E', code: "." },
                Element::WordGap,
                Element::Letter { ch: 'E', code: "." },
            ]
        );
        assert_eq!(encoded.units(), 1 + 7 + 1);
    }

    #[test]
    fn unsupported_characters_are_skipped() {
        let encoded = encode("a#b");
        assert_eq!(encoded.render(), ".- -...");
        assert_eq!(encoded.skipped(), &['#']);
    }

    #[test]
    fn only_unsupported_characters_is_empty() {
        let encoded = encode("### ~~");
        assert!(encoded.is_empty());
        assert_eq!(encoded.units(), 0);
        assert_eq!(encoded.skipped().len(), 5);
    }

    #[test]
    fn paris_takes_43_units() {
        let encoded = encode("PARIS");
        assert_eq!(encoded.units(), 43);
        // 12 wpm -> 100 ms per unit
        assert_eq!(
            encoded.duration(speed(12)),
            Duration::from_millis(4300)
        );
    }

    #[test]
    fn unit_duration_follows_speed() {
        assert_eq!(unit_duration(speed(20)), Duration::from_millis(60));
        assert_eq!(unit_duration(speed(5)), Duration::from_millis(240));
        assert_eq!(unit_duration(speed(30)), Duration::from_millis(40));
    }

    #[test]
    fn unit_duration_truncates_to_whole_milliseconds() {
        // 1200 / 17 = 70.58...
        assert_eq!(unit_duration(speed(17)), Duration::from_millis(70));
        assert_eq!(unit_duration(speed(7)), Duration::from_millis(171));
        assert_eq!(encode("PARIS").duration(speed(17)), Duration::from_millis(43 * 70));
    }

    #[test]
    fn letters_lists_each_character() {
        let letters = encode("Hi").letters();
        assert_eq!(
            letters,
            vec![
                LetterCode {
                    ch: 'H',
                    code: "....".to_string()
                },
                LetterCode {
                    ch: 'I',
                    code: "..".to_string()
                },
            ]
        );
    }
}
