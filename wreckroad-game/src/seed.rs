//! Reversible run share codes.
//! Code format: `WR-<WORD><NN>`, e.g. `WR-PISTON42`, `WR-NITRO07`.
use std::hash::Hasher;
use twox_hash::XxHash64;

const CODE_PREFIX: &str = "WR";
const WORD_BITS: u32 = 6;
const WORD_MASK: u16 = (1 << WORD_BITS) - 1;
const NUMBER_MASK: u16 = 0x7F;

pub const WORD_LIST: [&str; 64] = [
    "PISTON", "NITRO", "CLUTCH", "GASKET", "RADIAL", "AXLE", "CHROME", "DIESEL", "TURBO", "HUBCAP",
    "FENDER", "SPOILER", "MUFFLER", "BRAKE", "GRILLE", "TORQUE", "CAMSHAFT", "BUMPER", "SPROCKET",
    "THROTTLE", "IGNITION", "SPARK", "CARB", "DRIFT", "BURNOUT", "SKID", "RAMP", "CRASH", "WRECK",
    "SALVAGE", "SCRAP", "RUST", "RIVET", "WELDER", "WRENCH", "JACK", "TIRE", "TREAD", "RIM",
    "CHASSIS", "HOOD", "TRUNK", "ROLLBAR", "HARPOON", "RAILGUN", "FLAME", "MORTAR", "RAM",
    "PLOW", "SPIKE", "CONVOY", "DUNE", "MESA", "CANYON", "HIGHWAY", "BYPASS", "OVERPASS", "JUNKYARD",
    "GARAGE", "DEPOT", "OUTPOST", "BADLAND", "WASTES", "ROADKILL",
];

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[inline]
fn pack(word_index: u16, number: u8) -> u16 {
    (word_index & WORD_MASK) | ((u16::from(number) & NUMBER_MASK) << WORD_BITS)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    let number = u8::try_from((packed >> WORD_BITS) & NUMBER_MASK).unwrap_or(0);
    (packed & WORD_MASK, number)
}

/// Spread the packed code over the high bits so nearby codes give unrelated seeds.
fn compose_seed(word_index: u16, number: u8) -> u64 {
    let packed = pack(word_index, number);
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(b"WRECKROAD-");
    hasher.write_u16(packed);
    (hasher.finish() & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Render the share code for `seed`. Only the low 16 bits take part.
#[must_use]
pub fn encode_friendly(seed: u64) -> String {
    let (word_index, number) = unpack((seed & 0xFFFF) as u16);
    let word = WORD_LIST
        .get(usize::from(word_index))
        .copied()
        .unwrap_or(WORD_LIST[0]);
    format!("{CODE_PREFIX}-{word}{:02}", number % 100)
}

/// The share code for `seed`, if that code decodes back to `seed`.
///
/// Only seeds built by [`decode_to_seed`] have one; arbitrary numeric seeds
/// do not.
#[must_use]
pub fn share_code_for(seed: u64) -> Option<String> {
    let code = encode_friendly(seed);
    (decode_to_seed(&code) == Some(seed)).then_some(code)
}

/// Parse a share code back into its run seed.
///
/// Case and stray punctuation in the word are ignored; the prefix is optional.
#[must_use]
pub fn decode_to_seed(code: &str) -> Option<u64> {
    let trimmed = code.trim();
    let rest = match trimmed.split_once('-') {
        Some((prefix, rest)) if prefix.eq_ignore_ascii_case(CODE_PREFIX) => rest,
        Some(_) => return None,
        None => trimmed,
    };
    if rest.len() < 3 || !rest.is_char_boundary(rest.len() - 2) {
        return None;
    }
    let (word_part, number_part) = rest.split_at(rest.len() - 2);
    let number: u8 = number_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let index = WORD_LIST.iter().position(|w| *w == word)?;
    let word_index = u16::try_from(index).ok()?;
    Some(compose_seed(word_index, number))
}

/// Share code derived from arbitrary entropy, e.g. the wall clock.
#[must_use]
pub fn generate_code_from_entropy(entropy: u64) -> String {
    let word_index = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let number = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    encode_friendly(compose_seed(word_index, number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_codes_encode_back_to_themselves() {
        let seed = decode_to_seed("WR-PISTON42").unwrap();
        assert_eq!(encode_friendly(seed), "WR-PISTON42");
        for (index, word) in WORD_LIST.iter().enumerate() {
            let code = format!("WR-{word}{:02}", index % 100);
            let seed = decode_to_seed(&code).unwrap();
            assert_eq!(encode_friendly(seed), code);
        }
    }

    #[test]
    fn only_reproducible_seeds_get_a_share_code() {
        let seed = decode_to_seed("WR-AXLE00").unwrap();
        assert_eq!(share_code_for(seed).as_deref(), Some("WR-AXLE00"));
        for numeric in [0, 5, 1337, seed + 1] {
            assert_eq!(share_code_for(numeric), None, "seed {numeric}");
        }
    }

    #[test]
    fn parsing_is_forgiving_about_case_and_prefix() {
        let canonical = decode_to_seed("WR-NITRO07");
        assert!(canonical.is_some());
        assert_eq!(decode_to_seed("  wr-nitro07 "), canonical);
        assert_eq!(decode_to_seed("Nitro07"), canonical);
        assert_ne!(decode_to_seed("WR-NITRO08"), canonical);
    }

    #[test]
    fn malformed_codes_are_rejected() {
        assert_eq!(decode_to_seed("XX-PISTON42"), None);
        assert_eq!(decode_to_seed("WR-PISTON4"), None);
        assert_eq!(decode_to_seed("WR-UNICORN42"), None);
        assert_eq!(decode_to_seed("WR-42"), None);
    }

    #[test]
    fn words_are_unique_and_clean() {
        for (i, word) in WORD_LIST.iter().enumerate() {
            assert_eq!(sanitize_word(word), *word);
            assert!(!WORD_LIST[i + 1..].contains(word), "{word} repeated");
        }
    }

    #[test]
    fn entropy_codes_decode() {
        for entropy in [0, 1, 0xDEAD_BEEF, u64::MAX] {
            let code = generate_code_from_entropy(entropy);
            let seed = decode_to_seed(&code).unwrap();
            assert_eq!(encode_friendly(seed), code);
        }
    }
}
