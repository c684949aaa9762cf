//! The compiled-in species catalog: the twelve animals of the zodiac.

use std::borrow::Cow;

use zodiac_protocol::Species;

const fn species(
    id: u8,
    name: &'static str,
    display: &'static str,
    icon: &'static str,
) -> Species {
    Species {
        id,
        name: Cow::Borrowed(name),
        display: Cow::Borrowed(display),
        icon: Cow::Borrowed(icon),
    }
}

/// All twelve species, in zodiac order.
pub static ZODIAC: [Species; 12] = [
    species(1, "tý", "Chuột", "🐭"),
    species(2, "sửu", "Trâu", "🐂"),
    species(3, "dần", "Cọp", "🐅"),
    species(4, "mão", "Mèo", "🐈"),
    species(5, "thìn", "Rồng", "🐲"),
    species(6, "tỵ", "Rắn", "🐍"),
    species(7, "ngọ", "Ngựa", "🐎"),
    species(8, "mùi", "Dê", "🐐"),
    species(9, "thân", "Khỉ", "🐒"),
    species(10, "dậu", "Gà", "🐓"),
    species(11, "tuất", "Chó", "🐕"),
    species(12, "hợi", "Heo", "🐖"),
];

/// The catalog as a slice, for the round generator.
pub fn catalog() -> &'static [Species] {
    &ZODIAC
}
