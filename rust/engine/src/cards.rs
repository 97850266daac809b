use serde::{Deserialize, Serialize};

/// The kind of a card, stored in the top two bits of the packed encoding.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// Plain numbered card (carries a color and a number 0-9)
    Number = 0b00,
    /// Forces 2 debt onto the next player
    PlusTwo = 0b01,
    /// Wild card, playable on anything; forces 4 debt onto the next player
    PlusFour = 0b10,
    /// Flips the direction of play
    Reverse = 0b11,
}

/// One of the four card colors, stored in bits 4-5 of the packed encoding.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CardColor {
    /// Red (0b00)
    Red = 0b00,
    /// Green (0b01)
    Green = 0b01,
    /// Blue (0b10)
    Blue = 0b10,
    /// Yellow (0b11)
    Yellow = 0b11,
}

impl CardKind {
    pub fn from_bits(v: u8) -> CardKind {
        match v & 0b11 {
            0b00 => CardKind::Number,
            0b01 => CardKind::PlusTwo,
            0b10 => CardKind::PlusFour,
            _ => CardKind::Reverse,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl CardColor {
    pub fn from_bits(v: u8) -> CardColor {
        match v & 0b11 {
            0b00 => CardColor::Red,
            0b01 => CardColor::Green,
            0b10 => CardColor::Blue,
            _ => CardColor::Yellow,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// The canonical plus-four encoding: kind bits set, color and number zero.
/// Hands hold plus-four cards only in this form.
pub const PLUS_FOUR: u8 = 0b1000_0000;

/// A card unpacked from its single-byte encoding:
/// `(kind << 6) | (color << 4) | (number & 0xF)`.
///
/// Plus-four cards carry no meaningful color or number; plus-two and
/// reverse cards carry no meaningful number. Decoding leaves those
/// fields at their defaults (Red / 0).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Card kind (top two bits)
    pub kind: CardKind,
    /// Card color (bits 4-5)
    pub color: CardColor,
    /// Face number 0-9, meaningful only for `CardKind::Number`
    pub number: u8,
}

impl Card {
    pub fn new(kind: CardKind, color: CardColor, number: u8) -> Card {
        Card {
            kind,
            color,
            number,
        }
    }

    pub fn decode(byte: u8) -> Card {
        let kind = CardKind::from_bits(byte >> 6);
        let mut card = Card {
            kind,
            color: CardColor::Red,
            number: 0,
        };
        if kind == CardKind::PlusFour {
            return card;
        }
        card.color = CardColor::from_bits((byte & 0b0011_0000) >> 4);
        if matches!(kind, CardKind::PlusTwo | CardKind::Reverse) {
            return card;
        }
        card.number = byte & 0b1111;
        card
    }

    pub fn encode(&self) -> u8 {
        (self.kind.bits() << 6) | (self.color.bits() << 4) | (self.number & 0xF)
    }
}

/// Decides whether `candidate` may legally be played on top of `reference`.
///
/// The rule is asymmetric on purpose: only the candidate's kind matters
/// for the wild and plus-two/reverse checks, and the equal-number check
/// requires the reference (not the candidate) to be a numbered card.
pub fn is_playable(reference: u8, candidate: u8) -> bool {
    // matching colors always play, whatever the kinds
    if (reference & 0b0011_0000) == (candidate & 0b0011_0000) {
        return true;
    }

    let ref_kind = reference >> 6;
    let cand_kind = candidate >> 6;

    // a plus-four plays on anything
    if cand_kind == CardKind::PlusFour.bits() {
        return true;
    }

    // plus-two on plus-two, reverse on reverse
    if cand_kind == ref_kind
        && (cand_kind == CardKind::PlusTwo.bits() || cand_kind == CardKind::Reverse.bits())
    {
        return true;
    }

    // equal numbers, checked against the reference's kind only
    if ref_kind == CardKind::Number.bits() && (reference & 0xF) == (candidate & 0xF) {
        return true;
    }

    false
}
