use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use crate::cards::{Card, CardKind, PLUS_FOUR};

/// Kind weights in encoding order: number, plus-two, plus-four, reverse.
const KIND_WEIGHTS: [f64; 4] = [0.75, 0.05, 0.02, 0.15];

/// Concentrated weight on the color closest to the bias color; the
/// remaining three are scaled by the pace value.
const COLOR_BIAS_WEIGHT: f64 = 0.4;
const COLOR_REST_WEIGHT: f64 = 0.2;

/// Same shape for numbers: one concentrated weight, nine residuals.
const NUMBER_BIAS_WEIGHT: f64 = 0.6;
const NUMBER_REST_WEIGHT: f64 = 0.044;

/// Generates one card as a packed byte.
///
/// With `numbers_only` the kind is forced to number; otherwise it is
/// sampled from the kind weights. A generated plus-four short-circuits
/// to the canonical [`PLUS_FOUR`] byte.
///
/// When `bias` holds a reference card, color (and, for numbered cards
/// biased by a numbered card, the face number) are drawn from a
/// distribution concentrated on the values closest to the bias card,
/// with the residual weights dampened by `pace` in [0, 1]. At pace 0
/// the residual weights vanish but the concentrated weight is NOT
/// renormalized to uniform; the skew is part of the game's behavior.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    numbers_only: bool,
    bias: Option<u8>,
    pace: f64,
) -> u8 {
    let kind = if numbers_only {
        CardKind::Number
    } else {
        CardKind::from_bits(weighted_pick(rng, &KIND_WEIGHTS) as u8)
    };

    if kind == CardKind::PlusFour {
        return PLUS_FOUR;
    }

    let bias_card = bias.map(Card::decode);

    let mut colors: [u8; 4] = [0b00, 0b01, 0b10, 0b11];
    let color_weights: [f64; 4] = match &bias_card {
        Some(b) => {
            let target = i16::from(b.color.bits());
            // stable sort: closest color first, ties keep encoding order
            colors.sort_by_key(|c| (target - i16::from(*c)).abs());
            [
                COLOR_BIAS_WEIGHT,
                COLOR_REST_WEIGHT * pace,
                COLOR_REST_WEIGHT * pace,
                COLOR_REST_WEIGHT * pace,
            ]
        }
        None => [0.25; 4],
    };
    let color = colors[weighted_pick(rng, &color_weights)];

    let mut number = 0u8;
    if kind == CardKind::Number {
        let mut numbers: [u8; 10] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let number_weights: [f64; 10] = match &bias_card {
            Some(b) if b.kind == CardKind::Number => {
                let target = i16::from(b.number);
                numbers.sort_by_key(|n| (target - i16::from(*n)).abs());
                let mut weights = [NUMBER_REST_WEIGHT * pace; 10];
                weights[0] = NUMBER_BIAS_WEIGHT;
                weights
            }
            _ => [0.1; 10],
        };
        number = numbers[weighted_pick(rng, &number_weights)];
    }

    (kind.bits() << 6) | (color << 4) | number
}

fn weighted_pick<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> usize {
    // the first weight is always positive, so construction cannot fail
    WeightedIndex::new(weights)
        .expect("weights sum to a positive total")
        .sample(rng)
}
