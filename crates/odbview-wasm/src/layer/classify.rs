//! Layer name → (type, side) classification.
//!
//! Each table is an ordered list of `(Matcher, result)` pairs evaluated
//! against the lowercased name; the first hit wins.

use super::{LayerType, Side};

#[derive(Debug, Clone, Copy)]
enum Matcher {
    /// Whole name equals.
    Exact(&'static str),
    /// Name contains the substring.
    Contains(&'static str),
    /// Name ends with the suffix.
    EndsWith(&'static str),
    /// Name contains the prefix directly followed by a digit in the range.
    PrefixDigit(&'static str, char, char),
}

impl Matcher {
    fn matches(self, name: &str) -> bool {
        match self {
            Self::Exact(value) => name == value,
            Self::Contains(value) => name.contains(value),
            Self::EndsWith(value) => name.ends_with(value),
            Self::PrefixDigit(prefix, low, high) => name
                .match_indices(prefix)
                .any(|(at, _)| {
                    name.get(at + prefix.len()..)
                        .and_then(|rest| rest.chars().next())
                        .is_some_and(|c| (low..=high).contains(&c))
                }),
        }
    }
}

use Matcher::{Contains, EndsWith, Exact, PrefixDigit};

const OVERRIDES: &[(Matcher, (LayerType, Side))] = &[
    (Exact("l1"), (LayerType::Copper, Side::Top)),
    (Exact("layer1"), (LayerType::Copper, Side::Top)),
    (Exact("signal1"), (LayerType::Copper, Side::Top)),
    (Exact("sig1"), (LayerType::Copper, Side::Top)),
    (Exact("l2"), (LayerType::Copper, Side::Internal)),
    (Exact("layer2"), (LayerType::Copper, Side::Internal)),
    (Exact("signal2"), (LayerType::Copper, Side::Internal)),
    (Exact("sig2"), (LayerType::Copper, Side::Internal)),
    (Exact("l3"), (LayerType::Copper, Side::Internal)),
    (Exact("layer3"), (LayerType::Copper, Side::Internal)),
    (Exact("signal3"), (LayerType::Copper, Side::Internal)),
    (Exact("sig3"), (LayerType::Copper, Side::Internal)),
    (Exact("l4"), (LayerType::Copper, Side::Bottom)),
    (Exact("layer4"), (LayerType::Copper, Side::Bottom)),
    (Exact("signal4"), (LayerType::Copper, Side::Bottom)),
    (Exact("sig4"), (LayerType::Copper, Side::Bottom)),
    (Exact("topmask"), (LayerType::SolderMask, Side::Top)),
    (Exact("topsolder"), (LayerType::SolderMask, Side::Top)),
    (Exact("soldermask_top"), (LayerType::SolderMask, Side::Top)),
    (Exact("botmask"), (LayerType::SolderMask, Side::Bottom)),
    (Exact("bottomsolder"), (LayerType::SolderMask, Side::Bottom)),
    (Exact("soldermask_bottom"), (LayerType::SolderMask, Side::Bottom)),
    (Exact("topsilk"), (LayerType::Silkscreen, Side::Top)),
    (Exact("silkscreen_top"), (LayerType::Silkscreen, Side::Top)),
    (Exact("botsilk"), (LayerType::Silkscreen, Side::Bottom)),
    (Exact("silkscreen_bottom"), (LayerType::Silkscreen, Side::Bottom)),
    (Exact("outline"), (LayerType::Outline, Side::Both)),
    (Exact("board"), (LayerType::Outline, Side::Both)),
    (Exact("contour"), (LayerType::Outline, Side::Both)),
    (Exact("drill"), (LayerType::Drill, Side::Both)),
    (Exact("drills"), (LayerType::Drill, Side::Both)),
    (Exact("holes"), (LayerType::Drill, Side::Both)),
];

const TYPE_RULES: &[(Matcher, LayerType)] = &[
    (Contains("copper"), LayerType::Copper),
    (Contains("signal"), LayerType::Copper),
    (Contains("conductor"), LayerType::Copper),
    (Contains("cu"), LayerType::Copper),
    (PrefixDigit("l", '0', '9'), LayerType::Copper),
    (PrefixDigit("layer", '0', '9'), LayerType::Copper),
    (Contains("mask"), LayerType::SolderMask),
    (Contains("solder"), LayerType::SolderMask),
    (Contains("sm"), LayerType::SolderMask),
    (Contains("silk"), LayerType::Silkscreen),
    (Contains("legend"), LayerType::Silkscreen),
    (Contains("overlay"), LayerType::Silkscreen),
    (Contains("ss"), LayerType::Silkscreen),
    (Contains("outline"), LayerType::Outline),
    (Contains("contour"), LayerType::Outline),
    (Contains("profile"), LayerType::Outline),
    (Contains("board"), LayerType::Outline),
    (Contains("pcb"), LayerType::Outline),
    (Contains("edge"), LayerType::Outline),
    (Contains("drill"), LayerType::Drill),
    (Contains("hole"), LayerType::Drill),
    (Contains("via"), LayerType::Drill),
    (Contains("pth"), LayerType::Drill),
    (Contains("paste"), LayerType::Paste),
    (Contains("sp"), LayerType::Paste),
    (Contains("keepout"), LayerType::Keepout),
    (Contains("restrict"), LayerType::Keepout),
    (Contains("route"), LayerType::Route),
    (Contains("routing"), LayerType::Route),
];

// `t$` and `b$` are literal: some exporters tag sides with a dollar suffix.
const SIDE_RULES: &[(Matcher, Side)] = &[
    (Contains("top"), Side::Top),
    (Contains("t$"), Side::Top),
    (Contains("_t"), Side::Top),
    (EndsWith(".t"), Side::Top),
    (Contains(".top"), Side::Top),
    (Contains("-top"), Side::Top),
    (Contains("bot"), Side::Bottom),
    (Contains("b$"), Side::Bottom),
    (Contains("_b"), Side::Bottom),
    (EndsWith(".b"), Side::Bottom),
    (Contains(".bot"), Side::Bottom),
    (Contains("-bot"), Side::Bottom),
    (Contains("inner"), Side::Internal),
    (Contains("internal"), Side::Internal),
    (PrefixDigit("l", '2', '9'), Side::Internal),
    (PrefixDigit("layer", '2', '9'), Side::Internal),
];

fn first_match<T: Copy>(rules: &[(Matcher, T)], name: &str) -> Option<T> {
    rules
        .iter()
        .find(|(matcher, _)| matcher.matches(name))
        .map(|(_, result)| *result)
}

/// Classifies a layer by its directory name. Case-insensitive and total.
pub fn classify(name: &str) -> (LayerType, Side) {
    let lower = name.trim().to_lowercase();
    if let Some(class) = first_match(OVERRIDES, &lower) {
        return class;
    }
    (
        first_match(TYPE_RULES, &lower).unwrap_or(LayerType::Other),
        first_match(SIDE_RULES, &lower).unwrap_or(Side::Both),
    )
}
