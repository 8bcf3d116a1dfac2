use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

/// The symbols on a reel, in wheel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reel {
    Cherries,
    Cookie,
    Two,
    Clover,
    Cyclone,
    Sunflower,
    Six,
    Mushroom,
    Heart,
    Snowflake,
}

impl Reel {
    pub const ALL: [Reel; 10] = [
        Reel::Cherries,
        Reel::Cookie,
        Reel::Two,
        Reel::Clover,
        Reel::Cyclone,
        Reel::Sunflower,
        Reel::Six,
        Reel::Mushroom,
        Reel::Heart,
        Reel::Snowflake,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            Reel::Cherries => "\u{1F352}",
            Reel::Cookie => "\u{1F36A}",
            Reel::Two => "2\u{20E3}",
            Reel::Clover => "\u{1F340}",
            Reel::Cyclone => "\u{1F300}",
            Reel::Sunflower => "\u{1F33B}",
            Reel::Six => "6\u{20E3}",
            Reel::Mushroom => "\u{1F344}",
            Reel::Heart => "\u{2764}",
            Reel::Snowflake => "\u{2744}",
        }
    }
}

impl fmt::Display for Reel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.emoji())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub multiplier: i64,
    pub phrase: &'static str,
}

/// Exact three-symbol pay lines.
static TRIPLE_PAYOUTS: Lazy<HashMap<[Reel; 3], Payout>> = Lazy::new(|| {
    HashMap::from([
        (
            [Reel::Two, Reel::Two, Reel::Six],
            Payout {
                multiplier: 100,
                phrase: "JACKPOT! 226! Your bid has been multiplied * 100!",
            },
        ),
        (
            [Reel::Clover, Reel::Clover, Reel::Clover],
            Payout {
                multiplier: 10,
                phrase: "4LC! Your bid has been multiplied * 10!",
            },
        ),
        (
            [Reel::Cherries, Reel::Cherries, Reel::Cherries],
            Payout {
                multiplier: 8,
                phrase: "Three cherries! Your bid has been multiplied * 8!",
            },
        ),
    ])
});

/// Exact two-symbol pay lines, matched against the leading and trailing
/// pairs of the center row.
static PAIR_PAYOUTS: Lazy<HashMap<[Reel; 2], Payout>> = Lazy::new(|| {
    HashMap::from([
        (
            [Reel::Two, Reel::Six],
            Payout {
                multiplier: 4,
                phrase: "2 6! Your bid has been multiplied * 4!",
            },
        ),
        (
            [Reel::Cherries, Reel::Cherries],
            Payout {
                multiplier: 3,
                phrase: "Two cherries! Your bid has been multiplied * 3!",
            },
        ),
    ])
});

const THREE_OF_A_KIND: Payout = Payout {
    multiplier: 6,
    phrase: "Three symbols! Your bid has been multiplied * 6!",
};

const TWO_IN_A_ROW: Payout = Payout {
    multiplier: 2,
    phrase: "Two consecutive symbols! Your bid has been multiplied * 2!",
};

/// Resolve the payout for a center row: exact triples first, then exact
/// pairs, then any three of a kind, then any two consecutive symbols.
pub fn resolve(line: [Reel; 3]) -> Option<&'static Payout> {
    if let Some(payout) = TRIPLE_PAYOUTS.get(&line) {
        return Some(payout);
    }
    if let Some(payout) = PAIR_PAYOUTS
        .get(&[line[0], line[1]])
        .or_else(|| PAIR_PAYOUTS.get(&[line[1], line[2]]))
    {
        return Some(payout);
    }
    if line[0] == line[1] && line[1] == line[2] {
        return Some(&THREE_OF_A_KIND);
    }
    if line[0] == line[1] || line[1] == line[2] {
        return Some(&TWO_IN_A_ROW);
    }
    None
}

/// A winning pull returns the bid plus bid times the multiplier.
pub fn winnings(bid: i64, payout: &Payout) -> i64 {
    bid * payout.multiplier + bid
}

/// The payout table shown by `slotpayouts`.
pub fn payouts_message() -> String {
    format!(
        "Slot machine payouts:\n\n\
         {two} {two} {six} Bet * 100\n\n\
         {clover} {clover} {clover} Bet * 10\n\n\
         {cherries} {cherries} {cherries} Bet * 8\n\n\
         {two} {six} Bet * 4\n\n\
         {cherries} {cherries} Bet * 3\n\n\
         Three symbols: Bet * 6\n\
         Two symbols: Bet * 2",
        two = Reel::Two,
        six = Reel::Six,
        clover = Reel::Clover,
        cherries = Reel::Cherries,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jackpot_beats_pair_rules() {
        let payout = resolve([Reel::Two, Reel::Two, Reel::Six]).unwrap();
        assert_eq!(payout.multiplier, 100);
    }

    #[test]
    fn test_exact_triples() {
        assert_eq!(
            resolve([Reel::Clover, Reel::Clover, Reel::Clover]).unwrap().multiplier,
            10
        );
        assert_eq!(
            resolve([Reel::Cherries, Reel::Cherries, Reel::Cherries])
                .unwrap()
                .multiplier,
            8
        );
    }

    #[test]
    fn test_pairs() {
        // Leading pair.
        assert_eq!(
            resolve([Reel::Two, Reel::Six, Reel::Heart]).unwrap().multiplier,
            4
        );
        // Trailing pair.
        assert_eq!(
            resolve([Reel::Heart, Reel::Two, Reel::Six]).unwrap().multiplier,
            4
        );
        // Two cherries outrank the generic two-in-a-row rule.
        assert_eq!(
            resolve([Reel::Cherries, Reel::Cherries, Reel::Heart])
                .unwrap()
                .multiplier,
            3
        );
    }

    #[test]
    fn test_generic_matches() {
        assert_eq!(
            resolve([Reel::Heart, Reel::Heart, Reel::Heart]).unwrap().multiplier,
            6
        );
        assert_eq!(
            resolve([Reel::Heart, Reel::Heart, Reel::Snowflake])
                .unwrap()
                .multiplier,
            2
        );
        assert_eq!(
            resolve([Reel::Snowflake, Reel::Heart, Reel::Heart])
                .unwrap()
                .multiplier,
            2
        );
    }

    #[test]
    fn test_losing_line() {
        assert_eq!(resolve([Reel::Cookie, Reel::Heart, Reel::Snowflake]), None);
        // Matching outer symbols with a different center pay nothing.
        assert_eq!(resolve([Reel::Heart, Reel::Cookie, Reel::Heart]), None);
    }

    #[test]
    fn test_winnings_include_the_bid() {
        let jackpot = resolve([Reel::Two, Reel::Two, Reel::Six]).unwrap();
        assert_eq!(winnings(10, jackpot), 1010);
        assert_eq!(winnings(5, &TWO_IN_A_ROW), 15);
    }
}
