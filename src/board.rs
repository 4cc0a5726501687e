use std::fmt;
use std::str::FromStr;

use bitvec::prelude::*;
use lazy_static::lazy_static;
use rand::Rng;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{BoardError, InvalidMove, ParseMoveError};
use crate::status::{EndReason, GameStatus, Outcome};

pub const TOTAL_HOLES: usize = 16;
pub const PLAYER_HOLES: usize = TOTAL_HOLES / 2;
pub const INITIAL_SEEDS_PER_COLOR: u8 = 2;
pub const TOTAL_SEEDS: u32 = 64;
pub const WINNING_THRESHOLD: u32 = 33;
pub const EVEN_SPLIT: u32 = TOTAL_SEEDS / 2;
pub const MIN_SEEDS_ON_BOARD: u32 = 8;

/// One bit per hole, hole 0 is the least significant bit.
pub type HoleMask = BitArr!(for TOTAL_HOLES, in u16, Lsb0);

fn empty_mask() -> HoleMask {
    bitarr!(u16, Lsb0; 0; TOTAL_HOLES)
}

lazy_static! {
    // even holes belong to player 1, odd holes to player 2
    static ref OWNED_HOLES: [HoleMask; 2] = {
        let mut masks = [empty_mask(), empty_mask()];
        for hole in 0..TOTAL_HOLES {
            masks[hole % 2].set(hole, true);
        }
        masks
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];

    pub fn opponent(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    pub fn owner_of(hole: usize) -> Self {
        if hole % 2 == 0 { Side::One } else { Side::Two }
    }

    pub fn owns(self, hole: usize) -> bool {
        hole < TOTAL_HOLES && Self::owner_of(hole) == self
    }

    pub fn owned_holes(self) -> HoleMask {
        OWNED_HOLES[self.index()]
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Player {}", self.index() + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SeedColor {
    Blue,
    Red,
}

impl SeedColor {
    pub const ALL: [SeedColor; 2] = [SeedColor::Blue, SeedColor::Red];

    pub fn code(self) -> char {
        match self {
            SeedColor::Blue => 'B',
            SeedColor::Red => 'R',
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "B" | "BLUE" => Some(SeedColor::Blue),
            "R" | "RED" => Some(SeedColor::Red),
            _ => None,
        }
    }
}

impl fmt::Display for SeedColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            SeedColor::Blue => "blue",
            SeedColor::Red => "red",
        })
    }
}

/// Seeds of each color sitting in one hole. The two counts are never merged:
/// they sow differently but are captured together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Hole {
    blue: u8,
    red: u8,
}

impl Hole {
    pub const fn new(blue: u8, red: u8) -> Self {
        Self { blue, red }
    }

    pub fn seeds(&self, color: SeedColor) -> u8 {
        match color {
            SeedColor::Blue => self.blue,
            SeedColor::Red => self.red,
        }
    }

    pub fn total(&self) -> u32 {
        u32::from(self.blue) + u32::from(self.red)
    }

    pub fn is_empty(&self) -> bool {
        self.blue == 0 && self.red == 0
    }

    fn slot_mut(&mut self, color: SeedColor) -> &mut u8 {
        match color {
            SeedColor::Blue => &mut self.blue,
            SeedColor::Red => &mut self.red,
        }
    }

    fn take(&mut self, color: SeedColor) -> u8 {
        std::mem::take(self.slot_mut(color))
    }

    fn drop_seed(&mut self, color: SeedColor) {
        *self.slot_mut(color) += 1;
    }

    fn clear(&mut self) -> u32 {
        let total = self.total();
        *self = Hole::default();
        total
    }
}

/// Sow `color` seeds out of `hole`. Holes are zero-based on the wire and
/// one-based in the human notation (`3B` sows blue from hole index 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub hole: usize,
    pub color: SeedColor,
}

impl Move {
    pub fn new(hole: usize, color: SeedColor) -> Self {
        Self { hole, color }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.hole + 1, self.color.code())
    }
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let format_err = || ParseMoveError::Format(trimmed.to_string());
        let split = trimmed
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(idx, _)| idx)
            .ok_or_else(format_err)?;
        let (number, code) = trimmed.split_at(split);
        if number.is_empty() || number.len() > 2 || code.len() != 1 {
            return Err(format_err());
        }
        let color = SeedColor::from_code(code).ok_or_else(format_err)?;
        let number: usize = number.parse().map_err(|_| format_err())?;
        if !(1..=TOTAL_HOLES).contains(&number) {
            return Err(ParseMoveError::HoleNumber(number));
        }
        Ok(Move::new(number - 1, color))
    }
}

impl Serialize for Move {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let mut s = serializer.serialize_struct("Move", 2)?;
        s.serialize_field("hole", &self.hole)?;
        s.serialize_field("color", &self.color.code().to_string())?;
        s.end()
    }
}

struct MoveVisitor;
impl<'de> Visitor<'de> for MoveVisitor {
    type Value = Move;
    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object with hole and color")
    }
    fn visit_map<V>(self, mut map: V) -> Result<Move, V::Error> where V: MapAccess<'de> {
        let mut hole = None;
        let mut color = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "hole" => { hole = Some(map.next_value::<usize>()?); }
                "color" => {
                    let code = map.next_value::<String>()?;
                    let parsed = SeedColor::from_code(&code).ok_or_else(|| {
                        serde::de::Error::invalid_value(serde::de::Unexpected::Str(&code), &"B or R")
                    })?;
                    color = Some(parsed);
                }
                _ => { return Err(serde::de::Error::unknown_field(&key, &["hole", "color"])); }
            }
        }
        let hole = hole.ok_or_else(|| serde::de::Error::missing_field("hole"))?;
        let color = color.ok_or_else(|| serde::de::Error::missing_field("color"))?;
        Ok(Move { hole, color })
    }
}

impl<'de> Deserialize<'de> for Move {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        deserializer.deserialize_map(MoveVisitor)
    }
}

/// How the first player of a fresh game is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPolicy {
    Fixed(Side),
    CoinFlip,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Board {
    holes: [Hole; TOTAL_HOLES],
    captured: [u32; 2],
    current_player: Side,
}

impl Board {
    pub fn new<R: Rng + ?Sized>(policy: StartPolicy, rng: &mut R) -> Self {
        let first = match policy {
            StartPolicy::Fixed(side) => side,
            StartPolicy::CoinFlip => if rng.gen_bool(0.5) { Side::One } else { Side::Two },
        };
        Self::with_first_player(first)
    }

    pub fn with_first_player(first: Side) -> Self {
        Self {
            holes: [Hole::new(INITIAL_SEEDS_PER_COLOR, INITIAL_SEEDS_PER_COLOR); TOTAL_HOLES],
            captured: [0, 0],
            current_player: first,
        }
    }

    /// Build an arbitrary position. Hole seeds plus both stores must add up
    /// to the full seed count.
    pub fn from_parts(holes: [Hole; TOTAL_HOLES], captured: [u32; 2], current_player: Side) -> Result<Self, BoardError> {
        let board = Self { holes, captured, current_player };
        let found = captured
            .iter()
            .try_fold(board.seeds_on_board(), |total, &store| total.checked_add(store))
            .unwrap_or(u32::MAX);
        if found != TOTAL_SEEDS {
            return Err(BoardError::SeedCount { found });
        }
        Ok(board)
    }

    pub fn holes(&self) -> &[Hole; TOTAL_HOLES] {
        &self.holes
    }

    pub fn hole(&self, hole: usize) -> Hole {
        self.holes[hole]
    }

    pub fn seeds(&self, hole: usize, color: SeedColor) -> u8 {
        self.holes[hole].seeds(color)
    }

    pub fn hole_total(&self, hole: usize) -> u32 {
        self.holes[hole].total()
    }

    pub fn has_seeds(&self, hole: usize, color: SeedColor) -> bool {
        hole < TOTAL_HOLES && self.seeds(hole, color) > 0
    }

    pub fn captured(&self, side: Side) -> u32 {
        self.captured[side.index()]
    }

    pub fn current_player(&self) -> Side {
        self.current_player
    }

    pub fn switch_player(&mut self) {
        self.current_player = self.current_player.opponent();
    }

    pub fn set_current_player(&mut self, side: Side) {
        self.current_player = side;
    }

    pub fn seeds_on_board(&self) -> u32 {
        self.holes.iter().map(Hole::total).sum()
    }

    pub fn seeds_in_row(&self, side: Side) -> u32 {
        side.owned_holes().iter_ones().map(|hole| self.holes[hole].total()).sum()
    }

    pub fn occupied_holes(&self) -> HoleMask {
        let mut mask = empty_mask();
        for (hole, seeds) in self.holes.iter().enumerate() {
            mask.set(hole, !seeds.is_empty());
        }
        mask
    }

    /// Whether `side` owns at least one non-empty hole.
    pub fn has_moves(&self, side: Side) -> bool {
        (self.occupied_holes() & side.owned_holes()).any()
    }

    pub fn validate(&self, mv: Move) -> Result<(), InvalidMove> {
        if mv.hole >= TOTAL_HOLES {
            return Err(InvalidMove::HoleOutOfRange { hole: mv.hole });
        }
        if !self.current_player.owns(mv.hole) {
            return Err(InvalidMove::NotOwned { hole: mv.hole, side: self.current_player });
        }
        if !self.has_seeds(mv.hole, mv.color) {
            return Err(InvalidMove::NoSeeds { hole: mv.hole, color: mv.color });
        }
        Ok(())
    }

    pub fn play(&mut self, mv: Move) -> Result<u32, InvalidMove> {
        self.sow_seeds(mv.hole, mv.color)
    }

    /// Sow every `color` seed out of `hole` for the current player, then
    /// resolve captures from the landing hole. Returns the seeds captured.
    /// The current player is not switched.
    pub fn sow_seeds(&mut self, hole: usize, color: SeedColor) -> Result<u32, InvalidMove> {
        self.validate(Move::new(hole, color))?;

        let seeds = self.holes[hole].take(color);
        let landing = match color {
            SeedColor::Blue => self.sow_blue(hole, seeds),
            SeedColor::Red => self.sow_red(hole, seeds),
        };
        let captured = self.capture_seeds(self.current_player, landing);
        self.debug_assert_conserved();
        Ok(captured)
    }

    fn sow_blue(&mut self, origin: usize, seeds: u8) -> usize {
        let mut pos = origin;
        let mut left = seeds;
        while left > 0 {
            pos = (pos + 1) % TOTAL_HOLES;
            if pos == origin {
                continue;
            }
            self.holes[pos].drop_seed(SeedColor::Blue);
            left -= 1;
        }
        pos
    }

    // every other hole starting next to the origin, i.e. only the opponent's row
    fn sow_red(&mut self, origin: usize, seeds: u8) -> usize {
        let mut pos = (origin + 1) % TOTAL_HOLES;
        let mut landing = pos;
        for _ in 0..seeds {
            self.holes[pos].drop_seed(SeedColor::Red);
            landing = pos;
            pos = (pos + 2) % TOTAL_HOLES;
        }
        landing
    }

    /// Capture backwards from `landing` while holes hold exactly 2 or 3
    /// seeds in total. Returns the number of seeds captured.
    pub fn capture_seeds(&mut self, side: Side, landing: usize) -> u32 {
        let mut pos = landing % TOTAL_HOLES;
        let mut taken = 0;
        loop {
            let total = self.holes[pos].total();
            if total != 2 && total != 3 {
                break;
            }
            taken += self.holes[pos].clear();
            pos = (pos + TOTAL_HOLES - 1) % TOTAL_HOLES;
        }
        self.captured[side.index()] += taken;
        taken
    }

    /// Evaluate the end-of-game rules in priority order. When the player to
    /// move is stuck, the opponent collects every seed left on the board, so
    /// call this at most once per turn boundary.
    pub fn check_game_status(&mut self) -> GameStatus {
        if let Some(status) = self.settled_status() {
            return status;
        }
        if !self.has_moves(self.current_player) {
            let collector = self.current_player.opponent();
            let remaining: u32 = self.holes.iter_mut().map(Hole::clear).sum();
            self.captured[collector.index()] += remaining;
            self.debug_assert_conserved();
            return GameStatus::over(self.leader(), EndReason::NoLegalMoves);
        }
        GameStatus::ongoing()
    }

    /// Same verdict as `check_game_status` without touching the board.
    pub fn peek_status(&self) -> GameStatus {
        self.clone().check_game_status()
    }

    // rules that only read the stores and the seed count
    fn settled_status(&self) -> Option<GameStatus> {
        for side in Side::BOTH {
            if self.captured(side) >= WINNING_THRESHOLD {
                return Some(GameStatus::over(Outcome::Winner(side), EndReason::ThresholdReached));
            }
        }
        if self.captured(Side::One) == EVEN_SPLIT && self.captured(Side::Two) == EVEN_SPLIT {
            return Some(GameStatus::over(Outcome::Draw, EndReason::EvenSplit));
        }
        if self.seeds_on_board() < MIN_SEEDS_ON_BOARD {
            return Some(GameStatus::over(self.leader(), EndReason::InsufficientSeeds));
        }
        None
    }

    fn leader(&self) -> Outcome {
        let (one, two) = (self.captured(Side::One), self.captured(Side::Two));
        if one > two {
            Outcome::Winner(Side::One)
        } else if two > one {
            Outcome::Winner(Side::Two)
        } else {
            Outcome::Draw
        }
    }

    fn debug_assert_conserved(&self) {
        debug_assert_eq!(
            self.seeds_on_board() + self.captured[0] + self.captured[1],
            TOTAL_SEEDS,
            "seed count invariant broken: {:?}",
            self
        );
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for side in Side::BOTH {
            write!(f, "{} ({:>2} captured):", side, self.captured(side))?;
            for hole in side.owned_holes().iter_ones() {
                let seeds = self.holes[hole];
                write!(f, " {:>2}:{}B{}R", hole + 1, seeds.blue, seeds.red)?;
            }
            writeln!(f)?;
        }
        write!(f, "{} to move", self.current_player)
    }
}
