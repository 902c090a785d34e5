//! Contracts with the excluded combat and rendering layers.
//!
//! The engine never computes battler placement, owns a random source, or
//! uploads graphics. It asks a [`BattleEnv`] for what it needs and refers to
//! image/palette resources only through opaque [`ResourceTag`]s.

use serde::{Deserialize, Serialize};

use crate::motion::Point;

/// Which combatant an effect refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlerRole {
    Attacker,
    Target,
    AttackerPartner,
    TargetPartner,
}

/// Side of the field a combatant belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Opponent,
}

/// Slot of a combatant within its side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlerPosition {
    PlayerLeft,
    OpponentLeft,
    PlayerRight,
    OpponentRight,
}

/// Which coordinate of a combatant's sprite to query.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordKind {
    /// Anchor of the battler sprite.
    X,
    Y,
    /// Visual center of the picture, including per-species offsets.
    PicX,
    PicY,
}

/// Opaque reference to an image or palette resource owned by the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceTag(pub u16);

impl ResourceTag {
    pub const RAIN_DROPS: ResourceTag = ResourceTag(10_000);
    pub const BUBBLE: ResourceTag = ResourceTag(10_001);
    pub const RAINBOW_RINGS: ResourceTag = ResourceTag(10_002);
    pub const WATER_ORB: ResourceTag = ResourceTag(10_003);
    pub const GLOWY_BLUE_ORB: ResourceTag = ResourceTag(10_005);
    pub const SURF_BACKGROUND: ResourceTag = ResourceTag(10_006);
}

/// What the renderer needs to draw a sprite; the engine only carries it around.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteTemplate {
    pub tile_tag: ResourceTag,
    pub palette_tag: ResourceTag,
    /// Sprite uses an affine transform and therefore owns a matrix.
    pub affine: bool,
}

impl SpriteTemplate {
    pub const fn new(tag: ResourceTag, affine: bool) -> Self {
        Self {
            tile_tag: tag,
            palette_tag: tag,
            affine,
        }
    }

    /// Template with no image, used for helper sprites that are never drawn.
    pub const fn invisible() -> Self {
        Self::new(ResourceTag(0), false)
    }
}

/// Services the engine consumes from the combat layer.
pub trait BattleEnv: std::fmt::Debug {
    /// Screen-space coordinate of a combatant's sprite.
    fn battler_coord(&self, role: BattlerRole, kind: CoordKind) -> i16;

    fn battler_side(&self, role: BattlerRole) -> Side;

    fn battler_position(&self, role: BattlerRole) -> BattlerPosition;

    /// Draw order of the combatant's sprite; effect sprites are placed relative to it.
    fn battler_subpriority(&self, role: BattlerRole) -> u8;

    /// `(hp, max_hp)` of a combatant.
    fn battler_hp(&self, role: BattlerRole) -> (u16, u16);

    /// Contest presentation mirrors several effects.
    fn is_contest(&self) -> bool {
        false
    }

    /// Palette bank currently holding the resource's colors, if it is loaded.
    fn palette_bank(&self, tag: ResourceTag) -> Option<u8>;

    /// Uniformly distributed 16-bit random value.
    fn random(&mut self) -> u16;

    /// Picture-center coordinates of a combatant.
    fn battler_pic(&self, role: BattlerRole) -> Point {
        Point::new(
            self.battler_coord(role, CoordKind::PicX) as i32,
            self.battler_coord(role, CoordKind::PicY) as i32,
        )
    }
}

/// Placement of one combatant in a [`StaticEnv`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlerLayout {
    pub role: BattlerRole,
    pub side: Side,
    pub position: BattlerPosition,
    pub x: i16,
    pub y: i16,
    pub pic_x: i16,
    pub pic_y: i16,
    #[serde(default)]
    pub subpriority: u8,
    #[serde(default = "default_hp")]
    pub hp: u16,
    #[serde(default = "default_hp")]
    pub max_hp: u16,
}

fn default_hp() -> u16 {
    100
}

/// Palette bank assignment of a resource in a [`StaticEnv`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteBinding {
    pub tag: ResourceTag,
    pub bank: u8,
}

/// Fixed battle layout with a seeded xorshift random source.
///
/// Deserializes from JSON so tests and headless hosts can describe a battle
/// without a combat layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticEnv {
    #[serde(default)]
    pub contest: bool,
    pub battlers: Vec<BattlerLayout>,
    #[serde(default)]
    pub palettes: Vec<PaletteBinding>,
    #[serde(default = "default_seed")]
    pub seed: u32,
    #[serde(skip)]
    rng_state: u32,
}

fn default_seed() -> u32 {
    0x2545_F491
}

impl StaticEnv {
    pub fn new(battlers: Vec<BattlerLayout>) -> Self {
        Self {
            contest: false,
            battlers,
            palettes: Vec::new(),
            seed: default_seed(),
            rng_state: 0,
        }
    }

    /// Player attacker at the lower left, opponent target at the upper right.
    pub fn singles() -> Self {
        Self::new(vec![
            BattlerLayout {
                role: BattlerRole::Attacker,
                side: Side::Player,
                position: BattlerPosition::PlayerLeft,
                x: 72,
                y: 80,
                pic_x: 72,
                pic_y: 88,
                subpriority: 30,
                hp: 100,
                max_hp: 100,
            },
            BattlerLayout {
                role: BattlerRole::Target,
                side: Side::Opponent,
                position: BattlerPosition::OpponentLeft,
                x: 176,
                y: 40,
                pic_x: 176,
                pic_y: 40,
                subpriority: 20,
                hp: 100,
                max_hp: 100,
            },
        ])
    }

    /// Same layout with attacker and target sides exchanged.
    pub fn singles_from_opponent() -> Self {
        let mut env = Self::singles();
        for b in &mut env.battlers {
            match b.role {
                BattlerRole::Attacker => {
                    b.side = Side::Opponent;
                    b.position = BattlerPosition::OpponentLeft;
                    (b.x, b.y, b.pic_x, b.pic_y) = (176, 40, 176, 40);
                }
                BattlerRole::Target => {
                    b.side = Side::Player;
                    b.position = BattlerPosition::PlayerLeft;
                    (b.x, b.y, b.pic_x, b.pic_y) = (72, 80, 72, 88);
                }
                _ => {}
            }
        }
        env
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self.rng_state = 0;
        self
    }

    pub fn with_palette(mut self, tag: ResourceTag, bank: u8) -> Self {
        self.palettes.push(PaletteBinding { tag, bank });
        self
    }

    /// Layout entry for a role; roles missing from the layout fall back to the target.
    fn layout(&self, role: BattlerRole) -> Option<&BattlerLayout> {
        self.battlers
            .iter()
            .find(|b| b.role == role)
            .or_else(|| self.battlers.iter().find(|b| b.role == BattlerRole::Target))
    }
}

impl BattleEnv for StaticEnv {
    fn battler_coord(&self, role: BattlerRole, kind: CoordKind) -> i16 {
        self.layout(role)
            .map(|b| match kind {
                CoordKind::X => b.x,
                CoordKind::Y => b.y,
                CoordKind::PicX => b.pic_x,
                CoordKind::PicY => b.pic_y,
            })
            .unwrap_or(0)
    }

    fn battler_side(&self, role: BattlerRole) -> Side {
        self.layout(role).map(|b| b.side).unwrap_or(Side::Opponent)
    }

    fn battler_position(&self, role: BattlerRole) -> BattlerPosition {
        self.layout(role)
            .map(|b| b.position)
            .unwrap_or(BattlerPosition::OpponentLeft)
    }

    fn battler_subpriority(&self, role: BattlerRole) -> u8 {
        self.layout(role).map(|b| b.subpriority).unwrap_or(0)
    }

    fn battler_hp(&self, role: BattlerRole) -> (u16, u16) {
        self.layout(role).map(|b| (b.hp, b.max_hp)).unwrap_or((0, 0))
    }

    fn is_contest(&self) -> bool {
        self.contest
    }

    fn palette_bank(&self, tag: ResourceTag) -> Option<u8> {
        self.palettes.iter().find(|p| p.tag == tag).map(|p| p.bank)
    }

    fn random(&mut self) -> u16 {
        if self.rng_state == 0 {
            self.rng_state = self.seed.max(1);
        }
        // xorshift32
        let mut s = self.rng_state;
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        self.rng_state = s;
        (s >> 16) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singles_layout_answers_queries() {
        let env = StaticEnv::singles();
        assert_eq!(env.battler_side(BattlerRole::Attacker), Side::Player);
        assert_eq!(env.battler_pic(BattlerRole::Target), Point::new(176, 40));
        assert_eq!(env.battler_coord(BattlerRole::Attacker, CoordKind::Y), 80);
        // partners fall back to the target
        assert_eq!(env.battler_side(BattlerRole::TargetPartner), Side::Opponent);
        assert_eq!(env.battler_position(BattlerRole::Attacker), BattlerPosition::PlayerLeft);
        assert_eq!(env.battler_position(BattlerRole::AttackerPartner), BattlerPosition::OpponentLeft);

        let flipped = StaticEnv::singles_from_opponent();
        assert_eq!(flipped.battler_position(BattlerRole::Attacker), BattlerPosition::OpponentLeft);
        assert_eq!(flipped.battler_position(BattlerRole::Target), BattlerPosition::PlayerLeft);
    }

    #[test]
    fn missing_battlers_answer_with_fallbacks() {
        let env = StaticEnv::new(Vec::new());
        assert_eq!(env.battler_position(BattlerRole::Attacker), BattlerPosition::OpponentLeft);
        assert_eq!(env.battler_subpriority(BattlerRole::Target), 0);
        assert_eq!(env.palette_bank(ResourceTag::SURF_BACKGROUND), None);
    }

    #[test]
    fn random_is_deterministic_per_seed() {
        let mut a = StaticEnv::singles().with_seed(7);
        let mut b = StaticEnv::singles().with_seed(7);
        let xs: Vec<u16> = (0..8).map(|_| a.random()).collect();
        let ys: Vec<u16> = (0..8).map(|_| b.random()).collect();
        assert_eq!(xs, ys);
        assert!(xs.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn deserializes_with_defaults() {
        let env: StaticEnv = serde_json::from_str(
            r#"{
                "battlers": [
                    { "role": "attacker", "side": "player", "position": "player_left",
                      "x": 1, "y": 2, "pic_x": 3, "pic_y": 4 }
                ],
                "palettes": [ { "tag": 10002, "bank": 3 } ]
            }"#,
        )
        .unwrap();
        assert!(!env.contest);
        assert_eq!(env.battler_hp(BattlerRole::Attacker), (100, 100));
        assert_eq!(env.palette_bank(ResourceTag::RAINBOW_RINGS), Some(3));
    }
}
