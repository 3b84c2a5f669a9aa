//! Known-map table.
//!
//! Maps are identified in the replay header by a 64-bit token. Tokens were
//! recovered empirically; an unrecognized token degrades to
//! [`Map::Unknown`] rather than failing the parse.

use serde::Serialize;
use std::fmt;

/// A playable map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum Map {
    Bank,
    Border,
    Chalet,
    ClubHouse,
    Coastline,
    Consulate,
    EmeraldPlains,
    Favela,
    Fortress,
    HerefordBase,
    House,
    KafeDostoyevsky,
    Kanal,
    NighthavenLabs,
    Oregon,
    Outback,
    PresidentialPlane,
    Skyscraper,
    StadiumBravo,
    ThemePark,
    Tower,
    Villa,
    Yacht,
    /// Token not present in the table.
    Unknown,
}

impl Map {
    /// Resolves a 64-bit map token from the header.
    ///
    /// Unknown tokens yield [`Map::Unknown`]; they never fail the parse.
    #[must_use]
    pub fn from_id(id: u64) -> Self {
        match id {
            0x0000_5DCA_9649_3AEC => Map::Bank,
            0x0000_5DCA_9649_5C5D => Map::Border,
            0x0000_5DCA_9649_18F3 => Map::Chalet,
            0x0000_5DCA_9649_02B4 => Map::ClubHouse,
            0x0000_5DCA_9649_7A01 => Map::Coastline,
            0x0000_5DCA_9649_334E => Map::Consulate,
            0x0000_5DCA_9649_E4B2 => Map::EmeraldPlains,
            0x0000_5DCA_9649_BD10 => Map::Favela,
            0x0000_5DCA_9649_8C77 => Map::Fortress,
            0x0000_5DCA_9649_55DE => Map::HerefordBase,
            0x0000_5DCA_9649_6A39 => Map::House,
            0x0000_5DCA_9649_90AF => Map::KafeDostoyevsky,
            0x0000_5DCA_9649_21C8 => Map::Kanal,
            0x0000_5DCA_9649_F503 => Map::NighthavenLabs,
            0x0000_5DCA_9649_4D62 => Map::Oregon,
            0x0000_5DCA_9649_A97B => Map::Outback,
            0x0000_5DCA_9649_DD24 => Map::PresidentialPlane,
            0x0000_5DCA_9649_67E5 => Map::Skyscraper,
            0x0000_5DCA_9649_C186 => Map::StadiumBravo,
            0x0000_5DCA_9649_3847 => Map::ThemePark,
            0x0000_5DCA_9649_85F8 => Map::Tower,
            0x0000_5DCA_9649_1209 => Map::Villa,
            0x0000_5DCA_9649_7FBA => Map::Yacht,
            _ => Map::Unknown,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Map::Bank => "Bank",
            Map::Border => "Border",
            Map::Chalet => "Chalet",
            Map::ClubHouse => "Club House",
            Map::Coastline => "Coastline",
            Map::Consulate => "Consulate",
            Map::EmeraldPlains => "Emerald Plains",
            Map::Favela => "Favela",
            Map::Fortress => "Fortress",
            Map::HerefordBase => "Hereford Base",
            Map::House => "House",
            Map::KafeDostoyevsky => "Kafe Dostoyevsky",
            Map::Kanal => "Kanal",
            Map::NighthavenLabs => "Nighthaven Labs",
            Map::Oregon => "Oregon",
            Map::Outback => "Outback",
            Map::PresidentialPlane => "Presidential Plane",
            Map::Skyscraper => "Skyscraper",
            Map::StadiumBravo => "Stadium Bravo",
            Map::ThemePark => "Theme Park",
            Map::Tower => "Tower",
            Map::Villa => "Villa",
            Map::Yacht => "Yacht",
            Map::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
