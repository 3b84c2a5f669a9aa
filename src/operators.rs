//! Known-operator table.
//!
//! Operators are identified in the replay by a 64-bit token. The table was
//! recovered empirically across game versions; unknown tokens degrade to
//! [`Operator::Unknown`] and never fail the parse.

use serde::Serialize;
use std::fmt;

/// Which side of the round a team or operator plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    /// Attacking side.
    Attack,
    /// Defending side.
    Defense,
    /// Side could not be determined.
    Unknown,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Attack => write!(f, "Attack"),
            Side::Defense => write!(f, "Defense"),
            Side::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A playable operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum Operator {
    // Attackers
    Sledge,
    Thatcher,
    Ash,
    Thermite,
    Twitch,
    Montagne,
    Glaz,
    Fuze,
    Blitz,
    Iq,
    Buck,
    Blackbeard,
    Capitao,
    Hibana,
    Jackal,
    Ying,
    Zofia,
    Dokkaebi,
    Lion,
    Finka,
    Maverick,
    Nomad,
    Gridlock,
    Nokk,
    Amaru,
    Kali,
    Iana,
    Ace,
    Zero,
    Flores,
    Osa,
    Sens,
    Grim,
    Brava,
    Ram,
    Deimos,
    // Defenders
    Smoke,
    Mute,
    Castle,
    Pulse,
    Doc,
    Rook,
    Kapkan,
    Tachanka,
    Jager,
    Bandit,
    Frost,
    Valkyrie,
    Caveira,
    Echo,
    Mira,
    Lesion,
    Ela,
    Vigil,
    Maestro,
    Alibi,
    Clash,
    Kaid,
    Mozzie,
    Warden,
    Goyo,
    Wamai,
    Oryx,
    Melusi,
    Aruni,
    Thunderbird,
    Thorn,
    Azami,
    Solis,
    Fenrir,
    Tubarao,
    /// Token not present in the table.
    Unknown,
}

impl Operator {
    /// Resolves a 64-bit operator token from the replay.
    ///
    /// Unknown tokens yield [`Operator::Unknown`]; they never fail the
    /// parse.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn from_id(id: u64) -> Self {
        match id {
            0x0000_92E0_6AA6_0F21 => Operator::Sledge,
            0x0000_92E0_6AA6_11C5 => Operator::Thatcher,
            0x0000_92E0_6AA6_20B3 => Operator::Ash,
            0x0000_92E0_6AA6_24D7 => Operator::Thermite,
            0x0000_92E0_6AA6_3188 => Operator::Twitch,
            0x0000_92E0_6AA6_352A => Operator::Montagne,
            0x0000_92E0_6AA6_40FE => Operator::Glaz,
            0x0000_92E0_6AA6_449C => Operator::Fuze,
            0x0000_92E0_6AA6_521E => Operator::Blitz,
            0x0000_92E0_6AA6_5613 => Operator::Iq,
            0x0000_92E0_6AA6_61A7 => Operator::Buck,
            0x0000_92E0_6AA6_65F0 => Operator::Blackbeard,
            0x0000_92E0_6AA6_7032 => Operator::Capitao,
            0x0000_92E0_6AA6_74B9 => Operator::Hibana,
            0x0000_92E0_6AA6_8145 => Operator::Jackal,
            0x0000_92E0_6AA6_85E8 => Operator::Ying,
            0x0000_92E0_6AA6_9093 => Operator::Zofia,
            0x0000_92E0_6AA6_94D1 => Operator::Dokkaebi,
            0x0000_92E0_6AA6_A1C4 => Operator::Lion,
            0x0000_92E0_6AA6_A53F => Operator::Finka,
            0x0000_92E0_6AA6_B071 => Operator::Maverick,
            0x0000_92E0_6AA6_B4E2 => Operator::Nomad,
            0x0000_92E0_6AA6_C186 => Operator::Gridlock,
            0x0000_92E0_6AA6_C529 => Operator::Nokk,
            0x0000_92E0_6AA6_D0BD => Operator::Amaru,
            0x0000_92E0_6AA6_D45A => Operator::Kali,
            0x0000_92E0_6AA6_E197 => Operator::Iana,
            0x0000_92E0_6AA6_E508 => Operator::Ace,
            0x0000_92E0_6AA6_F0EC => Operator::Zero,
            0x0000_92E0_6AA6_F463 => Operator::Flores,
            0x0000_92E0_6AA7_0124 => Operator::Osa,
            0x0000_92E0_6AA7_05B8 => Operator::Sens,
            0x0000_92E0_6AA7_10D6 => Operator::Grim,
            0x0000_92E0_6AA7_1492 => Operator::Brava,
            0x0000_92E0_6AA7_213B => Operator::Ram,
            0x0000_92E0_6AA7_25A7 => Operator::Deimos,
            0x0000_92E0_6AA7_30F9 => Operator::Smoke,
            0x0000_92E0_6AA7_3465 => Operator::Mute,
            0x0000_92E0_6AA7_4128 => Operator::Castle,
            0x0000_92E0_6AA7_45C3 => Operator::Pulse,
            0x0000_92E0_6AA7_5071 => Operator::Doc,
            0x0000_92E0_6AA7_54BD => Operator::Rook,
            0x0000_92E0_6AA7_6119 => Operator::Kapkan,
            0x0000_92E0_6AA7_65E4 => Operator::Tachanka,
            0x0000_92E0_6AA7_7093 => Operator::Jager,
            0x0000_92E0_6AA7_742F => Operator::Bandit,
            0x0000_92E0_6AA7_81D6 => Operator::Frost,
            0x0000_92E0_6AA7_8548 => Operator::Valkyrie,
            0x0000_92E0_6AA7_90AB => Operator::Caveira,
            0x0000_92E0_6AA7_9417 => Operator::Echo,
            0x0000_92E0_6AA7_A1F2 => Operator::Mira,
            0x0000_92E0_6AA7_A586 => Operator::Lesion,
            0x0000_92E0_6AA7_B034 => Operator::Ela,
            0x0000_92E0_6AA7_B4C8 => Operator::Vigil,
            0x0000_92E0_6AA7_C17D => Operator::Maestro,
            0x0000_92E0_6AA7_C5E1 => Operator::Alibi,
            0x0000_92E0_6AA7_D092 => Operator::Clash,
            0x0000_92E0_6AA7_D426 => Operator::Kaid,
            0x0000_92E0_6AA7_E1B5 => Operator::Mozzie,
            0x0000_92E0_6AA7_E573 => Operator::Warden,
            0x0000_92E0_6AA7_F038 => Operator::Goyo,
            0x0000_92E0_6AA7_F4AC => Operator::Wamai,
            0x0000_92E0_6AA8_015E => Operator::Oryx,
            0x0000_92E0_6AA8_05D9 => Operator::Melusi,
            0x0000_92E0_6AA8_1087 => Operator::Aruni,
            0x0000_92E0_6AA8_1423 => Operator::Thunderbird,
            0x0000_92E0_6AA8_21EA => Operator::Thorn,
            0x0000_92E0_6AA8_256C => Operator::Azami,
            0x0000_92E0_6AA8_30B1 => Operator::Solis,
            0x0000_92E0_6AA8_3445 => Operator::Fenrir,
            0x0000_92E0_6AA8_41FE => Operator::Tubarao,
            _ => Operator::Unknown,
        }
    }

    /// Returns the side this operator plays.
    #[must_use]
    pub fn side(&self) -> Side {
        use Operator::{
            Ace, Alibi, Amaru, Aruni, Ash, Azami, Bandit, Blackbeard, Blitz, Brava, Buck, Capitao,
            Castle, Caveira, Clash, Deimos, Doc, Dokkaebi, Echo, Ela, Fenrir, Finka, Flores, Frost,
            Fuze, Glaz, Goyo, Grim, Gridlock, Hibana, Iana, Iq, Jackal, Jager, Kaid, Kali, Kapkan,
            Lesion, Lion, Maestro, Maverick, Melusi, Mira, Montagne, Mozzie, Mute, Nokk, Nomad,
            Oryx, Osa, Pulse, Ram, Rook, Sens, Sledge, Smoke, Solis, Tachanka, Thatcher, Thermite,
            Thorn, Thunderbird, Tubarao, Twitch, Unknown, Valkyrie, Vigil, Wamai, Warden, Ying,
            Zero, Zofia,
        };
        match self {
            Sledge | Thatcher | Ash | Thermite | Twitch | Montagne | Glaz | Fuze | Blitz | Iq
            | Buck | Blackbeard | Capitao | Hibana | Jackal | Ying | Zofia | Dokkaebi | Lion
            | Finka | Maverick | Nomad | Gridlock | Nokk | Amaru | Kali | Iana | Ace | Zero
            | Flores | Osa | Sens | Grim | Brava | Ram | Deimos => Side::Attack,
            Smoke | Mute | Castle | Pulse | Doc | Rook | Kapkan | Tachanka | Jager | Bandit
            | Frost | Valkyrie | Caveira | Echo | Mira | Lesion | Ela | Vigil | Maestro | Alibi
            | Clash | Kaid | Mozzie | Warden | Goyo | Wamai | Oryx | Melusi | Aruni
            | Thunderbird | Thorn | Azami | Solis | Fenrir | Tubarao => Side::Defense,
            Unknown => Side::Unknown,
        }
    }

    /// Returns the display name.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Sledge => "Sledge",
            Operator::Thatcher => "Thatcher",
            Operator::Ash => "Ash",
            Operator::Thermite => "Thermite",
            Operator::Twitch => "Twitch",
            Operator::Montagne => "Montagne",
            Operator::Glaz => "Glaz",
            Operator::Fuze => "Fuze",
            Operator::Blitz => "Blitz",
            Operator::Iq => "IQ",
            Operator::Buck => "Buck",
            Operator::Blackbeard => "Blackbeard",
            Operator::Capitao => "Capitao",
            Operator::Hibana => "Hibana",
            Operator::Jackal => "Jackal",
            Operator::Ying => "Ying",
            Operator::Zofia => "Zofia",
            Operator::Dokkaebi => "Dokkaebi",
            Operator::Lion => "Lion",
            Operator::Finka => "Finka",
            Operator::Maverick => "Maverick",
            Operator::Nomad => "Nomad",
            Operator::Gridlock => "Gridlock",
            Operator::Nokk => "Nokk",
            Operator::Amaru => "Amaru",
            Operator::Kali => "Kali",
            Operator::Iana => "Iana",
            Operator::Ace => "Ace",
            Operator::Zero => "Zero",
            Operator::Flores => "Flores",
            Operator::Osa => "Osa",
            Operator::Sens => "Sens",
            Operator::Grim => "Grim",
            Operator::Brava => "Brava",
            Operator::Ram => "Ram",
            Operator::Deimos => "Deimos",
            Operator::Smoke => "Smoke",
            Operator::Mute => "Mute",
            Operator::Castle => "Castle",
            Operator::Pulse => "Pulse",
            Operator::Doc => "Doc",
            Operator::Rook => "Rook",
            Operator::Kapkan => "Kapkan",
            Operator::Tachanka => "Tachanka",
            Operator::Jager => "Jager",
            Operator::Bandit => "Bandit",
            Operator::Frost => "Frost",
            Operator::Valkyrie => "Valkyrie",
            Operator::Caveira => "Caveira",
            Operator::Echo => "Echo",
            Operator::Mira => "Mira",
            Operator::Lesion => "Lesion",
            Operator::Ela => "Ela",
            Operator::Vigil => "Vigil",
            Operator::Maestro => "Maestro",
            Operator::Alibi => "Alibi",
            Operator::Clash => "Clash",
            Operator::Kaid => "Kaid",
            Operator::Mozzie => "Mozzie",
            Operator::Warden => "Warden",
            Operator::Goyo => "Goyo",
            Operator::Wamai => "Wamai",
            Operator::Oryx => "Oryx",
            Operator::Melusi => "Melusi",
            Operator::Aruni => "Aruni",
            Operator::Thunderbird => "Thunderbird",
            Operator::Thorn => "Thorn",
            Operator::Azami => "Azami",
            Operator::Solis => "Solis",
            Operator::Fenrir => "Fenrir",
            Operator::Tubarao => "Tubarao",
            Operator::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
