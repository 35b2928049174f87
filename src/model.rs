use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use url::form_urlencoded;

use crate::util::letters_only;

pub const ALL: &str = "All";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub enum Kind {
    Achievement,
    ArtifactCollection,
    Item,
    #[serde(rename = "NPC")]
    Npc,
    Quest,
    Recipe,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Self::Achievement,
        Self::ArtifactCollection,
        Self::Item,
        Self::Npc,
        Self::Quest,
        Self::Recipe,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Achievement => "Achievement",
            Self::ArtifactCollection => "ArtifactCollection",
            Self::Item => "Item",
            Self::Npc => "NPC",
            Self::Quest => "Quest",
            Self::Recipe => "Recipe",
        }
    }

    /// Exact, case-sensitive match against the stored kind names.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Path segment used by the public asset viewer.
    pub fn asset_token(self) -> &'static str {
        match self {
            Self::Achievement => "achievement",
            Self::ArtifactCollection => "artifactset",
            Self::Item => "item",
            Self::Npc => "npc",
            Self::Quest => "quest",
            Self::Recipe => "recipe",
        }
    }

    pub fn heading(self) -> String {
        format!("{}s", self.as_str())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Region {
    NorthAmerica,
    Europe,
}

impl Region {
    pub fn label(self) -> &'static str {
        match self {
            Self::NorthAmerica => "NA",
            Self::Europe => "EU",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Shard {
    Deepwood,
    Faeblight,
    Greybriar,
    Hailol,
    Laethys,
    Seastone,
    Wolfsbane,
    Bloodiron,
    Brisesol,
    Brutwacht,
    Gelidra,
    Typhiria,
    Zaviel,
}

impl Shard {
    pub const ALL: [Shard; 13] = [
        Self::Deepwood,
        Self::Faeblight,
        Self::Greybriar,
        Self::Hailol,
        Self::Laethys,
        Self::Seastone,
        Self::Wolfsbane,
        Self::Bloodiron,
        Self::Brisesol,
        Self::Brutwacht,
        Self::Gelidra,
        Self::Typhiria,
        Self::Zaviel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deepwood => "Deepwood",
            Self::Faeblight => "Faeblight",
            Self::Greybriar => "Greybriar",
            Self::Hailol => "Hailol",
            Self::Laethys => "Laethys",
            Self::Seastone => "Seastone",
            Self::Wolfsbane => "Wolfsbane",
            Self::Bloodiron => "Bloodiron",
            Self::Brisesol => "Brisesol",
            Self::Brutwacht => "Brutwacht",
            Self::Gelidra => "Gelidra",
            Self::Typhiria => "Typhiria",
            Self::Zaviel => "Zaviel",
        }
    }

    pub fn region(self) -> Region {
        match self {
            Self::Deepwood
            | Self::Faeblight
            | Self::Greybriar
            | Self::Hailol
            | Self::Laethys
            | Self::Seastone
            | Self::Wolfsbane => Region::NorthAmerica,
            Self::Bloodiron
            | Self::Brisesol
            | Self::Brutwacht
            | Self::Gelidra
            | Self::Typhiria
            | Self::Zaviel => Region::Europe,
        }
    }

    pub fn in_region(region: Region) -> impl Iterator<Item = Shard> {
        Self::ALL
            .into_iter()
            .filter(move |shard| shard.region() == region)
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|shard| shard.as_str() == value)
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated search. `None` for `shard` or `kind` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub player: String,
    pub guild: String,
    pub shard: Option<Shard>,
    pub kind: Option<Kind>,
}

impl SearchCriteria {
    pub fn normalize(player: &str, guild: &str, shard: &str, kind: &str) -> Self {
        Self {
            player: letters_only(player),
            guild: letters_only(guild),
            shard: Shard::parse(shard),
            kind: Kind::parse(kind),
        }
    }

    /// Never fails: unknown keys are ignored, repeated keys keep the last value.
    pub fn from_form_body(body: &[u8]) -> Self {
        let mut player = String::new();
        let mut guild = String::new();
        let mut shard = String::new();
        let mut kind = String::new();

        for (key, value) in form_urlencoded::parse(body) {
            match key.as_ref() {
                "player" => player = value.into_owned(),
                "guild" => guild = value.into_owned(),
                "shard" => shard = value.into_owned(),
                "kind" => kind = value.into_owned(),
                _ => {}
            }
        }

        Self::normalize(&player, &guild, &shard, &kind)
    }

    pub fn has_name_filter(&self) -> bool {
        !self.player.is_empty() || !self.guild.is_empty()
    }

    pub fn shard_label(&self) -> &'static str {
        self.shard.map(Shard::as_str).unwrap_or(ALL)
    }

    pub fn kind_label(&self) -> &'static str {
        self.kind.map(Kind::as_str).unwrap_or(ALL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirstRecord {
    pub kind: Kind,
    pub what: String,
    pub player: String,
    pub shard: String,
    pub guild: String,
    pub stamp: NaiveDateTime,
    pub id: String,
}

impl FirstRecord {
    pub fn player_at_shard(&self) -> String {
        format!("{}@{}", self.player, self.shard)
    }

    pub fn asset_url(&self) -> String {
        format!(
            "https://rift.magelo.com/en/{}/{}",
            self.kind.asset_token(),
            self.id
        )
    }
}
