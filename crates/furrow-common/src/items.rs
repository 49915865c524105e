//! Crop and item kinds.

use serde::{Deserialize, Serialize};

/// Kind of crop that can be planted in tilled soil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    /// Carrot
    #[default]
    Carrot,
    /// Wheat
    Wheat,
    /// Tomato
    Tomato,
    /// Pumpkin
    Pumpkin,
}

impl CropType {
    /// All crop types, in hotbar order.
    pub const ALL: [Self; 4] = [Self::Carrot, Self::Wheat, Self::Tomato, Self::Pumpkin];

    /// Get the display name of this crop.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Carrot => "Carrot",
            Self::Wheat => "Wheat",
            Self::Tomato => "Tomato",
            Self::Pumpkin => "Pumpkin",
        }
    }
}

/// Kind of item carried by a world drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Harvested produce
    Crop(CropType),
    /// Seeds that plant the given crop
    Seed(CropType),
    /// Wood from chopped trees
    Wood,
}

impl ItemKind {
    /// Get the display name of this item.
    #[must_use]
    pub fn display_name(self) -> String {
        match self {
            Self::Crop(crop) => crop.display_name().to_string(),
            Self::Seed(crop) => format!("{} Seeds", crop.display_name()),
            Self::Wood => "Wood".to_string(),
        }
    }
}
