//! Logo regions and the colors assigned to them.
//!
//! The logo is split into a fixed set of [`Region`]s. A [`RegionColorMap`]
//! always holds exactly one [`Color`] per region, and serializes to the JSON
//! object stored by the gallery:
//!
//! ```json
//! {
//!   "background": "#3673F5",
//!   "letterI": "#3673F5",
//!   "letterN": "#3673F5",
//!   "letterC": "#3673F5",
//!   "letterO": "#3673F5",
//!   "line1": "#FFFFFF",
//!   "line2": "#FFFFFF",
//!   "line3": "#FFFFFF"
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::RegionError;

/// Default fill of the rounded square and the four letters.
pub const DEFAULT_BASE_COLOR: &str = "#3673F5";

/// Default fill of the three accent stripes.
pub const DEFAULT_ACCENT_COLOR: &str = "#FFFFFF";

// ============================================================================
// Region
// ============================================================================

/// A named, independently colorable part of the logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum Region {
    /// Rounded square behind the stripes.
    Background,
    LetterI,
    LetterN,
    LetterC,
    LetterO,
    /// Left accent stripe.
    Line1,
    /// Middle accent stripe.
    Line2,
    /// Right accent stripe.
    Line3,
}

impl Region {
    /// Every region, in document order.
    pub const ALL: [Region; 8] = [
        Region::Background,
        Region::LetterI,
        Region::LetterN,
        Region::LetterC,
        Region::LetterO,
        Region::Line1,
        Region::Line2,
        Region::Line3,
    ];

    /// The identifier used in JSON and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Background => "background",
            Region::LetterI => "letterI",
            Region::LetterN => "letterN",
            Region::LetterC => "letterC",
            Region::LetterO => "letterO",
            Region::Line1 => "line1",
            Region::Line2 => "line2",
            Region::Line3 => "line3",
        }
    }

    /// The color this region has in the untouched logo.
    pub fn default_color(self) -> Color {
        match self {
            Region::Line1 | Region::Line2 | Region::Line3 => Color::new(DEFAULT_ACCENT_COLOR),
            _ => Color::new(DEFAULT_BASE_COLOR),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|region| region.as_str() == s)
            .ok_or_else(|| RegionError::Unknown(s.to_string()))
    }
}

// ============================================================================
// Color
// ============================================================================

/// A color as supplied by the picker, usually `#RRGGBB`.
///
/// Colors are stored verbatim: nothing canonicalizes or rejects them, so a
/// malformed value simply renders as a wrong (or missing) fill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the value as a hex code (`#rrggbb` or `#rgb`), if it is one.
    pub fn to_rgb(&self) -> Option<Srgb<u8>> {
        self.0.trim().parse::<Srgb<u8>>().ok()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// RegionColorMap
// ============================================================================

/// One color per region. The key set is fixed by the type itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegionColorMap {
    pub background: Color,
    pub letter_i: Color,
    pub letter_n: Color,
    pub letter_c: Color,
    pub letter_o: Color,
    pub line1: Color,
    pub line2: Color,
    pub line3: Color,
}

impl Default for RegionColorMap {
    fn default() -> Self {
        Self {
            background: Region::Background.default_color(),
            letter_i: Region::LetterI.default_color(),
            letter_n: Region::LetterN.default_color(),
            letter_c: Region::LetterC.default_color(),
            letter_o: Region::LetterO.default_color(),
            line1: Region::Line1.default_color(),
            line2: Region::Line2.default_color(),
            line3: Region::Line3.default_color(),
        }
    }
}

impl RegionColorMap {
    /// Returns the color assigned to `region`.
    pub fn get(&self, region: Region) -> &Color {
        match region {
            Region::Background => &self.background,
            Region::LetterI => &self.letter_i,
            Region::LetterN => &self.letter_n,
            Region::LetterC => &self.letter_c,
            Region::LetterO => &self.letter_o,
            Region::Line1 => &self.line1,
            Region::Line2 => &self.line2,
            Region::Line3 => &self.line3,
        }
    }

    fn slot_mut(&mut self, region: Region) -> &mut Color {
        match region {
            Region::Background => &mut self.background,
            Region::LetterI => &mut self.letter_i,
            Region::LetterN => &mut self.letter_n,
            Region::LetterC => &mut self.letter_c,
            Region::LetterO => &mut self.letter_o,
            Region::Line1 => &mut self.line1,
            Region::Line2 => &mut self.line2,
            Region::Line3 => &mut self.line3,
        }
    }

    /// Overwrites the color of exactly one region.
    pub fn set(&mut self, region: Region, color: Color) {
        *self.slot_mut(region) = color;
    }

    /// Iterates over `(region, color)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, &Color)> {
        Region::ALL.into_iter().map(move |region| (region, self.get(region)))
    }

    /// Returns true if any region differs from its default color.
    pub fn differs_from_default(&self) -> bool {
        self.iter()
            .any(|(region, color)| *color != region.default_color())
    }

    /// Serializes the map to its gallery JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses the gallery JSON form. Missing or extra keys are rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// ColorRegionModel
// ============================================================================

/// Editing state for the logo's region colors.
#[derive(Debug, Clone, Default)]
pub struct ColorRegionModel {
    colors: RegionColorMap,
}

impl ColorRegionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing map, e.g. one loaded from the gallery.
    pub fn from_colors(colors: RegionColorMap) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &RegionColorMap {
        &self.colors
    }

    pub fn set_region_color(&mut self, region: Region, color: impl Into<Color>) {
        self.colors.set(region, color.into());
    }

    /// Restores the whole default palette in one assignment.
    pub fn reset(&mut self) {
        self.colors = RegionColorMap::default();
    }

    /// Gates the export and share controls.
    pub fn has_custom_colors(&self) -> bool {
        self.colors.differs_from_default()
    }
}

// ============================================================================
// ActiveColor
// ============================================================================

/// The color currently loaded on the brush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveColor {
    color: Color,
}

impl ActiveColor {
    /// Initial brush color.
    pub const DEFAULT: &'static str = "#FE11C5";

    /// Swatches offered next to the free-form picker.
    pub const PRESETS: &'static [&'static str] = &[
        // Vibrant
        "#FE11C5", "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7",
        "#DDA0DD", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E9", "#F8C471",
        "#FF5722", "#E91E63", "#9C27B0", "#673AB7", "#3F51B5", "#2196F3",
        "#03A9F4", "#00BCD4", "#009688", "#4CAF50", "#8BC34A", "#CDDC39",
        "#FFEB3B", "#FFC107", "#FF9800", "#795548", "#607D8B",
        // Pastel
        "#FFB3BA", "#FFDFBA", "#FFFFBA", "#BAFFC9", "#BAE1FF", "#E6BAFF",
        "#FFB3E6", "#C9BAFF", "#BAFFFF", "#FFCAB3", "#D4BAFF", "#B3FFB3",
        // Dark
        "#2C3E50", "#34495E", "#7F8C8D", "#95A5A6", "#BDC3C7", "#ECF0F1",
        "#1ABC9C", "#16A085", "#F39C12", "#E67E22", "#E74C3C", "#C0392B",
        // Neon
        "#39FF14", "#FF073A", "#00FFFF", "#FF00FF", "#FFFF00", "#FF4500",
        "#8A2BE2", "#00FF7F", "#DC143C", "#FF1493", "#00CED1", "#FFD700",
    ];

    pub fn get(&self) -> &Color {
        &self.color
    }

    pub fn set(&mut self, color: impl Into<Color>) {
        self.color = color.into();
    }

    /// Selects the preset at `index`. Returns false if there is none.
    pub fn select_preset(&mut self, index: usize) -> bool {
        match Self::PRESETS.get(index) {
            Some(preset) => {
                self.color = Color::new(*preset);
                true
            }
            None => false,
        }
    }
}

impl Default for ActiveColor {
    fn default() -> Self {
        Self {
            color: Color::new(Self::DEFAULT),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_is_not_custom() {
        let model = ColorRegionModel::new();
        assert!(!model.has_custom_colors());
        assert_eq!(model.colors().background.as_str(), "#3673F5");
        assert_eq!(model.colors().letter_o.as_str(), "#3673F5");
        assert_eq!(model.colors().line2.as_str(), "#FFFFFF");
    }

    #[test]
    fn reset_clears_every_edit() {
        let mut model = ColorRegionModel::new();
        for region in Region::ALL {
            model.set_region_color(region, "#123456");
        }
        assert!(model.has_custom_colors());

        model.reset();
        assert!(!model.has_custom_colors());
        assert_eq!(*model.colors(), RegionColorMap::default());
    }

    #[test]
    fn single_edit_changes_exactly_one_region() {
        for target in Region::ALL {
            let mut model = ColorRegionModel::new();
            let before = model.colors().clone();

            model.set_region_color(target, "#FF0000");

            let changed: Vec<_> = Region::ALL
                .into_iter()
                .filter(|r| before.get(*r) != model.colors().get(*r))
                .collect();
            assert_eq!(changed, vec![target]);
        }
    }

    #[test]
    fn setting_the_default_back_is_not_custom() {
        let mut model = ColorRegionModel::new();
        model.set_region_color(Region::Line3, "#000000");
        assert!(model.has_custom_colors());
        model.set_region_color(Region::Line3, DEFAULT_ACCENT_COLOR);
        assert!(!model.has_custom_colors());
    }

    #[test]
    fn malformed_colors_are_kept_verbatim() {
        let mut model = ColorRegionModel::new();
        model.set_region_color(Region::LetterN, "not a color");
        assert_eq!(model.colors().letter_n.as_str(), "not a color");
        assert!(model.colors().letter_n.to_rgb().is_none());
    }

    #[test]
    fn color_parses_hex() {
        let rgb = Color::new("#FF8000").to_rgb().unwrap();
        assert_eq!((rgb.red, rgb.green, rgb.blue), (255, 128, 0));
    }

    #[test]
    fn region_identifiers_roundtrip() {
        for region in Region::ALL {
            assert_eq!(region.as_str().parse::<Region>().unwrap(), region);
        }
        assert_eq!(
            "path1".parse::<Region>(),
            Err(RegionError::Unknown("path1".into()))
        );
        assert!("text".parse::<Region>().is_err());
    }

    #[test]
    fn map_json_uses_gallery_keys() {
        let mut map = RegionColorMap::default();
        map.set(Region::LetterI, Color::new("#FF0000"));

        let json = map.to_json().unwrap();
        assert!(json.contains("\"letterI\":\"#FF0000\""));
        assert!(json.contains("\"line1\":\"#FFFFFF\""));

        let restored = RegionColorMap::from_json(&json).unwrap();
        assert_eq!(restored, map);
    }

    #[test]
    fn map_json_rejects_foreign_key_sets() {
        let missing = r##"{"background":"#000000"}"##;
        assert!(RegionColorMap::from_json(missing).is_err());

        let mut value = serde_json::to_value(RegionColorMap::default()).unwrap();
        value["path1"] = serde_json::json!("#000000");
        assert!(serde_json::from_value::<RegionColorMap>(value).is_err());
    }

    #[test]
    fn active_color_presets() {
        let mut active = ActiveColor::default();
        assert_eq!(active.get().as_str(), "#FE11C5");

        assert!(active.select_preset(1));
        assert_eq!(active.get().as_str(), "#FF6B6B");

        assert!(!active.select_preset(ActiveColor::PRESETS.len()));
        assert_eq!(active.get().as_str(), "#FF6B6B");
    }
}
