//! SVG generation for the logo.
//!
//! The path geometry is fixed; only the fills and the nominal size vary.
//! [`compose`] is what exports use. [`compose_preview`] adds the hover
//! highlight used by interactive front ends.

use std::fmt::Write as _;

use palette::{Hsl, IntoColor, Srgb};

use crate::region::{Color, Region, RegionColorMap};

/// Width of the logo's viewBox.
pub const VIEWBOX_WIDTH: f32 = 738.0;

/// Height of the logo's viewBox.
pub const VIEWBOX_HEIGHT: f32 = 248.0;

/// Path data for each region, in paint order.
const PATHS: [(Region, &str); 8] = [
    (
        Region::LetterI,
        "M287.295 175.68V72H309.268V175.68H287.295Z",
    ),
    (
        Region::LetterN,
        "M338.834 175.68V72H361.812L419.689 141.12V72H442.237V175.68H419.258L361.094 106.272V175.68H338.834Z",
    ),
    (
        Region::LetterC,
        "M496.815 175.68C492.89 175.68 489.299 174.72 486.044 172.8C482.885 170.88 480.347 168.336 478.432 165.168C476.518 161.904 475.56 158.304 475.56 154.368V93.312C475.56 89.376 476.518 85.824 478.432 82.656C480.347 79.392 482.885 76.8 486.044 74.88C489.299 72.96 492.89 72 496.815 72H578.676V94.464H502.56C501.028 94.464 499.831 94.848 498.969 95.616C498.204 96.384 497.821 97.584 497.821 99.216V148.464C497.821 150 498.204 151.2 498.969 152.064C499.831 152.832 501.028 153.216 502.56 153.216H578.676V175.68H496.815Z",
    ),
    (
        Region::LetterO,
        "M631.852 175.68C628.022 175.68 624.48 174.72 621.224 172.8C617.969 170.88 615.384 168.288 613.469 165.024C611.554 161.76 610.597 158.208 610.597 154.368V93.312C610.597 89.376 611.554 85.824 613.469 82.656C615.384 79.392 617.969 76.8 621.224 74.88C624.48 72.96 628.022 72 631.852 72H692.745C696.575 72 700.069 72.96 703.229 74.88C706.484 76.8 709.069 79.392 710.984 82.656C712.995 85.824 714 89.376 714 93.312V154.368C714 158.208 712.995 161.76 710.984 165.024C709.069 168.288 706.484 170.88 703.229 172.8C700.069 174.72 696.575 175.68 692.745 175.68H631.852ZM632.857 153.216H691.452V94.464H632.857V153.216Z",
    ),
    (
        Region::Background,
        "M24 56C24 38.3269 38.2886 24 55.9145 24H191.551C209.177 24 223.466 38.3269 223.466 56V192C223.466 209.673 209.177 224 191.551 224H55.9145C38.2886 224 24 209.673 24 192V56Z",
    ),
    (
        Region::Line1,
        "M61.8986 162L82.0047 86H103.786L83.6802 162H61.8986Z",
    ),
    (
        Region::Line2,
        "M103.786 162L123.893 86H145.674L125.568 162H103.786Z",
    ),
    (
        Region::Line3,
        "M145.674 162L165.78 86H187.562L167.456 162H145.674Z",
    ),
];

// ============================================================================
// LogoSize
// ============================================================================

/// Nominal on-screen size of the logo in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoSize {
    pub width: f32,
    pub height: f32,
}

impl LogoSize {
    /// The viewBox size, 738x248.
    pub const NATIVE: Self = Self {
        width: VIEWBOX_WIDTH,
        height: VIEWBOX_HEIGHT,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A size of the given width with the logo's aspect ratio.
    pub fn from_width(width: f32) -> Self {
        Self {
            width,
            height: width * VIEWBOX_HEIGHT / VIEWBOX_WIDTH,
        }
    }

    /// Multiplies both axes by `factor`.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

// ============================================================================
// VectorDocument
// ============================================================================

/// A complete SVG document for one coloring of the logo.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    markup: String,
    size: LogoSize,
}

impl VectorDocument {
    /// Wraps arbitrary markup. Only used where a document does not come
    /// from [`compose`], such as decoder tests.
    #[cfg(test)]
    pub(crate) fn from_markup(markup: impl Into<String>, size: LogoSize) -> Self {
        Self {
            markup: markup.into(),
            size,
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn size(&self) -> LogoSize {
        self.size
    }

    pub fn into_markup(self) -> String {
        self.markup
    }
}

// ============================================================================
// Composition
// ============================================================================

/// Renders the logo with `colors` at `size`.
pub fn compose(colors: &RegionColorMap, size: LogoSize) -> VectorDocument {
    build(size, |region| colors.get(region).clone())
}

/// Like [`compose`], but shifts `highlighted` the way the editor shows the
/// region under the pointer. See [`highlight`].
pub fn compose_preview(
    colors: &RegionColorMap,
    size: LogoSize,
    highlighted: Option<Region>,
) -> VectorDocument {
    build(size, |region| {
        let color = colors.get(region);
        if Some(region) == highlighted {
            highlight(color)
        } else {
            color.clone()
        }
    })
}

fn build(size: LogoSize, fill_for: impl Fn(Region) -> Color) -> VectorDocument {
    let mut markup = String::with_capacity(4096);
    // Writing into a String cannot fail.
    let _ = writeln!(
        markup,
        r#"<svg width="{}" height="{}" viewBox="0 0 {} {}" fill="none" xmlns="http://www.w3.org/2000/svg">"#,
        size.width, size.height, VIEWBOX_WIDTH, VIEWBOX_HEIGHT
    );
    for (region, data) in PATHS {
        let fill = fill_for(region);
        let _ = writeln!(
            markup,
            r#"<path d="{}" fill="{}"/>"#,
            data,
            escape_attr(fill.as_str())
        );
    }
    markup.push_str("</svg>");

    VectorDocument { markup, size }
}

/// Escapes a value for use inside a double-quoted XML attribute.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Lightness above which a hover darkens instead of lightening.
const HIGHLIGHT_DARKEN_ABOVE: f32 = 0.9;

/// Hover color for `color`: lighter by 0.1, or darker by 0.15 when the
/// color is already near white and could not get visibly lighter.
pub fn highlight(color: &Color) -> Color {
    let Some(rgb) = color.to_rgb() else {
        return color.clone();
    };
    let rgb: Srgb = rgb.into_format();
    let hsl: Hsl = rgb.into_color();
    if hsl.lightness > HIGHLIGHT_DARKEN_ABOVE {
        lighten(color, -0.15)
    } else {
        lighten(color, 0.1)
    }
}

/// Shifts a hex color's lightness by `amount`, clamped to `0.0..=1.0`.
/// Negative amounts darken. Non-hex values pass through unchanged.
pub fn lighten(color: &Color, amount: f32) -> Color {
    let Some(rgb) = color.to_rgb() else {
        return color.clone();
    };
    let rgb: Srgb = rgb.into_format();
    let mut hsl: Hsl = rgb.into_color();
    hsl.lightness = (hsl.lightness + amount).clamp(0.0, 1.0);
    let lightened: Srgb = hsl.into_color();
    let lightened: Srgb<u8> = lightened.into_format();
    Color::new(format!(
        "#{:02X}{:02X}{:02X}",
        lightened.red, lightened.green, lightened.blue
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fills(doc: &VectorDocument) -> Vec<String> {
        doc.markup()
            .lines()
            .filter(|line| line.starts_with("<path"))
            .map(|line| {
                let start = line.find("fill=\"").unwrap() + 6;
                let end = start + line[start..].find('"').unwrap();
                line[start..end].to_string()
            })
            .collect()
    }

    #[test]
    fn compose_is_deterministic() {
        let mut colors = RegionColorMap::default();
        colors.set(Region::Line2, Color::new("#00FF00"));

        let a = compose(&colors, LogoSize::from_width(369.0));
        let b = compose(&colors, LogoSize::from_width(369.0));
        assert_eq!(a.markup().as_bytes(), b.markup().as_bytes());
    }

    #[test]
    fn recolored_letter_only_touches_its_path() {
        let mut colors = RegionColorMap::default();
        colors.set(Region::LetterI, Color::new("#FF0000"));

        let doc = compose(&colors, LogoSize::NATIVE);
        let fills = fills(&doc);
        assert_eq!(fills.len(), PATHS.len());

        for ((region, _), fill) in PATHS.iter().zip(&fills) {
            if *region == Region::LetterI {
                assert_eq!(fill, "#FF0000");
            } else {
                assert_eq!(*fill, region.default_color().as_str());
            }
        }
        assert_eq!(doc.markup().matches(r##"fill="#FF0000""##).count(), 1);
    }

    #[test]
    fn size_lands_in_root_attributes() {
        let doc = compose(&RegionColorMap::default(), LogoSize::new(369.0, 124.0));
        assert!(doc.markup().starts_with(r#"<svg width="369" height="124" viewBox="0 0 738 248""#));
        assert_eq!(doc.size(), LogoSize::new(369.0, 124.0));
    }

    #[test]
    fn hostile_colors_cannot_break_the_document() {
        let mut colors = RegionColorMap::default();
        colors.set(Region::Background, Color::new(r#""/><script/>"#));

        let doc = compose(&colors, LogoSize::NATIVE);
        assert!(!doc.markup().contains("<script/>"));
        assert!(doc.markup().contains("&quot;/&gt;&lt;script/&gt;"));
        assert_eq!(doc.markup().matches("<path").count(), PATHS.len());
    }

    #[test]
    fn from_width_keeps_aspect_ratio() {
        let size = LogoSize::from_width(369.0);
        assert!((size.height - 124.0).abs() < 0.001);
        assert_eq!(LogoSize::from_width(VIEWBOX_WIDTH), LogoSize::NATIVE);
    }

    #[test]
    fn preview_brightens_only_the_highlighted_region() {
        let colors = RegionColorMap::default();
        let plain = compose(&colors, LogoSize::NATIVE);
        let preview = compose_preview(&colors, LogoSize::NATIVE, Some(Region::Background));

        let plain_fills = fills(&plain);
        let preview_fills = fills(&preview);
        for (i, (region, _)) in PATHS.iter().enumerate() {
            if *region == Region::Background {
                assert_ne!(plain_fills[i], preview_fills[i]);
            } else {
                assert_eq!(plain_fills[i], preview_fills[i]);
            }
        }

        let none = compose_preview(&colors, LogoSize::NATIVE, None);
        assert_eq!(none, plain);
    }

    #[test]
    fn preview_marks_white_stripes_too() {
        let colors = RegionColorMap::default();
        let plain = fills(&compose(&colors, LogoSize::NATIVE));
        for stripe in [Region::Line1, Region::Line2, Region::Line3] {
            let preview = fills(&compose_preview(&colors, LogoSize::NATIVE, Some(stripe)));
            let i = PATHS.iter().position(|(r, _)| *r == stripe).unwrap();
            assert_eq!(plain[i], "#FFFFFF");
            assert_ne!(preview[i], plain[i], "{stripe} unchanged on hover");
        }
    }

    #[test]
    fn highlight_darkens_near_white_and_lightens_otherwise() {
        let sum = |c: &Color| {
            let c = c.to_rgb().unwrap();
            c.red as u32 + c.green as u32 + c.blue as u32
        };
        let white = Color::new("#FFFFFF");
        assert!(sum(&highlight(&white)) < sum(&white));

        let blue = Color::new("#3673F5");
        assert!(sum(&highlight(&blue)) > sum(&blue));

        let black = Color::new("#000000");
        assert_eq!(lighten(&black, -0.5), black);
    }

    #[test]
    fn lighten_raises_brightness_and_skips_garbage() {
        let original = Color::new("#3673F5").to_rgb().unwrap();
        let lighter = lighten(&Color::new("#3673F5"), 0.1).to_rgb().unwrap();
        let sum = |c: Srgb<u8>| c.red as u32 + c.green as u32 + c.blue as u32;
        assert!(sum(lighter) > sum(original));

        let garbage = Color::new("chartreuse-ish");
        assert_eq!(lighten(&garbage, 0.1), garbage);
    }
}
