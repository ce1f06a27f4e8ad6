/// Light/dark display preference, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Light,
    Dark,
}

impl ColorMode {
    /// Read the preference from `RABBITHOLE_THEME`; terminals have no
    /// prefers-color-scheme equivalent, so dark is the default.
    pub fn detect() -> Self {
        match std::env::var("RABBITHOLE_THEME").as_deref() {
            Ok("light") => Self::Light,
            _ => Self::Dark,
        }
    }
}

/// An RGB triple. Kept as a plain tuple so this crate stays renderer-agnostic.
pub type Rgb = (u8, u8, u8);

/// Fixed colors for the graph view and result panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub center_node: Rgb,
    pub satellite_node: Rgb,
    pub edge: Rgb,
    pub muted_text: Rgb,
}

const LIGHT: Palette = Palette {
    center_node: (0x43, 0x61, 0xee),
    satellite_node: (0x4c, 0xc9, 0xf0),
    edge: (0xe5, 0xe5, 0xe5),
    muted_text: (0x6b, 0x72, 0x80),
};

const DARK: Palette = Palette {
    center_node: (0x5e, 0x81, 0xf5),
    satellite_node: (0x4c, 0xc9, 0xf0),
    edge: (0x4a, 0x4a, 0x4a),
    muted_text: (0x9c, 0xa3, 0xaf),
};

impl Palette {
    pub fn for_mode(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Light => LIGHT,
            ColorMode::Dark => DARK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palettes_differ_between_modes() {
        let light = Palette::for_mode(ColorMode::Light);
        let dark = Palette::for_mode(ColorMode::Dark);
        assert_ne!(light, dark);
        assert_eq!(light.center_node, (0x43, 0x61, 0xee));
        assert_eq!(light.satellite_node, (0x4c, 0xc9, 0xf0));
        assert_eq!(light.edge, (0xe5, 0xe5, 0xe5));
    }
}
