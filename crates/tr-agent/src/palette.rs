//! Stock body colours for spawned traffic.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const fn rgb(r: u8, g: u8, b: u8) -> Rgb {
    Rgb { r, g, b }
}

/// Dark, grey, white, red, blue and green shades, roughly in the proportions
/// seen on real roads.
pub const CAR_COLORS: [Rgb; 18] = [
    rgb(13, 17, 22),
    rgb(19, 24, 31),
    rgb(28, 29, 33),
    rgb(12, 13, 24),
    rgb(11, 20, 33),
    rgb(151, 154, 151),
    rgb(153, 157, 160),
    rgb(194, 196, 198),
    rgb(234, 234, 234),
    rgb(255, 255, 255),
    rgb(182, 17, 27),
    rgb(218, 25, 24),
    rgb(73, 17, 29),
    rgb(35, 49, 85),
    rgb(28, 53, 81),
    rgb(37, 58, 167),
    rgb(21, 92, 45),
    rgb(18, 46, 43),
];
