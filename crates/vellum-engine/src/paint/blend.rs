/// Blend mode applied by the rasterizer to subsequent draws.
///
/// Colors are straight alpha:
/// - `Alpha`: `src·a + dst·(1 − a)`
/// - `Add`: `src·a + dst`, destination alpha kept
/// - `Multiply`: `src·dst` on every channel, alpha included
/// - `Replace`: `src` overwrites the destination
/// - `Screen`: `src + dst·(1 − src)`
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    #[default]
    Alpha,
    Add,
    Multiply,
    Replace,
    Screen,
}

impl BlendMode {
    pub const ALL: [BlendMode; 5] = [
        BlendMode::Alpha,
        BlendMode::Add,
        BlendMode::Multiply,
        BlendMode::Replace,
        BlendMode::Screen,
    ];
}
