//! QR rendering for backup codes.

use crate::error::AppError;
use qrcode::render::svg;
use qrcode::QrCode;

/// Minimum rendered edge, in pixels.
const QR_MIN_DIMENSION: u32 = 240;

/// Render `data` as a standalone SVG document.
pub fn render_svg(data: &str) -> Result<String, AppError> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("QR encoding failed: {}", e)))?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_svg() {
        let svg = render_svg("ab12cd34").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#000000"));
    }
}
