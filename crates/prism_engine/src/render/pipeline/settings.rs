//! Global renderer settings and display-buffer selection

/// Which framebuffer image the editor viewport displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayBuffer {
    /// The fully post-processed output
    #[default]
    Final,
    /// G-buffer albedo
    Albedo,
    /// G-buffer world position
    Position,
    /// G-buffer world normal
    Normal,
    /// G-buffer material parameters
    Material,
    /// Blurred SSAO result
    Occlusion,
    /// Bloom bright-color threshold output
    Bright,
}

/// Global settings; persist across frames until explicitly changed
///
/// Values round-trip through their accessors unclamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Gamma exponent applied by the final correction pass
    pub gamma: f32,
    /// Exposure used by tone-mapping when HDR output is disabled
    pub exposure: f32,
    /// Parallax-mapping height scale
    pub parallax_scale: f32,
    /// Luminance threshold feeding the bloom bright output
    pub bloom_threshold: f32,
    /// Skip tone-mapping and emit HDR color
    pub hdr: bool,
    /// Run the bloom blur/composite chain
    pub bloom_enabled: bool,
    /// Run the SSAO passes; when off, downstream samples a white texture
    pub ssao_enabled: bool,
    /// Width of batched line rasterization in pixels
    pub line_width: f32,
    /// Widened line width used by the mesh outline pass
    pub outline_width: f32,
    /// Rasterized point size in pixels
    pub point_size: f32,
    /// Clear color for the geometry pass
    pub clear_color: [f32; 4],
    /// Which buffer the editor viewport displays
    pub displayed_buffer: DisplayBuffer,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            gamma: 2.2,
            exposure: 1.0,
            parallax_scale: 0.05,
            bloom_threshold: 1.0,
            hdr: false,
            bloom_enabled: true,
            ssao_enabled: true,
            line_width: 2.0,
            outline_width: 4.0,
            point_size: 1.0,
            clear_color: [0.05, 0.05, 0.08, 1.0],
            displayed_buffer: DisplayBuffer::Final,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = RenderSettings::default();
        assert_eq!(settings.gamma, 2.2);
        assert!(!settings.hdr);
        assert!(settings.bloom_enabled);
        assert_eq!(settings.displayed_buffer, DisplayBuffer::Final);
    }
}
