use super::engine::GuidanceRule;
use crate::config::GuidanceConfig;
use crate::types::*;

// Pipeline names, as they appear in config files
pub const MEDIA_ELEMENT_SIZE_ON_PAGE: &str = "MediaElementSizeOnPage";
pub const MEDIA_ELEMENT_RESOLUTION: &str = "MediaElementResolution";
pub const VIDEO_ELEMENT_LENGTH: &str = "VideoElementLength";
pub const IMAGE_ELEMENT_RESOLUTION: &str = "ImageElementResolution";
pub const VIDEO_ELEMENT_FRAME_RATE: &str = "VideoElementFrameRate";

/// Image or video covering less than the configured share of the safe zone.
pub fn media_element_size_on_page(element: &Element) -> Option<Guidance> {
    MediaElementSizeRule::new(GuidanceConfig::builtin()).check(element)
}

/// Video whose original resolution is at or below 480p, or at or above 4k.
pub fn media_element_resolution(element: &Element) -> Option<Guidance> {
    MediaElementResolutionRule::new(GuidanceConfig::builtin()).check(element)
}

/// Video longer than one minute.
pub fn video_element_length(element: &Element) -> Option<Guidance> {
    VideoElementLengthRule::new(GuidanceConfig::builtin()).check(element)
}

/// Image stretched beyond its source resolution.
pub fn image_element_resolution(element: &Element) -> Option<Guidance> {
    ImageElementResolutionRule::new(GuidanceConfig::builtin()).check(element)
}

/// Video below 24 frames per second.
pub fn video_element_frame_rate(element: &Element) -> Option<Guidance> {
    VideoElementFrameRateRule::new(GuidanceConfig::builtin()).check(element)
}

// MediaElementSizeRule - coverage of the safe zone
pub struct MediaElementSizeRule<'a> {
    config: &'a GuidanceConfig,
}

impl<'a> MediaElementSizeRule<'a> {
    pub fn new(config: &'a GuidanceConfig) -> Self {
        Self { config }
    }
}

impl<'a> GuidanceRule for MediaElementSizeRule<'a> {
    fn name(&self) -> &str {
        MEDIA_ELEMENT_SIZE_ON_PAGE
    }

    fn applies_to(&self, element_type: ElementType) -> bool {
        element_type.is_media()
    }

    fn check(&self, element: &Element) -> Option<Guidance> {
        if !self.applies_to(element.element_type) {
            return None;
        }

        let safe_zone_area = self.config.safe_zone.area()?;
        let coverage = element.area()? / safe_zone_area;
        if coverage >= self.config.media.min_safe_zone_coverage {
            return None;
        }

        let message = match element.element_type {
            ElementType::Video => GuidanceMessage::VideoTooSmallOnPage,
            _ => GuidanceMessage::ImageTooSmallOnPage,
        };
        Some(Guidance::new(element.id.clone(), message))
    }
}

// MediaElementResolutionRule - video resolution bands
//
// Bands compare the short and long edge so portrait and landscape uploads
// are classified the same way. Both bounds are inclusive, and the low band
// wins when a strip-shaped video would match both.
pub struct MediaElementResolutionRule<'a> {
    config: &'a GuidanceConfig,
}

impl<'a> MediaElementResolutionRule<'a> {
    pub fn new(config: &'a GuidanceConfig) -> Self {
        Self { config }
    }
}

impl<'a> GuidanceRule for MediaElementResolutionRule<'a> {
    fn name(&self) -> &str {
        MEDIA_ELEMENT_RESOLUTION
    }

    fn applies_to(&self, element_type: ElementType) -> bool {
        element_type == ElementType::Video
    }

    fn check(&self, element: &Element) -> Option<Guidance> {
        if !self.applies_to(element.element_type) {
            return None;
        }

        let (short_edge, long_edge) = element.full_resolution()?.edges()?;
        let media = &self.config.media;

        let message = if short_edge <= media.low_resolution_short_edge {
            GuidanceMessage::VideoLowResolution
        } else if short_edge >= media.max_resolution_short_edge
            || long_edge >= media.max_resolution_long_edge
        {
            GuidanceMessage::VideoResolutionTooHigh
        } else {
            return None;
        };

        Some(Guidance::new(element.id.clone(), message))
    }
}

// VideoElementLengthRule - duration limit
pub struct VideoElementLengthRule<'a> {
    config: &'a GuidanceConfig,
}

impl<'a> VideoElementLengthRule<'a> {
    pub fn new(config: &'a GuidanceConfig) -> Self {
        Self { config }
    }
}

impl<'a> GuidanceRule for VideoElementLengthRule<'a> {
    fn name(&self) -> &str {
        VIDEO_ELEMENT_LENGTH
    }

    fn applies_to(&self, element_type: ElementType) -> bool {
        element_type == ElementType::Video
    }

    fn check(&self, element: &Element) -> Option<Guidance> {
        if !self.applies_to(element.element_type) {
            return None;
        }

        let length = element.resource.as_ref()?.length?;
        if !length.is_finite() || length <= self.config.media.max_video_length_secs {
            return None;
        }

        Some(Guidance::new(element.id.clone(), GuidanceMessage::VideoTooLong))
    }
}

// ImageElementResolutionRule - source pixels per rendered page unit
pub struct ImageElementResolutionRule<'a> {
    config: &'a GuidanceConfig,
}

impl<'a> ImageElementResolutionRule<'a> {
    pub fn new(config: &'a GuidanceConfig) -> Self {
        Self { config }
    }
}

impl<'a> GuidanceRule for ImageElementResolutionRule<'a> {
    fn name(&self) -> &str {
        IMAGE_ELEMENT_RESOLUTION
    }

    fn applies_to(&self, element_type: ElementType) -> bool {
        element_type == ElementType::Image
    }

    fn check(&self, element: &Element) -> Option<Guidance> {
        if !self.applies_to(element.element_type) {
            return None;
        }

        let full = element.full_resolution()?;
        let source_width = positive(full.width?)?;
        let source_height = positive(full.height?)?;
        let rendered_width = positive(element.width?)?;
        let rendered_height = positive(element.height?)?;

        let density = (source_width / rendered_width).min(source_height / rendered_height);
        if density >= self.config.media.min_image_pixel_density {
            return None;
        }

        Some(Guidance::new(
            element.id.clone(),
            GuidanceMessage::ImageLowResolution,
        ))
    }
}

// VideoElementFrameRateRule - minimum fps
pub struct VideoElementFrameRateRule<'a> {
    config: &'a GuidanceConfig,
}

impl<'a> VideoElementFrameRateRule<'a> {
    pub fn new(config: &'a GuidanceConfig) -> Self {
        Self { config }
    }
}

impl<'a> GuidanceRule for VideoElementFrameRateRule<'a> {
    fn name(&self) -> &str {
        VIDEO_ELEMENT_FRAME_RATE
    }

    fn applies_to(&self, element_type: ElementType) -> bool {
        element_type == ElementType::Video
    }

    fn check(&self, element: &Element) -> Option<Guidance> {
        if !self.applies_to(element.element_type) {
            return None;
        }

        let frame_rate = positive(element.resource.as_ref()?.frame_rate?)?;
        if frame_rate >= self.config.media.min_video_frame_rate {
            return None;
        }

        Some(Guidance::new(
            element.id.clone(),
            GuidanceMessage::VideoLowFrameRate,
        ))
    }
}
