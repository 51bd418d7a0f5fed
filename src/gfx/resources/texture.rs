//! Textures with lazy upload and sampler state
//!
//! Decoding image files is the host's job: a texture starts out with only an
//! optional source path and presents a 1×1 default colour until decoded pixels
//! arrive through [`Texture::set_image`]. Upload and sampler parameters are
//! applied lazily the next time a sampler uniform binds the texture.

use wgpu::{AddressMode, FilterMode};

use crate::gfx::rendering::rasterizer::{ImageData, Rasterizer, TextureHandle};

/// Wrap and filter state applied to a texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerParams {
    pub wrap_s: AddressMode,
    pub wrap_t: AddressMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    /// Filter between mip levels, `None` disables mipmapping
    pub mipmap_filter: Option<FilterMode>,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            wrap_s: AddressMode::Repeat,
            wrap_t: AddressMode::Repeat,
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Linear,
            mipmap_filter: Some(FilterMode::Linear),
        }
    }
}

impl SamplerParams {
    /// The only state valid for non-power-of-two images
    pub fn npot_fallback() -> Self {
        Self {
            wrap_s: AddressMode::ClampToEdge,
            wrap_t: AddressMode::ClampToEdge,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mipmap_filter: None,
        }
    }

    pub fn uses_mipmaps(&self) -> bool {
        self.mipmap_filter.is_some()
    }

    /// Builder pattern: set both wrap modes
    pub fn with_wrap(mut self, wrap: AddressMode) -> Self {
        self.wrap_s = wrap;
        self.wrap_t = wrap;
        self
    }

    /// Builder pattern: set min/mag filters and the mip filter
    pub fn with_filters(
        mut self,
        min_filter: FilterMode,
        mag_filter: FilterMode,
        mipmap_filter: Option<FilterMode>,
    ) -> Self {
        self.min_filter = min_filter;
        self.mag_filter = mag_filter;
        self.mipmap_filter = mipmap_filter;
        self
    }
}

#[derive(Debug)]
pub struct Texture {
    source: Option<String>,
    image: Option<ImageData>,
    default_color: [u8; 4],
    sampler: SamplerParams,
    needs_upload: bool,
    parameter_changed: bool,
    pub(crate) gpu_texture: Option<TextureHandle>,
}

/// A clone owns no GPU texture and uploads its own copy on first bind
impl Clone for Texture {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            image: self.image.clone(),
            default_color: self.default_color,
            sampler: self.sampler,
            needs_upload: true,
            parameter_changed: true,
            gpu_texture: None,
        }
    }
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            source: None,
            image: None,
            default_color: [255, 255, 255, 255],
            sampler: SamplerParams::default(),
            needs_upload: true,
            parameter_changed: true,
            gpu_texture: None,
        }
    }
}

impl Texture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture whose pixels will be decoded from `source` by the host
    pub fn from_source(source: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            ..Self::default()
        }
    }

    pub fn from_image(image: ImageData) -> Self {
        let mut texture = Self::default();
        texture.set_image(image);
        texture
    }

    /// Builder pattern: colour shown until image data is available
    pub fn with_default_color(mut self, rgba: [u8; 4]) -> Self {
        self.default_color = rgba;
        self.needs_upload = true;
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Points the texture at a new source and drops the current pixels
    pub fn set_source(&mut self, source: &str) {
        self.source = Some(source.to_string());
        self.image = None;
        self.needs_upload = true;
    }

    /// Supplies decoded pixels
    pub fn set_image(&mut self, image: ImageData) {
        self.image = Some(image);
        self.needs_upload = true;
    }

    pub fn clear_image(&mut self) {
        self.image = None;
        self.needs_upload = true;
    }

    pub fn image(&self) -> Option<&ImageData> {
        self.image.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    pub fn default_color(&self) -> [u8; 4] {
        self.default_color
    }

    pub fn width(&self) -> u32 {
        self.image.as_ref().map_or(1, |image| image.width)
    }

    pub fn height(&self) -> u32 {
        self.image.as_ref().map_or(1, |image| image.height)
    }

    pub fn is_power_of_two(&self) -> bool {
        self.width().is_power_of_two() && self.height().is_power_of_two()
    }

    pub fn sampler(&self) -> &SamplerParams {
        &self.sampler
    }

    pub fn set_sampler(&mut self, sampler: SamplerParams) {
        self.sampler = sampler;
        self.parameter_changed = true;
    }

    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    pub fn parameter_changed(&self) -> bool {
        self.parameter_changed
    }

    /// Sampler state that will actually be applied: non-power-of-two images
    /// are silently downgraded to clamp-to-edge wrapping and linear filtering.
    pub fn effective_sampler(&self) -> SamplerParams {
        if self.is_power_of_two() {
            self.sampler
        } else {
            SamplerParams::npot_fallback()
        }
    }

    /// Uploads pending pixels and sampler state, then binds to `unit`
    pub(crate) fn bind(&mut self, rasterizer: &mut dyn Rasterizer, unit: u32) {
        let handle = match self.gpu_texture {
            Some(handle) => handle,
            None => {
                let handle = rasterizer.create_texture();
                self.gpu_texture = Some(handle);
                handle
            }
        };

        if self.needs_upload {
            match &self.image {
                Some(image) => rasterizer.upload_texture(handle, image),
                None => rasterizer.upload_texture(handle, &ImageData::solid(self.default_color)),
            }
            self.needs_upload = false;
            // dimensions may have changed, so the sampler must be re-validated
            self.parameter_changed = true;
        }

        if self.parameter_changed {
            let sampler = self.effective_sampler();
            rasterizer.set_sampler(handle, &sampler);
            if sampler.uses_mipmaps() {
                rasterizer.generate_mipmaps(handle);
            }
            self.parameter_changed = false;
        }

        rasterizer.bind_texture(unit, handle);
    }
}
