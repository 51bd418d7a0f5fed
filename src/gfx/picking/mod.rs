//! # Object Picking System
//!
//! GPU picking: every mesh is drawn into an offscreen target with its pick id
//! as the fragment colour, and the pixel under the pointer is read back.
//!
//! ## How it works
//!
//! 1. **Encode**: the 1-based pick id is split into four little-endian bytes,
//!    each normalized to `[0, 1]` for the `u_id` uniform
//! 2. **Locate**: the pointer position (logical window pixels, origin top-left)
//!    is scaled by the window's scale factor and flipped into framebuffer
//!    coordinates (origin bottom-left)
//! 3. **Decode**: the read-back RGBA bytes are reassembled into the id; 0 is
//!    background
//!
//! ## Usage
//!
//! ```rust
//! use marionette::gfx::picking::{decode_pick_id, encode_pick_id};
//!
//! let id = 70_000;
//! assert_eq!(decode_pick_id(encode_pick_id(id)), id);
//! ```

use winit::dpi::{LogicalPosition, PhysicalPosition};

/// Pick id of the background, where no mesh was drawn
pub const NO_PICK: u32 = 0;

/// Little-endian RGBA bytes of `id`
pub fn encode_pick_id(id: u32) -> [u8; 4] {
    id.to_le_bytes()
}

/// Normalized colour written by the pick shader for `id`
pub fn pick_color(id: u32) -> [f32; 4] {
    encode_pick_id(id).map(|byte| byte as f32 / 255.0)
}

/// Reassembles a pick id from a read-back pixel
pub fn decode_pick_id(rgba: [u8; 4]) -> u32 {
    u32::from_le_bytes(rgba)
}

/// Converts a pointer position into framebuffer pixel coordinates
///
/// Returns `None` when the pointer lies outside a `framebuffer_size` target.
pub fn pointer_to_framebuffer(
    position: LogicalPosition<f64>,
    scale_factor: f64,
    framebuffer_size: (u32, u32),
) -> Option<(u32, u32)> {
    let physical: PhysicalPosition<f64> = position.to_physical(scale_factor);
    physical_to_framebuffer(physical, framebuffer_size)
}

/// Flips a physical window position into framebuffer coordinates
pub fn physical_to_framebuffer(
    position: PhysicalPosition<f64>,
    (width, height): (u32, u32),
) -> Option<(u32, u32)> {
    let (x, y) = (position.x.floor(), position.y.floor());
    if x < 0.0 || y < 0.0 || x >= width as f64 || y >= height as f64 {
        return None;
    }
    Some((x as u32, height - 1 - y as u32))
}
