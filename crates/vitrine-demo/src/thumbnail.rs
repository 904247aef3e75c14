//! Screenshot the viewer and upload the result as the model's thumbnail.

use std::io::Cursor;

use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured};
use image::ImageFormat;
use uuid::Uuid;
use vitrine_bevy::events::CaptureThumbnail;

use crate::library::{LibraryBridge, LibraryRequest};

/// Longest edge of a stored thumbnail, in pixels.
pub const THUMBNAIL_EDGE: u32 = 512;

/// Bevy system: take a screenshot for every capture request.
pub fn capture_thumbnails(mut requests: MessageReader<CaptureThumbnail>, mut commands: Commands) {
    for request in requests.read() {
        let Ok(id) = Uuid::parse_str(&request.model_id) else {
            tracing::warn!("Not capturing thumbnail for unknown model {}", request.model_id);
            continue;
        };
        commands
            .spawn(Screenshot::primary_window())
            .observe(move |captured: On<ScreenshotCaptured>, library: Res<LibraryBridge>| {
                match encode_png(captured.image.clone()) {
                    Ok(bytes) => library.request(LibraryRequest::UploadThumbnail {
                        id,
                        file_name: "thumbnail.png".to_string(),
                        bytes,
                    }),
                    Err(e) => tracing::error!("Thumbnail capture for {id} failed: {e}"),
                }
            });
    }
}

/// Downscale a captured frame and encode it as PNG.
pub fn encode_png(frame: Image) -> Result<Vec<u8>, ThumbnailError> {
    let dynamic = frame
        .try_into_dynamic()
        .map_err(|e| ThumbnailError::Convert(e.to_string()))?;
    let scaled = dynamic.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE);
    let mut bytes = Cursor::new(Vec::new());
    scaled.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Errors that can occur while turning a frame into a thumbnail.
#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("unsupported frame format: {0}")]
    Convert(String),
    #[error("failed to encode thumbnail: {0}")]
    Encode(#[from] image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::RenderAssetUsages;
    use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

    #[test]
    fn test_encode_png_downscales_large_frames() {
        let frame = Image::new_fill(
            Extent3d {
                width: 1024,
                height: 256,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            &[200, 100, 50, 255],
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        );
        let bytes = encode_png(frame).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!(decoded.width(), THUMBNAIL_EDGE);
        assert_eq!(decoded.height(), THUMBNAIL_EDGE / 4);
    }
}
