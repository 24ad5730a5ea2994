//! Snapshot capture support
//!
//! - [`ScopedCameraOverride`] puts the view into the canonical pose and
//!   restores it when dropped, whatever happens in between.
//! - [`ContextLossFlag`] is set from the device-lost callback and disables
//!   captures for the rest of the session.
//! - [`PendingCapture`] tracks a staging buffer readback that the frame loop
//!   polls until the pixels arrive.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use straw_core::{CaptureRequest, SnapshotError, SnapshotImage};

use crate::auto_rotate::FloatAnimator;
use crate::camera::{CameraPose, OrbitCamera};

/// Capture errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    /// The rendering context was lost earlier in the session
    #[error("Rendering context lost")]
    ContextLost,
    /// Another capture is still reading back
    #[error("A capture is already in progress")]
    Busy,
    /// The target format cannot be read back as RGBA8
    #[error("Unsupported capture format {0:?}")]
    UnsupportedFormat(wgpu::TextureFormat),
    /// Mapping the staging buffer failed
    #[error("Readback failed: {0}")]
    Readback(String),
    /// The pixels could not be encoded
    #[error(transparent)]
    Encode(#[from] SnapshotError),
}

/// Shared flag raised when the GPU device is lost
#[derive(Debug, Clone, Default)]
pub struct ContextLossFlag(Arc<AtomicBool>);

impl ContextLossFlag {
    /// New flag, not lost
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the loss; stays set for the session
    pub fn mark_lost(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the context has been lost
    pub fn is_lost(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Camera and model offset that the display renders from
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Orbit camera.
    pub camera: OrbitCamera,
    /// Float animation of the model.
    pub float: FloatAnimator,
}

/// Applies the canonical pose for as long as it lives
pub struct ScopedCameraOverride<'a> {
    view: &'a mut ViewState,
    saved_pose: CameraPose,
    saved_aspect: f32,
    saved_offset: f32,
}

impl<'a> ScopedCameraOverride<'a> {
    /// Save the current pose and float offset, then apply the canonical pose
    /// with no float offset at the given aspect ratio
    pub fn apply(view: &'a mut ViewState, aspect: f32) -> Self {
        let saved_pose = view.camera.pose();
        let saved_aspect = view.camera.aspect;
        let saved_offset = view.float.offset;

        view.camera.reset();
        view.camera.update_aspect(aspect);
        view.float.offset = 0.0;

        Self {
            view,
            saved_pose,
            saved_aspect,
            saved_offset,
        }
    }
}

impl Deref for ScopedCameraOverride<'_> {
    type Target = ViewState;

    fn deref(&self) -> &ViewState {
        self.view
    }
}

impl DerefMut for ScopedCameraOverride<'_> {
    fn deref_mut(&mut self) -> &mut ViewState {
        self.view
    }
}

impl Drop for ScopedCameraOverride<'_> {
    fn drop(&mut self) {
        self.view.camera.set_pose(self.saved_pose);
        self.view.camera.update_aspect(self.saved_aspect);
        self.view.float.offset = self.saved_offset;
    }
}

/// Copy layout for reading back a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadbackLayout {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row pitch in the staging buffer.
    pub padded_bytes_per_row: u32,
}

impl ReadbackLayout {
    /// Layout for an RGBA8 texture, rows aligned for texture-to-buffer copies
    pub fn rgba8(width: u32, height: u32) -> Self {
        let unpadded = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        Self {
            width,
            height,
            padded_bytes_per_row: unpadded.div_ceil(align) * align,
        }
    }

    /// Staging buffer size in bytes
    pub fn buffer_size(&self) -> u64 {
        u64::from(self.padded_bytes_per_row) * u64::from(self.height)
    }
}

/// Strip row padding and convert BGRA to RGBA when needed
pub fn unpad_rows(data: &[u8], layout: ReadbackLayout, bgra: bool) -> Vec<u8> {
    let row_bytes = layout.width as usize * 4;
    let mut pixels = Vec::with_capacity(row_bytes * layout.height as usize);
    for row in data
        .chunks(layout.padded_bytes_per_row as usize)
        .take(layout.height as usize)
    {
        let Some(row) = row.get(..row_bytes) else {
            break;
        };
        pixels.extend_from_slice(row);
    }
    if bgra {
        for pixel in pixels.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }
    }
    pixels
}

/// Outcome of polling a capture
pub enum CapturePoll {
    /// Still waiting for the GPU
    Pending,
    /// Finished; a failed capture carries the error
    Done(CaptureRequest, Result<SnapshotImage, CaptureError>),
}

/// A capture whose pixels are being copied into a staging buffer
pub struct PendingCapture {
    request: CaptureRequest,
    buffer: wgpu::Buffer,
    layout: ReadbackLayout,
    bgra: bool,
    rx: mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>,
}

impl PendingCapture {
    /// Start mapping a staging buffer after its copy was submitted
    pub fn start(
        request: CaptureRequest,
        buffer: wgpu::Buffer,
        layout: ReadbackLayout,
        bgra: bool,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        buffer.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        Self {
            request,
            buffer,
            layout,
            bgra,
            rx,
        }
    }

    /// Request this capture answers
    pub fn request(&self) -> CaptureRequest {
        self.request
    }

    /// Check whether the readback finished. Polls the device without blocking.
    pub fn poll(&self, device: &wgpu::Device) -> CapturePoll {
        device.poll(wgpu::Maintain::Poll);
        match self.rx.try_recv() {
            Ok(Ok(())) => CapturePoll::Done(self.request, self.read()),
            Ok(Err(e)) => CapturePoll::Done(
                self.request,
                Err(CaptureError::Readback(e.to_string())),
            ),
            Err(mpsc::TryRecvError::Empty) => CapturePoll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => CapturePoll::Done(
                self.request,
                Err(CaptureError::Readback("map callback dropped".to_string())),
            ),
        }
    }

    fn read(&self) -> Result<SnapshotImage, CaptureError> {
        let pixels = {
            let data = self.buffer.slice(..).get_mapped_range();
            unpad_rows(&data, self.layout, self.bgra)
        };
        self.buffer.unmap();
        Ok(SnapshotImage::from_rgba(
            self.layout.width,
            self.layout.height,
            pixels,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AutoRotateConfig, CameraConfig};

    fn view() -> ViewState {
        let rotate = AutoRotateConfig::default();
        ViewState {
            camera: OrbitCamera::new(&CameraConfig::default(), 1.5),
            float: FloatAnimator::new(
                rotate.float_amplitude,
                rotate.float_frequency,
                rotate.float_lerp,
                rotate.settle_lerp,
            ),
        }
    }

    #[test]
    fn test_override_restores_on_drop() {
        let mut view = view();
        view.camera.rotate(1.0);
        view.float.offset = 0.12;
        let pose = view.camera.pose();

        {
            let guard = ScopedCameraOverride::apply(&mut view, 1.0);
            assert_eq!(guard.camera.pose(), guard.camera.canonical_pose());
            assert_eq!(guard.camera.aspect, 1.0);
            assert_eq!(guard.float.offset, 0.0);
        }

        assert_eq!(view.camera.pose(), pose);
        assert_eq!(view.camera.aspect, 1.5);
        assert_eq!(view.float.offset, 0.12);
    }

    #[test]
    fn test_override_restores_on_error() {
        fn readback() -> Result<(), CaptureError> {
            Err(CaptureError::Readback("device gone".to_string()))
        }

        fn failing_capture(view: &mut ViewState) -> Result<(), CaptureError> {
            let _guard = ScopedCameraOverride::apply(view, 1.0);
            readback()?;
            Ok(())
        }

        let mut view = view();
        view.camera.rotate(2.5);
        view.float.offset = -0.05;
        let pose = view.camera.pose();

        assert!(failing_capture(&mut view).is_err());
        assert_eq!(view.camera.pose(), pose);
        assert_eq!(view.float.offset, -0.05);
    }

    #[test]
    fn test_context_loss_flag_is_shared() {
        let flag = ContextLossFlag::new();
        let callback_side = flag.clone();
        assert!(!flag.is_lost());
        callback_side.mark_lost();
        assert!(flag.is_lost());
    }

    #[test]
    fn test_readback_layout_alignment() {
        let layout = ReadbackLayout::rgba8(100, 3);
        assert_eq!(layout.padded_bytes_per_row, 512);
        assert_eq!(layout.buffer_size(), 512 * 3);
        assert_eq!(ReadbackLayout::rgba8(64, 1).padded_bytes_per_row, 256);
    }

    #[test]
    fn test_unpad_rows() {
        let layout = ReadbackLayout {
            width: 2,
            height: 2,
            padded_bytes_per_row: 12,
        };
        let data = [
            1, 2, 3, 4, 5, 6, 7, 8, 0, 0, 0, 0, //
            9, 10, 11, 12, 13, 14, 15, 16, 0, 0, 0, 0,
        ];
        assert_eq!(
            unpad_rows(&data, layout, false),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]
        );
        assert_eq!(
            unpad_rows(&data, layout, true)[..8],
            [3, 2, 1, 4, 7, 6, 5, 8]
        );
    }
}
