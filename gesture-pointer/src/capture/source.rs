//! Frame sources, landmark detectors and frame preprocessing.

use super::CaptureError;
use crate::hand::RawDetection;

/// Byte order of a packed 3-channel frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Bgr,
    Rgb,
}

impl PixelFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bgr => "bgr",
            Self::Rgb => "rgb",
        }
    }
}

/// One packed 8-bit 3-channel frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Row-major pixels, 3 bytes each.
    pub data: Vec<u8>,
    /// Position in the capture stream, assigned by the pipeline.
    pub sequence: u64,
}

impl CameraFrame {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            data,
            sequence: 0,
        }
    }

    /// A black frame.
    pub fn blank(width: u32, height: u32, format: PixelFormat) -> Self {
        Self::new(width, height, format, vec![0; width as usize * height as usize * 3])
    }

    fn row_len(&self) -> usize {
        self.width as usize * 3
    }

    /// Whether `data` holds exactly `width * height` pixels.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.row_len() * self.height as usize
    }

    /// Swap to RGB byte order.  A no-op for RGB frames.
    pub fn into_rgb(mut self) -> Self {
        if self.format == PixelFormat::Bgr {
            for px in self.data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            self.format = PixelFormat::Rgb;
        }
        self
    }

    /// Mirror around the vertical axis.
    pub fn mirrored(mut self) -> Self {
        let row_len = self.row_len();
        if row_len == 0 {
            return self;
        }
        for row in self.data.chunks_exact_mut(row_len) {
            let width = row.len() / 3;
            for i in 0..width / 2 {
                let j = width - 1 - i;
                for c in 0..3 {
                    row.swap(i * 3 + c, j * 3 + c);
                }
            }
        }
        self
    }

    /// Prepare a raw camera frame for the detector.
    pub fn preprocess(self, horizontal_flip: bool) -> Self {
        let rgb = self.into_rgb();
        if horizontal_flip {
            rgb.mirrored()
        } else {
            rgb
        }
    }
}

/// Something that yields camera frames, typically a video device.
pub trait FrameSource: Send {
    /// Human-readable device name for logs.
    fn name(&self) -> String;

    /// Acquire the device.  Failure here is fatal to pipeline startup.
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Block until the next frame.  `Ok(None)` is end of stream; an error
    /// stops the capture thread for good.
    fn read(&mut self) -> Result<Option<CameraFrame>, CaptureError>;

    /// Release the device.
    fn close(&mut self) {}
}

/// Result callback handed to a detector with each request.
pub type DetectionCallback = Box<dyn FnOnce(RawDetection) + Send + 'static>;

/// An asynchronous hand-landmark detector.
///
/// `detect_async` returns immediately; the detector calls `on_result`
/// exactly once, from any thread, with a detection stamped `timestamp_ms`.
pub trait LandmarkDetector: Send {
    fn detect_async(&mut self, frame: CameraFrame, timestamp_ms: i64, on_result: DetectionCallback);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_one() -> CameraFrame {
        // Pixel 0 is (1,2,3), pixel 1 is (4,5,6), in BGR order.
        CameraFrame::new(2, 1, PixelFormat::Bgr, vec![1, 2, 3, 4, 5, 6])
    }

    #[test]
    fn test_bgr_to_rgb() {
        let f = two_by_one().into_rgb();
        assert_eq!(f.format, PixelFormat::Rgb);
        assert_eq!(f.data, vec![3, 2, 1, 6, 5, 4]);
        // Converting twice does nothing more.
        assert_eq!(f.clone().into_rgb(), f);
    }

    #[test]
    fn test_mirror() {
        let f = two_by_one().mirrored();
        assert_eq!(f.data, vec![4, 5, 6, 1, 2, 3]);

        let odd = CameraFrame::new(3, 2, PixelFormat::Rgb, (0..18).collect()).mirrored();
        assert_eq!(
            odd.data,
            vec![6, 7, 8, 3, 4, 5, 0, 1, 2, 15, 16, 17, 12, 13, 14, 9, 10, 11]
        );
    }

    #[test]
    fn test_preprocess() {
        let f = two_by_one().preprocess(true);
        assert_eq!(f.format, PixelFormat::Rgb);
        assert_eq!(f.data, vec![6, 5, 4, 3, 2, 1]);
        let g = two_by_one().preprocess(false);
        assert_eq!(g.data, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_blank_frame() {
        let f = CameraFrame::blank(4, 3, PixelFormat::Bgr);
        assert!(f.is_well_formed());
        assert_eq!(f.data.len(), 36);
        assert!(!CameraFrame::new(2, 2, PixelFormat::Rgb, vec![0; 5]).is_well_formed());
        assert_eq!(PixelFormat::Bgr.as_str(), "bgr");
    }
}
