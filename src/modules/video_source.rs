use std::path::Path;
use anyhow::Error;
use log::{debug, warn};
use opencv::core::{Mat, MatTraitConst};
use opencv::prelude::{VideoCaptureTrait, VideoCaptureTraitConst};
use opencv::videoio::{VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT};
use crate::modules::landmark_provider::FrameSource;
use crate::utils::image::convert_frame_to_rgb;

/// A decoded RGB frame and its position in the video.
#[derive(Debug)]
pub struct VideoFrame {
    pub index: usize,
    pub image: Mat,
}

/// VideoFileSource decodes a video file frame by frame. The capture is released on drop.
pub struct VideoFileSource {
    capture: VideoCapture,
    next_index: usize,
}

impl VideoFileSource {

    /// open starts decoding the video at `path`.
    ///
    /// # Arguments
    /// * `path` - path of the video file
    ///
    /// # Returns
    /// * `Result<VideoFileSource, Error>`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let path_str = match path.to_str() {
            None => {
                return Err(Error::msg(format!("video_source - path is not valid UTF-8: {}", path.display())))
            }
            Some(path_str) => path_str
        };

        let capture = VideoCapture::from_file(path_str, CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::msg(format!("video_source - cannot open video {}", path.display())))
        }
        debug!("opened video {}", path.display());

        Ok(VideoFileSource { capture, next_index: 0 })
    }

    /// frame_count is the container's frame count estimate.
    pub fn frame_count(&self) -> Result<usize, Error> {
        Ok(self.capture.get(CAP_PROP_FRAME_COUNT)?.max(0.0) as usize)
    }

    pub fn fps(&self) -> Result<f64, Error> {
        Ok(self.capture.get(CAP_PROP_FPS)?)
    }
}

impl FrameSource for VideoFileSource {
    type Frame = VideoFrame;

    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Error> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None)
        }

        let image = convert_frame_to_rgb(&frame)?;
        let index = self.next_index;
        self.next_index += 1;
        Ok(Some(VideoFrame { index, image }))
    }
}

impl Drop for VideoFileSource {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!("video_source - failed to release capture: {e}");
        }
    }
}
