//! MP4 export of digest reels through the system `ffmpeg`.

use std::ffi::OsString;
use std::fs::File;
use std::io::{Read as _, Seek as _, SeekFrom, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::frame::FrameRGBA;

/// Writes a reel as H.264 (`yuv420p`) with an AAC soundtrack when the mix is not silent.
///
/// Frames are streamed as raw RGBA on stdin. They are expected to be opaque, which every
/// digest frame is since clips are drawn over black.
pub struct ReelEncoder {
    out_path: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    log: Option<File>,
    frame_len: usize,
    last_idx: Option<FrameIndex>,
}

impl ReelEncoder {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            child: None,
            stdin: None,
            log: None,
            frame_len: 0,
            last_idx: None,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    fn failure_log(&mut self) -> String {
        let Some(log) = self.log.as_mut() else {
            return String::new();
        };
        let mut text = String::new();
        if log.seek(SeekFrom::Start(0)).is_ok() {
            let _ = log.read_to_string(&mut text);
        }
        text.trim().to_owned()
    }
}

/// Command line for one reel. Validates what `ffmpeg` would otherwise reject mid-stream.
pub fn encode_args(cfg: &SinkConfig, out_path: &Path) -> StudioResult<Vec<OsString>> {
    if cfg.width == 0 || cfg.height == 0 {
        return Err(StudioError::validation("reel width/height must be non-zero"));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(StudioError::validation(format!(
            "reel size {}x{} must be even for yuv420p",
            cfg.width, cfg.height
        )));
    }

    let mut args: Vec<OsString> = [
        "-y",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push("-s".into());
    args.push(format!("{}x{}", cfg.width, cfg.height).into());
    // `-r` before `-i` sets the rate of the raw input.
    args.push("-r".into());
    args.push(format!("{}/{}", cfg.fps.num, cfg.fps.den).into());
    args.push("-i".into());
    args.push("pipe:0".into());

    if let Some(audio) = &cfg.audio {
        if audio.sample_rate == 0 || audio.channels == 0 {
            return Err(StudioError::validation(
                "soundtrack needs a non-zero sample rate and channel count",
            ));
        }
        args.push("-f".into());
        args.push("f32le".into());
        args.push("-ar".into());
        args.push(audio.sample_rate.to_string().into());
        args.push("-ac".into());
        args.push(audio.channels.to_string().into());
        args.push("-i".into());
        args.push(audio.path.clone().into());
    }

    for a in ["-c:v", "libx264", "-pix_fmt", "yuv420p"] {
        args.push(a.into());
    }
    if cfg.audio.is_some() {
        for a in ["-c:a", "aac", "-shortest"] {
            args.push(a.into());
        }
    } else {
        args.push("-an".into());
    }
    args.push("-movflags".into());
    args.push("+faststart".into());
    args.push(out_path.into());
    Ok(args)
}

impl FrameSink for ReelEncoder {
    fn begin(&mut self, cfg: SinkConfig) -> StudioResult<()> {
        let args = encode_args(&cfg, &self.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(StudioError::media(
                "ffmpeg is required for reel export, but was not found on PATH",
            ));
        }

        let log = tempfile::tempfile()
            .map_err(|e| StudioError::media(format!("no scratch file for ffmpeg log: {e}")))?;
        let log_out = log
            .try_clone()
            .map_err(|e| StudioError::media(format!("no scratch file for ffmpeg log: {e}")))?;
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log_out))
            .spawn()
            .map_err(|e| StudioError::media(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| StudioError::media("failed to open ffmpeg stdin"))?;

        tracing::debug!(
            out = %self.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            audio = cfg.audio.is_some(),
            "reel encoder started"
        );

        self.frame_len = cfg.width as usize * cfg.height as usize * 4;
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.log = Some(log);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StudioResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StudioError::media("reel encoder is not running"));
        };
        if self.last_idx.is_some_and(|last| idx.0 <= last.0) {
            return Err(StudioError::media("reel frames must arrive in order"));
        }
        if frame.data.len() != self.frame_len {
            return Err(StudioError::validation(format!(
                "frame {}x{} does not match the reel size",
                frame.width, frame.height
            )));
        }
        self.last_idx = Some(idx);
        stdin
            .write_all(&frame.data)
            .map_err(|e| StudioError::media(format!("failed to write frame to ffmpeg: {e}")))
    }

    fn end(&mut self) -> StudioResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| StudioError::media("reel encoder is not running"))?;
        let status = child
            .wait()
            .map_err(|e| StudioError::media(format!("failed to wait for ffmpeg: {e}")))?;
        if !status.success() {
            return Err(StudioError::media(format!(
                "ffmpeg exited with status {status}: {}",
                self.failure_log()
            )));
        }
        self.log = None;
        Ok(())
    }
}

impl Drop for ReelEncoder {
    fn drop(&mut self) {
        // Unfinished reel: stop ffmpeg and reap it.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
