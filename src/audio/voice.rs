//! Narration synthesis.
//!
//! Engines are async; [`VoiceoverSynthesizer::synthesize_blocking`] is the entry point for
//! the sync pipeline and works with or without a runtime on the calling thread.

use std::{
    path::{Path, PathBuf},
    process::Stdio,
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;

use crate::{foundation::error::SynthesisError, runtime};

/// Text-to-speech backend writing one audio file per request.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Speak `text` with `voice` into `out_path`.
    async fn speak(&self, text: &str, voice: &str, out_path: &Path) -> Result<(), SynthesisError>;
}

/// Runs the `edge-tts` command line tool.
#[derive(Clone, Debug)]
pub struct EdgeTtsCommand {
    program: PathBuf,
}

impl EdgeTtsCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for EdgeTtsCommand {
    fn default() -> Self {
        Self::new("edge-tts")
    }
}

#[async_trait]
impl SpeechEngine for EdgeTtsCommand {
    fn name(&self) -> &str {
        "edge-tts"
    }

    async fn speak(&self, text: &str, voice: &str, out_path: &Path) -> Result<(), SynthesisError> {
        let out = tokio::process::Command::new(&self.program)
            .args(["--voice", voice, "--text", text, "--write-media"])
            .arg(out_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                SynthesisError::engine(format!(
                    "failed to run '{}': {e}",
                    self.program.display()
                ))
            })?;
        if !out.status.success() {
            return Err(SynthesisError::engine(format!(
                "'{}' exited with {}: {}",
                self.program.display(),
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// POSTs `{"text", "voice"}` as JSON and stores the response body as the audio file.
#[derive(Clone, Debug)]
pub struct HttpSpeech {
    endpoint: String,
    timeout: Duration,
}

#[derive(serde::Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

impl HttpSpeech {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

#[async_trait]
impl SpeechEngine for HttpSpeech {
    fn name(&self) -> &str {
        "http"
    }

    async fn speak(&self, text: &str, voice: &str, out_path: &Path) -> Result<(), SynthesisError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| SynthesisError::engine(format!("failed to create HTTP client: {e}")))?;
        let response = client
            .post(&self.endpoint)
            .json(&SpeechRequest { text, voice })
            .send()
            .await
            .map_err(|e| SynthesisError::engine(format!("POST {}: {e}", self.endpoint)))?;
        if !response.status().is_success() {
            return Err(SynthesisError::engine(format!(
                "POST {} returned status {}",
                self.endpoint,
                response.status()
            )));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::engine(format!("read speech body: {e}")))?;
        tokio::fs::write(out_path, &body).await?;
        Ok(())
    }
}

/// Strip characters that read badly aloud: `#` is dropped, line breaks become spaces and
/// whitespace runs collapse to one space.
pub fn sanitize(text: &str) -> String {
    text.replace('#', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turns narration text into an audio file through a [`SpeechEngine`].
#[derive(Clone)]
pub struct VoiceoverSynthesizer {
    engine: Arc<dyn SpeechEngine>,
    timeout: Option<Duration>,
}

impl VoiceoverSynthesizer {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        out_path: &Path,
    ) -> Result<PathBuf, SynthesisError> {
        let clean = sanitize(text);
        if clean.is_empty() {
            return Err(SynthesisError::engine("narration text is empty"));
        }

        let speak = self.engine.speak(&clean, voice, out_path);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, speak)
                .await
                .map_err(|_| SynthesisError::Timeout(limit))??,
            None => speak.await?,
        }

        match tokio::fs::metadata(out_path).await {
            Ok(meta) if meta.len() > 0 => Ok(out_path.to_path_buf()),
            _ => Err(SynthesisError::EmptyOutput(out_path.to_path_buf())),
        }
    }

    /// Sync form of [`Self::synthesize`].
    pub fn synthesize_blocking(
        &self,
        text: &str,
        voice: &str,
        out_path: &Path,
    ) -> Result<PathBuf, SynthesisError> {
        tracing::debug!(
            engine = self.engine.name(),
            bridged = runtime::scheduler_active(),
            out = %out_path.display(),
            "synthesizing narration"
        );
        runtime::block_on(|| self.synthesize(text, voice, out_path))
            .map_err(SynthesisError::Worker)?
    }
}
