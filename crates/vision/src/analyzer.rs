//! The per-frame analysis seam and concurrent fan-out.

use std::sync::Mutex;

use async_trait::async_trait;
use fitback_core::video_validation::{aggregate, FrameAnalysis, ValidationReport};
use futures::future::join_all;

use crate::client::{VisionClient, VisionError};

/// Produces a verdict for one base64-encoded frame.
#[async_trait]
pub trait FrameAnalyzer: Send + Sync {
    async fn analyze(&self, frame: &str) -> Result<FrameAnalysis, VisionError>;
}

#[async_trait]
impl FrameAnalyzer for VisionClient {
    async fn analyze(&self, frame: &str) -> Result<FrameAnalysis, VisionError> {
        self.analyze_frame(frame).await
    }
}

/// Analyze every frame concurrently and aggregate the verdicts.
///
/// Frames whose analysis fails are left out of the vote. If none succeed
/// the last error is returned instead of a report.
pub async fn validate_frames(
    analyzer: &dyn FrameAnalyzer,
    frames: &[String],
) -> Result<ValidationReport, VisionError> {
    let results = join_all(frames.iter().map(|frame| analyzer.analyze(frame))).await;

    let mut verdicts = Vec::with_capacity(results.len());
    let mut last_error = None;
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(verdict) => verdicts.push(verdict),
            Err(e) => {
                tracing::warn!(frame = index, error = %e, "Frame analysis failed");
                last_error = Some(e);
            }
        }
    }

    if verdicts.is_empty() {
        if let Some(e) = last_error {
            return Err(VisionError::NoFramesAnalyzed(e.to_string()));
        }
    }

    let report = aggregate(&verdicts);
    tracing::debug!(
        frames = frames.len(),
        analyzed = report.frames_analyzed,
        passed = report.passed,
        "Frames validated",
    );
    Ok(report)
}

/// Replays canned verdicts in order, then repeats the last one.
///
/// `None` entries simulate a failed frame.
pub struct ScriptedAnalyzer {
    script: Vec<Option<FrameAnalysis>>,
    cursor: Mutex<usize>,
}

impl ScriptedAnalyzer {
    pub fn new(script: Vec<Option<FrameAnalysis>>) -> Self {
        Self {
            script,
            cursor: Mutex::new(0),
        }
    }

    /// Every frame gets the same verdict.
    pub fn always(verdict: FrameAnalysis) -> Self {
        Self::new(vec![Some(verdict)])
    }

    fn next(&self) -> Option<FrameAnalysis> {
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        let index = (*cursor).min(self.script.len().saturating_sub(1));
        *cursor += 1;
        self.script.get(index).cloned().flatten()
    }
}

#[async_trait]
impl FrameAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, _frame: &str) -> Result<FrameAnalysis, VisionError> {
        self.next().ok_or(VisionError::EmptyReply)
    }
}
