//! Per-frame vision verdicts and their aggregation into one report.
//!
//! Each frame is judged independently; every flag of the report is decided
//! by strict majority over the frames that produced a parseable verdict.

use serde::{Deserialize, Serialize};

/// Most frames a client may submit for one validation run.
pub const MAX_VIDEO_FRAMES: usize = 5;

/// Verdict for a single frame, as returned by the vision model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameAnalysis {
    pub has_human: bool,
    pub has_garment: bool,
    pub has_face: bool,
    pub has_occlusion: bool,
    pub has_blur: bool,
    pub has_noise: bool,
    pub reasons: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FrameParseError {
    #[error("reply contains no JSON object")]
    NoJsonObject,

    #[error("reply JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Slice from the first `{` to the last `}`, inclusive.
///
/// Models often wrap the object in prose or code fences.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

/// Parse a free-text model reply into a frame verdict.
pub fn parse_frame_reply(reply: &str) -> Result<FrameAnalysis, FrameParseError> {
    let json = extract_json_object(reply).ok_or(FrameParseError::NoJsonObject)?;
    Ok(serde_json::from_str(json)?)
}

/// Aggregated verdict for a whole video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub passed: bool,
    pub frames_analyzed: usize,
    pub has_human: bool,
    pub has_garment: bool,
    pub has_face: bool,
    pub has_occlusion: bool,
    pub has_blur: bool,
    pub has_noise: bool,
    pub reasons: Vec<String>,
}

fn majority(frames: &[FrameAnalysis], flag: impl Fn(&FrameAnalysis) -> bool) -> bool {
    let votes = frames.iter().filter(|f| flag(f)).count();
    votes * 2 > frames.len()
}

/// Combine frame verdicts. An empty slice never passes.
pub fn aggregate(frames: &[FrameAnalysis]) -> ValidationReport {
    let has_human = majority(frames, |f| f.has_human);
    let has_garment = majority(frames, |f| f.has_garment);
    let has_face = majority(frames, |f| f.has_face);
    let has_occlusion = majority(frames, |f| f.has_occlusion);
    let has_blur = majority(frames, |f| f.has_blur);
    let has_noise = majority(frames, |f| f.has_noise);

    let mut reasons = Vec::new();
    if frames.is_empty() {
        reasons.push("No frames could be analyzed".to_string());
    } else {
        if !has_human {
            reasons.push("No person detected in most frames".to_string());
        }
        if !has_garment {
            reasons.push("Garment not clearly visible".to_string());
        }
        if has_occlusion {
            reasons.push("Garment is obstructed".to_string());
        }
        if has_blur {
            reasons.push("Video is too blurry".to_string());
        }
        if has_noise {
            reasons.push("Video is too noisy or dark".to_string());
        }
    }
    for reason in frames.iter().flat_map(|f| f.reasons.iter()) {
        let reason = reason.trim();
        if !reason.is_empty() && !reasons.iter().any(|r| r == reason) {
            reasons.push(reason.to_string());
        }
    }

    ValidationReport {
        passed: !frames.is_empty()
            && has_human
            && has_garment
            && !has_occlusion
            && !has_blur
            && !has_noise,
        frames_analyzed: frames.len(),
        has_human,
        has_garment,
        has_face,
        has_occlusion,
        has_blur,
        has_noise,
        reasons,
    }
}
