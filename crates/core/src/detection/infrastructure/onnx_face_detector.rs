//! YOLO face detector using ONNX Runtime via `ort`.
//!
//! Letterboxes each frame to the model's square input, runs inference,
//! keeps confident boxes, suppresses overlaps and maps the survivors back
//! to frame coordinates. No state is carried from one frame to the next.
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::{DEFAULT_CONFIDENCE, DEFAULT_MIN_FACE_SIZE};
use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

use super::execution_provider::load_session;

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorSettings {
    /// Minimum detection score in `0.0..=1.0`.
    pub confidence: f64,
    /// Faces smaller than this on either side are dropped.
    pub min_face_size: u32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
        }
    }
}

pub struct OnnxFaceDetector {
    session: ort::session::Session,
    settings: DetectorSettings,
    input_size: u32,
}

impl OnnxFaceDetector {
    /// Load a YOLO face model and prepare for inference.
    ///
    /// The input resolution is read from the model's NCHW input shape,
    /// falling back to 640 when the shape is dynamic.
    pub fn new(
        model_path: &Path,
        settings: DetectorSettings,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { shape, .. } if shape.len() >= 4 && shape[2] > 0 => {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session,
            settings,
            input_size,
        })
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, BoxError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Ok(Vec::new());
        }

        let (input_tensor, transform) = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("face model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor
            .as_slice()
            .ok_or("face model output is not contiguous")?;

        let mut candidates = parse_candidates(data, &shape, self.settings.confidence)?;
        for c in &mut candidates {
            transform.unmap(&mut c.bbox);
        }

        let kept = nms(&mut candidates, NMS_IOU_THRESH);
        Ok(to_regions(
            &kept,
            frame.width(),
            frame.height(),
            self.settings.min_face_size,
        ))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

struct LetterboxTransform {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl LetterboxTransform {
    /// Maps `[x1, y1, x2, y2]` from model input space back to frame space.
    fn unmap(&self, bbox: &mut [f64; 4]) {
        bbox[0] = (bbox[0] - self.pad_x as f64) / self.scale;
        bbox[1] = (bbox[1] - self.pad_y as f64) / self.scale;
        bbox[2] = (bbox[2] - self.pad_x as f64) / self.scale;
        bbox[3] = (bbox[3] - self.pad_y as f64) / self.scale;
    }
}

/// Nearest-neighbour resize into a `target_size` square, centred and
/// padded, as a normalized NCHW float tensor.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, LetterboxTransform) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let size = target_size as usize;
    let mut tensor = ndarray::Array4::<f32>::from_elem((1, 3, size, size), PAD_VALUE);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (
        tensor,
        LetterboxTransform {
            scale,
            pad_x,
            pad_y,
        },
    )
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Candidate {
    bbox: [f64; 4],
    score: f64,
}

/// Reads `[cx, cy, w, h, score, ...]` rows from a `[1, F, N]` or `[1, N, F]`
/// output. Anything after the score (keypoints) is ignored.
fn parse_candidates(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
) -> Result<Vec<Candidate>, BoxError> {
    if shape.len() != 3 {
        return Err(format!("unexpected face model output shape: {shape:?}").into());
    }
    // Feature axis is the shorter one.
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 {
        return Err(format!("face model output has {num_feats} features, need 5").into());
    }
    if data.len() < num_dets * num_feats {
        return Err(format!(
            "face model output holds {} values, shape {shape:?} needs {}",
            data.len(),
            num_dets * num_feats
        )
        .into());
    }

    let value = |det: usize, feat: usize| -> f64 {
        let idx = if transposed {
            feat * num_dets + det
        } else {
            det * num_feats + feat
        };
        data[idx] as f64
    };

    let mut candidates = Vec::new();
    for i in 0..num_dets {
        let score = value(i, 4);
        if score < confidence {
            continue;
        }
        let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));
        candidates.push(Candidate {
            bbox: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
            score,
        });
    }
    Ok(candidates)
}

/// Greedy NMS: highest score first, drop anything overlapping a kept box.
fn nms(candidates: &mut [Candidate], iou_thresh: f64) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<Candidate> = Vec::new();
    for c in candidates.iter() {
        if keep.iter().all(|k| bbox_iou(&k.bbox, &c.bbox) <= iou_thresh) {
            keep.push(c.clone());
        }
    }
    keep
}

fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

fn to_regions(kept: &[Candidate], fw: u32, fh: u32, min_face_size: u32) -> Vec<Region> {
    kept.iter()
        .filter_map(|c| {
            Region::from_corners(c.bbox[0], c.bbox[1], c.bbox[2], c.bbox[3]).clamp_to(fw, fh)
        })
        .filter(|r| r.is_at_least(min_face_size))
        .collect()
}
