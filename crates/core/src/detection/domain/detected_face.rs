/// Axis-aligned face box in source-frame pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
    pub confidence: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.x_max - self.x_min).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y_max - self.y_min).max(0.0)
    }

    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x_min.max(other.x_min) as f64;
        let iy1 = self.y_min.max(other.y_min) as f64;
        let ix2 = (self.x_max.min(other.x_max)) as f64;
        let iy2 = (self.y_max.min(other.y_max)) as f64;

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.width() as f64 * self.height() as f64;
        let area_b = other.width() as f64 * other.height() as f64;
        inter / (area_a + area_b - inter)
    }

    /// Integer pixel corners clamped to a `frame_w` × `frame_h` frame.
    pub fn clamped(&self, frame_w: u32, frame_h: u32) -> (u32, u32, u32, u32) {
        let x0 = self.x_min.max(0.0).min(frame_w as f32) as u32;
        let y0 = self.y_min.max(0.0).min(frame_h as f32) as u32;
        let x1 = self.x_max.max(0.0).min(frame_w as f32).ceil() as u32;
        let y1 = self.y_max.max(0.0).min(frame_h as f32).ceil() as u32;
        (x0, y0, x1.max(x0), y1.max(y0))
    }
}

/// One face a detector found: its box plus the identity embedding the
/// recognition model produced for it. Built fresh per detector call and
/// never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub bbox: BoundingBox,
    pub embedding: Vec<f32>,
}

/// Picks the canonical face from a still image's detections: the one whose
/// box starts leftmost. Deterministic regardless of detector output order;
/// `None` when nothing was detected.
pub fn select_primary(mut faces: Vec<DetectedFace>) -> Option<DetectedFace> {
    faces.sort_by(|a, b| a.bbox.x_min.total_cmp(&b.bbox.x_min));
    faces.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn face_at(x_min: f32, embedding: Vec<f32>) -> DetectedFace {
        DetectedFace {
            bbox: BoundingBox {
                x_min,
                y_min: 10.0,
                x_max: x_min + 40.0,
                y_max: 50.0,
                confidence: 0.9,
            },
            embedding,
        }
    }

    // --- BoundingBox ---

    #[test]
    fn test_iou_identical_boxes() {
        let a = face_at(10.0, vec![]).bbox;
        assert_relative_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_disjoint_boxes() {
        let a = face_at(0.0, vec![]).bbox;
        let b = face_at(500.0, vec![]).bbox;
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        let a = BoundingBox {
            x_min: 0.0,
            y_min: 0.0,
            x_max: 100.0,
            y_max: 100.0,
            confidence: 1.0,
        };
        let b = BoundingBox {
            x_min: 50.0,
            y_min: 0.0,
            x_max: 150.0,
            y_max: 100.0,
            confidence: 1.0,
        };
        // intersection 5000, union 15000
        assert_relative_eq!(a.iou(&b), 5000.0 / 15000.0);
    }

    #[test]
    fn test_clamped_stays_inside_frame() {
        let b = BoundingBox {
            x_min: -10.0,
            y_min: 5.5,
            x_max: 120.0,
            y_max: 90.2,
            confidence: 1.0,
        };
        assert_eq!(b.clamped(100, 80), (0, 5, 100, 80));
    }

    #[test]
    fn test_clamped_degenerate_box_collapses() {
        let b = BoundingBox {
            x_min: 150.0,
            y_min: 150.0,
            x_max: 160.0,
            y_max: 160.0,
            confidence: 1.0,
        };
        let (x0, y0, x1, y1) = b.clamped(100, 100);
        assert_eq!((x0, x1), (100, 100));
        assert_eq!((y0, y1), (100, 100));
    }

    // --- select_primary ---

    #[test]
    fn test_select_primary_empty_returns_none() {
        assert!(select_primary(vec![]).is_none());
    }

    #[test]
    fn test_select_primary_picks_leftmost_box() {
        let faces = vec![
            face_at(120.0, vec![1.0]),
            face_at(15.0, vec![2.0]),
            face_at(300.0, vec![3.0]),
        ];
        let picked = select_primary(faces).unwrap();
        assert_eq!(picked.embedding, vec![2.0]);
    }

    #[test]
    fn test_select_primary_is_order_independent() {
        let a = face_at(15.0, vec![1.0]);
        let b = face_at(120.0, vec![2.0]);

        let forward = select_primary(vec![a.clone(), b.clone()]).unwrap();
        let reversed = select_primary(vec![b, a]).unwrap();
        assert_eq!(forward, reversed);
        assert_eq!(forward.embedding, vec![1.0]);
    }

    #[test]
    fn test_select_primary_single_face() {
        let faces = vec![face_at(50.0, vec![9.0])];
        assert_eq!(select_primary(faces).unwrap().embedding, vec![9.0]);
    }
}
