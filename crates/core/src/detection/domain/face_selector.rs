use crate::shared::constants::FACE_CENTER_PENALTY;
use crate::shared::rectangle::Rectangle;

/// Picks the face most likely to belong to the monitored subject.
///
/// With a known frame size, faces are scored by
/// `area / (1 + penalty * distance_to_frame_center)`; otherwise the largest
/// face wins. Ties keep the earlier face.
pub fn select_primary_face(
    faces: &[Rectangle],
    frame_size: Option<(u32, u32)>,
) -> Option<Rectangle> {
    let mut best: Option<(Rectangle, f64)> = None;
    for face in faces.iter().filter(|f| f.is_well_formed()) {
        let score = match frame_size {
            Some((w, h)) => centrality_score(face, w, h),
            None => face.area(),
        };
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((*face, score)),
        }
    }
    best.map(|(face, _)| face)
}

fn centrality_score(face: &Rectangle, frame_w: u32, frame_h: u32) -> f64 {
    let (cx, cy) = face.center();
    let dx = cx - frame_w as f64 / 2.0;
    let dy = cy - frame_h as f64 / 2.0;
    let distance = (dx * dx + dy * dy).sqrt();
    face.area() / (1.0 + distance * FACE_CENTER_PENALTY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x: i32, y: i32, w: i32, h: i32) -> Rectangle {
        Rectangle::new(x, y, w, h)
    }

    #[test]
    fn test_no_faces() {
        assert!(select_primary_face(&[], None).is_none());
        assert!(select_primary_face(&[], Some((640, 480))).is_none());
    }

    #[test]
    fn test_largest_without_frame_size() {
        let small = rect(0, 0, 40, 40);
        let large = rect(300, 300, 80, 80);
        assert_eq!(select_primary_face(&[small, large], None), Some(large));
    }

    #[test]
    fn test_centered_face_beats_slightly_larger_corner_face() {
        // centered: 100x100 at frame center, distance 0 -> score 10000
        // corner: 110x110 near origin, distance ~341 -> score ~2750
        let centered = rect(270, 190, 100, 100);
        let corner = rect(0, 0, 110, 110);
        assert_eq!(
            select_primary_face(&[corner, centered], Some((640, 480))),
            Some(centered)
        );
    }

    #[test]
    fn test_centrality_score_at_center_is_area() {
        let face = rect(270, 190, 100, 100);
        assert_relative_eq!(centrality_score(&face, 640, 480), 10000.0);
    }

    #[test]
    fn test_tie_keeps_first() {
        let a = rect(0, 0, 50, 50);
        let b = rect(100, 0, 50, 50);
        assert_eq!(select_primary_face(&[a, b], None), Some(a));
    }

    #[test]
    fn test_malformed_faces_ignored() {
        let bad = rect(0, 0, 0, 500);
        assert!(select_primary_face(&[bad], None).is_none());
    }
}
