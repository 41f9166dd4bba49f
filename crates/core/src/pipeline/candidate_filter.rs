use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::identity_matcher::{matches, MatchError};

/// Picks the face to swap in one frame: candidates are tried in detector
/// order, and the first qualifying one wins; the rest of the frame's
/// faces are ignored.
///
/// With a reference face configured, qualifying means an identity match
/// below `threshold`; without one, the first detected face qualifies.
pub fn first_qualifying<'a>(
    faces: &'a [DetectedFace],
    reference: Option<&DetectedFace>,
    threshold: f64,
) -> Result<Option<&'a DetectedFace>, MatchError> {
    match reference {
        None => Ok(faces.first()),
        Some(reference) => {
            for face in faces {
                if matches(face, reference, threshold)? {
                    return Ok(Some(face));
                }
            }
            Ok(None)
        }
    }
}
