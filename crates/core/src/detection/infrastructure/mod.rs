pub mod cached_face_detector;
pub mod fixed_face_detector;
