//! Duplicate face detection for uploaded images.
//!
//! Each invocation decodes an S3 object reference, searches a Rekognition face collection for
//! the face in that image and reports either that no matching face exists or that the face is
//! already enrolled.
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod outcome;
pub mod query;
