use aws_sdk_rekognition::types::FaceMatch;

/// Location of an image stored in S3, with the object key already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub bucket: String,
    pub key: String,
}

impl ImageReference {
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
        }
    }
}

/// A single `SearchFacesByImage` request. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceSearchQuery {
    collection_id: String,
    image: ImageReference,
    face_match_threshold: f32,
    max_faces: i32,
}

impl FaceSearchQuery {
    pub fn new(
        collection_id: &str,
        image: ImageReference,
        face_match_threshold: f32,
        max_faces: i32,
    ) -> Self {
        Self {
            collection_id: collection_id.to_owned(),
            image,
            face_match_threshold,
            max_faces,
        }
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    pub fn image(&self) -> &ImageReference {
        &self.image
    }

    /// Minimum similarity, in percent, a face needs to be returned as a match.
    pub fn face_match_threshold(&self) -> f32 {
        self.face_match_threshold
    }

    pub fn max_faces(&self) -> i32 {
        self.max_faces
    }
}

/// A face from the collection that Rekognition considers similar to the searched image.
/// Only kept around for logging; callers should not branch on its contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceCandidate {
    pub face_id: Option<String>,
    pub similarity: Option<f32>,
}

impl From<&FaceMatch> for FaceCandidate {
    fn from(face_match: &FaceMatch) -> Self {
        FaceCandidate {
            face_id: face_match
                .face()
                .and_then(|face| face.face_id())
                .map(str::to_owned),
            similarity: face_match.similarity(),
        }
    }
}
