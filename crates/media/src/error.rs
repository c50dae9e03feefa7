use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("upload is empty")]
    Empty,

    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("image has zero width or height")]
    ZeroSized,
}
