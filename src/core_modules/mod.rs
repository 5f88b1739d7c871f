pub mod image_helper;
pub mod pixel;
pub mod policy;
