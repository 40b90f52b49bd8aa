//! Sign-language gesture recognition from a webcam feed.
//!
//! The hand area of each frame is cropped, binarized and classified by a
//! small convolutional network into digits, letters or action gestures.

pub mod capture;
pub mod classifier;
pub mod cli;
pub mod dataset;
pub mod keys;
pub mod labels;
pub mod output;
pub mod ranking;
pub mod session;
pub mod vision;
