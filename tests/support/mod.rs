#![allow(dead_code)]

pub mod mock_artifacts;
pub mod tables;
