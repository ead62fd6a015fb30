//! ofdmlink Frame - pilot-grid framing
//!
//! This crate owns the validated [`FrameConfig`], the periodic 2-D pilot
//! grid that decides for every subcarrier slot whether it carries a pilot
//! or data, and the builder/extractor pair that interleaves data symbols
//! with that grid and removes them again.

pub mod config;
pub mod grid;
pub mod frame;
pub mod error;

pub use config::{FrameConfig, FrameParams, DEFAULT_PILOT};
pub use error::{FrameError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        config::{FrameConfig, FrameParams, DEFAULT_PILOT},
        grid::{PilotGrid, SlotKind},
        frame::{Frame, FrameBuilder, FrameExtractor},
        error::{FrameError, Result},
    };
}
