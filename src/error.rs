// Error type for the capture engine and the demo window.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Direct read/write of a cell outside `[0,width) x [0,height)`.
    #[error("pixel ({x},{y}) is outside the {width}x{height} grid")]
    OutOfRange {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("window init error: {0}")]
    WindowInit(String),

    #[error("window update error: {0}")]
    WindowUpdate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
