//! A drawing session: the live capture grid, the stroke state that feeds it,
//! and the derived feature grids a consumer renders or classifies.
//!
//! The session is single-threaded. Hosts that receive pointer events on
//! another thread hand them over through a channel and drain it here, e.g.
//! `session.drain(receiver.try_iter())`.

use log::info;

use crate::config::Config;
use crate::error::Result;
use crate::grid::PixelGrid;
use crate::normalize::Normalizer;
use crate::stroke::StrokeRasterizer;
use crate::trim::Trimmer;
use crate::types::{InputEvent, PointerSample};

#[derive(Debug, Clone)]
pub struct CaptureSession {
    grid: PixelGrid,
    rasterizer: StrokeRasterizer,
}

impl CaptureSession {
    pub fn new(config: &Config) -> Self {
        Self {
            grid: PixelGrid::new(config.capture.width, config.capture.height),
            rasterizer: StrokeRasterizer::new(&config.capture),
        }
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn change_counter(&self) -> u64 {
        self.grid.change_counter()
    }

    pub fn pointer(&mut self, sample: PointerSample) -> Result<usize> {
        self.rasterizer.feed(&mut self.grid, sample)
    }

    /// Wipes the canvas and forgets the current stroke.
    pub fn reset(&mut self) {
        info!(target: "session", "reset, dropping {} active pixels", self.grid.count_active());
        self.grid.reset();
        self.rasterizer.end_stroke();
    }

    pub fn handle(&mut self, event: InputEvent) -> Result<usize> {
        match event {
            InputEvent::Pointer(sample) => self.pointer(sample),
            InputEvent::Reset => {
                self.reset();
                Ok(0)
            }
        }
    }

    /// Applies events in order. Returns how many cells were newly set.
    pub fn drain<I>(&mut self, events: I) -> Result<usize>
    where
        I: IntoIterator<Item = InputEvent>,
    {
        let mut added = 0;
        for event in events {
            added += self.handle(event)?;
        }
        Ok(added)
    }
}

/// The two feature grids shown next to the canvas: a plain crop and a
/// padded, clutter-filtered crop, both normalized.
#[derive(Debug, Clone)]
pub struct FeatureCache {
    trimmer: Trimmer,
    normalizer: Normalizer,
    seen: Option<u64>,
    plain: PixelGrid,
    filtered: PixelGrid,
}

impl FeatureCache {
    pub fn new(config: &Config) -> Self {
        let empty = PixelGrid::new(config.normalize.width, config.normalize.height);
        Self {
            trimmer: Trimmer::new(config.trim.clone()),
            normalizer: Normalizer::new(config.normalize.clone()),
            seen: None,
            plain: empty.clone(),
            filtered: empty,
        }
    }

    /// Recomputes both grids if the source changed since the last call.
    /// Returns whether anything was recomputed.
    pub fn refresh(&mut self, source: &PixelGrid) -> bool {
        let counter = source.change_counter();
        if self.seen == Some(counter) {
            return false;
        }
        self.seen = Some(counter);
        self.plain = self.normalizer.normalize(&self.trimmer.trim(source, false));
        self.filtered = self.normalizer.normalize(&self.trimmer.trim(source, true));
        true
    }

    pub fn plain(&self) -> &PixelGrid {
        &self.plain
    }

    pub fn filtered(&self) -> &PixelGrid {
        &self.filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Config {
        let mut config = Config::default();
        config.capture.width = 60;
        config.capture.height = 60;
        config
    }

    #[test]
    fn events_draw_and_reset() {
        let mut session = CaptureSession::new(&small());
        let events = [
            InputEvent::Pointer(PointerSample::down(10, 10)),
            InputEvent::Pointer(PointerSample::down(20, 10)),
            InputEvent::Pointer(PointerSample::up(20, 10)),
        ];
        let added = session.drain(events).unwrap();
        assert_eq!(added, 13 * 3);
        assert_eq!(session.grid().count_active(), 39);

        let before = session.change_counter();
        session.handle(InputEvent::Reset).unwrap();
        assert!(session.grid().is_empty());
        assert!(session.change_counter() > before);
        assert_eq!(session.grid().size(), (60, 60));
    }

    #[test]
    fn reset_ends_the_stroke() {
        let mut session = CaptureSession::new(&small());
        session.pointer(PointerSample::down(10, 10)).unwrap();
        session.reset();
        session.pointer(PointerSample::down(30, 10)).unwrap();
        // Only the second stamp: no line back to (10,10).
        assert_eq!(session.grid().count_active(), 9);
    }

    #[test]
    fn drains_a_channel() {
        let (tx, rx) = std::sync::mpsc::channel();
        let producer = std::thread::spawn(move || {
            for x in 10..15 {
                tx.send(InputEvent::Pointer(PointerSample::down(x, 30))).unwrap();
            }
        });
        producer.join().unwrap();

        let mut session = CaptureSession::new(&small());
        session.drain(rx.try_iter()).unwrap();
        assert_eq!(session.grid().count_active(), 7 * 3);
    }

    #[test]
    fn cache_recomputes_only_on_change() {
        let config = small();
        let mut session = CaptureSession::new(&config);
        let mut cache = FeatureCache::new(&config);

        assert!(cache.refresh(session.grid()));
        assert!(cache.plain().is_empty());
        assert!(!cache.refresh(session.grid()));

        session.pointer(PointerSample::down(20, 20)).unwrap();
        session.pointer(PointerSample::down(40, 40)).unwrap();
        assert!(cache.refresh(session.grid()));
        assert_eq!(cache.plain().size(), (10, 10));
        assert!(!cache.plain().is_empty());
        assert!(!cache.filtered().is_empty());
        assert!(!cache.refresh(session.grid()));

        // Re-drawing over existing ink changes nothing.
        session.pointer(PointerSample::down(40, 40)).unwrap();
        assert!(!cache.refresh(session.grid()));
    }

    #[test]
    fn zero_width_feature_grid_stays_empty() {
        let mut config = small();
        config.normalize.width = 0;
        let mut session = CaptureSession::new(&config);
        let mut cache = FeatureCache::new(&config);
        session.pointer(PointerSample::down(30, 30)).unwrap();

        assert!(cache.refresh(session.grid()));
        assert_eq!(cache.plain().size(), (0, 10));
        assert!(cache.filtered().is_empty());
    }
}
