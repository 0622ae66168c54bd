//! The low-watermark protocol shared by all three chunker variants.
//! Chunks may complete out of order; the watermark is the greatest
//! contiguous prefix known to be fully persisted, and is the basis for
//! the resume checkpoint.

use crate::error::{OscError, OscResult};
use crate::table_info::Chunk;

#[derive(Default)]
pub struct WatermarkTracker {
    watermark: Option<Chunk>,
    queued: Vec<Chunk>,
}

impl WatermarkTracker {
    pub fn new() -> Self {
        WatermarkTracker::default()
    }

    /// Seeds the tracker from a restored checkpoint. The restored chunk's
    /// lower bound is special: the first chunk emitted post-restore will
    /// repeat it, and that repeat must be recognized as the one that sets
    /// (not queues behind) the watermark.
    pub fn restore(&mut self, checkpoint: Chunk) {
        self.watermark = Some(checkpoint);
        self.queued.clear();
    }

    pub fn get(&self) -> Option<&Chunk> {
        self.watermark.as_ref()
    }

    pub fn serialized(&self) -> OscResult<String> {
        match &self.watermark {
            Some(c) => c.to_json(),
            None => Err(OscError::InvariantViolation("watermark not yet ready".into())),
        }
    }

    fn is_special_restored_chunk(&self, chunk: &Chunk) -> bool {
        let (Some(c_lower), Some(_)) = (&chunk.lower_bound, &chunk.upper_bound) else { return false };
        let Some(wm) = &self.watermark else { return false };
        let (Some(wm_lower), Some(_)) = (&wm.lower_bound, &wm.upper_bound) else { return false };
        c_lower.value == wm_lower.value
    }

    /// Aligns a completed chunk against the current watermark, queuing it
    /// if it arrived out of order, then drains any queued chunks that are
    /// now contiguous.
    pub fn bump(&mut self, chunk: Chunk) -> OscResult<()> {
        // Step 1: the terminal, open-ended chunk is never a safe resume point.
        if chunk.upper_bound.is_none() {
            return Ok(());
        }

        // Step 2: first chunk ever, or the special post-restore repeat.
        let is_first = self.watermark.is_none() && chunk.lower_bound.is_none();
        if is_first || self.is_special_restored_chunk(&chunk) {
            self.watermark = Some(chunk);
            return self.drain();
        }

        // Step 3/4: aligned with the current watermark, or not.
        let aligns = match &self.watermark {
            Some(wm) => match (&wm.upper_bound, &chunk.lower_bound) {
                (Some(u), Some(l)) => u.value == l.value,
                _ => false,
            },
            None => false,
        };
        if !aligns {
            self.queued.push(chunk);
            return Ok(());
        }
        self.watermark = Some(chunk);
        self.drain()
    }

    /// Step 5: repeatedly scan the queue for a chunk aligned with the
    /// current watermark, advancing and removing it; stop when nothing
    /// aligns.
    fn drain(&mut self) -> OscResult<()> {
        loop {
            let wm_upper = match self.watermark.as_ref().and_then(|w| w.upper_bound.as_ref()) {
                Some(u) => u.value.clone(),
                None => return Ok(()),
            };
            let mut found = None;
            for (i, queued) in self.queued.iter().enumerate() {
                if queued.lower_bound.is_none() || queued.upper_bound.is_none() {
                    return Err(OscError::InvariantViolation(format!(
                        "queued chunk with a nil bound encountered: {queued:?}"
                    )));
                }
                let l = &queued.lower_bound.as_ref().unwrap().value;
                if *l == wm_upper {
                    found = Some(i);
                    break;
                }
            }
            match found {
                Some(i) => {
                    self.watermark = Some(self.queued.remove(i));
                }
                None => return Ok(()),
            }
        }
    }
}
