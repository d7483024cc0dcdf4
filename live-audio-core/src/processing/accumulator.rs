/// Ordered buffer of converted capture blocks awaiting emission.
///
/// Blocks are kept oldest to newest. Once the pending sample count reaches
/// the threshold the whole buffer is merged into one frame and reset in a
/// single step, so a frame never splits a block and never reorders samples.
#[derive(Debug)]
pub struct FrameAccumulator {
    blocks: Vec<Vec<i16>>,
    pending: usize,
    threshold: usize,
}

impl FrameAccumulator {
    pub fn new(threshold: usize) -> Self {
        Self {
            blocks: Vec::new(),
            pending: 0,
            threshold,
        }
    }

    /// Append a block. Returns the merged frame if the threshold was reached.
    pub fn push(&mut self, block: Vec<i16>) -> Option<Vec<i16>> {
        if !block.is_empty() {
            self.pending += block.len();
            self.blocks.push(block);
        }
        if self.pending >= self.threshold && self.pending > 0 {
            Some(self.drain())
        } else {
            None
        }
    }

    /// Take whatever is pending regardless of threshold, for explicit flushes.
    pub fn take_remainder(&mut self) -> Option<Vec<i16>> {
        if self.pending == 0 {
            return None;
        }
        Some(self.drain())
    }

    /// Discard pending samples without emitting them.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.pending = 0;
    }

    /// Number of samples waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    fn drain(&mut self) -> Vec<i16> {
        let mut merged = Vec::with_capacity(self.pending);
        for block in self.blocks.drain(..) {
            merged.extend_from_slice(&block);
        }
        self.pending = 0;
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_blocks_below_threshold() {
        let mut acc = FrameAccumulator::new(4);
        assert!(acc.push(vec![1, 2]).is_none());
        assert_eq!(acc.pending(), 2);
    }

    #[test]
    fn emits_everything_once_threshold_reached() {
        let mut acc = FrameAccumulator::new(4);
        acc.push(vec![1, 2, 3]);
        let frame = acc.push(vec![4, 5, 6]).unwrap();

        // The whole second block rides along, nothing is split off.
        assert_eq!(frame, vec![1, 2, 3, 4, 5, 6]);
        assert!(acc.is_empty());
    }

    #[test]
    fn block_at_threshold_emits_immediately() {
        let mut acc = FrameAccumulator::new(3);
        assert_eq!(acc.push(vec![7, 8, 9]), Some(vec![7, 8, 9]));
    }

    #[test]
    fn remainder_is_taken_in_order() {
        let mut acc = FrameAccumulator::new(100);
        acc.push(vec![1]);
        acc.push(vec![2, 3]);
        assert_eq!(acc.take_remainder(), Some(vec![1, 2, 3]));
        assert_eq!(acc.take_remainder(), None);
    }

    #[test]
    fn clear_discards_pending() {
        let mut acc = FrameAccumulator::new(100);
        acc.push(vec![1, 2]);
        acc.clear();
        assert!(acc.is_empty());
        assert_eq!(acc.take_remainder(), None);
    }

    #[test]
    fn empty_blocks_are_ignored() {
        let mut acc = FrameAccumulator::new(1);
        assert!(acc.push(Vec::new()).is_none());
        assert!(acc.is_empty());
    }
}
