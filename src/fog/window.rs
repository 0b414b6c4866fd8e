//! Sliding-window packet accumulation.
//!
//! Packets are appended one at a time; when the buffer reaches the configured
//! window size the whole sequence is detached atomically and handed off as a
//! frozen [`Window`] for processing while ingestion of the next window
//! continues. The buffer itself carries no lock: the owning node guards it
//! (together with the entropy history) behind a single mutex.

/// A frozen batch of packets detached from the buffer.
///
/// Windows are immutable after handoff and processed exactly once. The index
/// increases monotonically in the order windows fill.
#[derive(Debug)]
pub struct Window {
    /// Monotonic handoff index, starting at 0.
    pub index: u64,
    /// Exactly `window_size` packets in arrival order.
    pub packets: Vec<Vec<u8>>,
}

/// Accumulates packets until the window size is reached.
#[derive(Debug)]
pub struct WindowBuffer {
    packets: Vec<Vec<u8>>,
    window_size: usize,
    next_index: u64,
}

impl WindowBuffer {
    pub fn new(window_size: usize) -> Self {
        WindowBuffer {
            packets: Vec::with_capacity(window_size),
            window_size,
            next_index: 0,
        }
    }

    /// Append a packet; if the buffer reaches the window size, detach and
    /// return the frozen window (the buffer restarts empty).
    ///
    /// Empty packets are ignored and do not advance the window.
    pub fn push(&mut self, packet: Vec<u8>) -> Option<Window> {
        if packet.is_empty() {
            log::warn!("Ignoring empty packet");
            return None;
        }
        self.packets.push(packet);
        log::debug!("Window fill: {}/{}", self.packets.len(), self.window_size);
        if self.packets.len() >= self.window_size {
            let packets = std::mem::replace(&mut self.packets, Vec::with_capacity(self.window_size));
            let index = self.next_index;
            self.next_index += 1;
            return Some(Window { index, packets });
        }
        None
    }

    /// Number of packets currently buffered.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detaches_exactly_at_window_size() {
        let mut buffer = WindowBuffer::new(3);
        assert!(buffer.push(vec![1]).is_none());
        assert!(buffer.push(vec![2]).is_none());
        let window = buffer.push(vec![3]).expect("third packet freezes the window");
        assert_eq!(window.index, 0);
        assert_eq!(window.packets, vec![vec![1], vec![2], vec![3]]);
        // Buffer restarts empty and keeps counting
        assert!(buffer.is_empty());
        assert!(buffer.push(vec![4]).is_none());
        assert!(buffer.push(vec![5]).is_none());
        let window = buffer.push(vec![6]).unwrap();
        assert_eq!(window.index, 1);
    }

    #[test]
    fn empty_packets_are_ignored() {
        let mut buffer = WindowBuffer::new(2);
        assert!(buffer.push(Vec::new()).is_none());
        assert_eq!(buffer.len(), 0);
        assert!(buffer.push(vec![9]).is_none());
        assert!(buffer.push(Vec::new()).is_none());
        let window = buffer.push(vec![8]).unwrap();
        assert_eq!(window.packets.len(), 2);
    }

    #[test]
    fn preserves_arrival_order() {
        let mut buffer = WindowBuffer::new(4);
        for byte in 0u8..3 {
            assert!(buffer.push(vec![byte]).is_none());
        }
        let window = buffer.push(vec![3]).unwrap();
        let order: Vec<u8> = window.packets.iter().map(|p| p[0]).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }
}
