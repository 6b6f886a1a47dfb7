//! Deduplicated media-count notifications.

use tokio::sync::mpsc;

/// Event carrying the new embedded media count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaCountChanged(pub usize);

/// Emits a count-changed event when, and only when, the count differs from
/// the last emitted value.
///
/// Invoked at most once per committed assembly pass, after the pass's tree
/// has been made visible, so observers never see a count ahead of the tree
/// they can inspect.
pub struct ImageCountNotifier {
    last_emitted: usize,
    tx: mpsc::UnboundedSender<MediaCountChanged>,
}

impl ImageCountNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MediaCountChanged>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { last_emitted: 0, tx }, rx)
    }

    pub fn update(&mut self, count: usize) {
        if count == self.last_emitted {
            return;
        }
        self.last_emitted = count;
        // Receiver may be gone; the count is advisory.
        let _ = self.tx.send(MediaCountChanged(count));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_emits_only_on_change() {
        let (mut fixture, mut rx) = ImageCountNotifier::new();
        fixture.update(0);
        fixture.update(2);
        fixture.update(2);
        fixture.update(3);

        let mut actual = Vec::new();
        while let Ok(event) = rx.try_recv() {
            actual.push(event);
        }
        let expected = vec![MediaCountChanged(2), MediaCountChanged(3)];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_dropped_receiver_is_tolerated() {
        let (mut fixture, rx) = ImageCountNotifier::new();
        drop(rx);
        fixture.update(5);
        fixture.update(6);
    }
}
