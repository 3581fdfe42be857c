//! Per-frame counters for debugging and performance analysis.

/// What one frame did. Reset at the start of every
/// [`RenderPipeline::draw_frame`](crate::pipeline::RenderPipeline::draw_frame).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Layouts that ran `perform_layout`
    pub layouts_executed: u64,
    /// Layouts answered from the committed size
    pub layouts_skipped: u64,
    pub nodes_painted: u64,
    pub image_notifications_applied: u64,
    /// Notifications for removed, detached or superseded image nodes
    pub image_notifications_dropped: u64,
}

impl FrameStats {
    pub fn total_layout_calls(&self) -> u64 {
        self.layouts_executed + self.layouts_skipped
    }

    /// Share of layout calls answered without recomputing, in percent.
    pub fn skip_rate(&self) -> f64 {
        let total = self.total_layout_calls();
        if total > 0 {
            (self.layouts_skipped as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_rate() {
        let stats = FrameStats {
            layouts_executed: 1,
            layouts_skipped: 3,
            ..Default::default()
        };
        assert_eq!(stats.total_layout_calls(), 4);
        assert!((stats.skip_rate() - 75.0).abs() < 1e-9);
        assert_eq!(FrameStats::default().skip_rate(), 0.0);
    }
}
