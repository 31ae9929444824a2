// SPDX-License-Identifier: MPL-2.0

//! Banner rotation state for the top of the listing page.

use crate::model::Banner;
use std::time::Duration;

/// Time each banner stays on screen while autoplaying
pub const AUTOPLAY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Carousel {
    banners: Vec<Banner>,
    index: usize,
    /// Time accumulated toward the next autoplay step
    elapsed: Duration,
}

impl Carousel {
    /// Keep active banners only, sorted by their display order
    pub fn new(banners: &[Banner]) -> Self {
        let mut active: Vec<Banner> = banners.iter().filter(|b| b.active).cloned().collect();
        active.sort_by_key(|b| b.order);
        Self {
            banners: active,
            index: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn len(&self) -> usize {
        self.banners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banners.is_empty()
    }

    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The banner to render, or nothing at all when no banner is active
    pub fn current(&self) -> Option<&Banner> {
        self.banners.get(self.index)
    }

    /// Autoplay only runs when there is something to rotate to
    pub fn autoplay_interval(&self) -> Option<Duration> {
        (self.banners.len() > 1).then_some(AUTOPLAY_INTERVAL)
    }

    /// Arrows and dot navigation are only shown with more than one banner
    pub fn shows_controls(&self) -> bool {
        self.banners.len() > 1
    }

    pub fn next(&mut self) {
        if !self.banners.is_empty() {
            self.index = (self.index + 1) % self.banners.len();
        }
        self.elapsed = Duration::ZERO;
    }

    pub fn prev(&mut self) {
        if !self.banners.is_empty() {
            let len = self.banners.len();
            self.index = (self.index + len - 1) % len;
        }
        self.elapsed = Duration::ZERO;
    }

    pub fn select(&mut self, index: usize) {
        if index < self.banners.len() {
            self.index = index;
            self.elapsed = Duration::ZERO;
        }
    }

    /// Advance the autoplay clock; returns how many slides were advanced
    pub fn tick(&mut self, delta: Duration) -> usize {
        let Some(interval) = self.autoplay_interval() else {
            return 0;
        };

        self.elapsed += delta;
        let mut steps = 0;
        while self.elapsed >= interval {
            self.elapsed -= interval;
            self.index = (self.index + 1) % self.banners.len();
            steps += 1;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner(id: &str, order: i64, active: bool) -> Banner {
        Banner {
            id: id.to_string(),
            image_url: format!("{id}.png"),
            link: None,
            active,
            order,
            city: "all".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_no_active_banners_renders_nothing() {
        let mut carousel = Carousel::new(&[banner("a", 1, false)]);
        assert!(carousel.is_empty());
        assert!(carousel.current().is_none());
        assert!(carousel.autoplay_interval().is_none());
        assert_eq!(carousel.tick(Duration::from_secs(60)), 0);
        carousel.next();
        carousel.prev();
        assert!(carousel.current().is_none());
    }

    #[test]
    fn test_single_banner_never_autoplays() {
        let mut carousel = Carousel::new(&[banner("only", 3, true), banner("off", 1, false)]);
        assert_eq!(carousel.len(), 1);
        assert!(carousel.autoplay_interval().is_none());
        assert!(!carousel.shows_controls());
        assert_eq!(carousel.tick(Duration::from_secs(30)), 0);
        assert_eq!(carousel.current().unwrap().id, "only");
    }

    #[test]
    fn test_sorted_by_order_and_wraps() {
        let mut carousel = Carousel::new(&[
            banner("third", 30, true),
            banner("first", 10, true),
            banner("second", 20, true),
        ]);
        assert_eq!(carousel.autoplay_interval(), Some(AUTOPLAY_INTERVAL));
        assert_eq!(carousel.current().unwrap().id, "first");

        assert_eq!(carousel.tick(Duration::from_millis(4_999)), 0);
        assert_eq!(carousel.tick(Duration::from_millis(1)), 1);
        assert_eq!(carousel.current().unwrap().id, "second");

        carousel.tick(AUTOPLAY_INTERVAL);
        assert_eq!(carousel.current().unwrap().id, "third");
        carousel.tick(AUTOPLAY_INTERVAL);
        assert_eq!(carousel.current().unwrap().id, "first");
    }

    #[test]
    fn test_manual_navigation() {
        let mut carousel = Carousel::new(&[banner("a", 1, true), banner("b", 2, true)]);
        carousel.prev();
        assert_eq!(carousel.current().unwrap().id, "b");
        carousel.next();
        assert_eq!(carousel.current().unwrap().id, "a");
        carousel.select(1);
        assert_eq!(carousel.index(), 1);
        carousel.select(7);
        assert_eq!(carousel.index(), 1);
    }

    #[test]
    fn test_long_gap_advances_multiple_slides() {
        let mut carousel = Carousel::new(&[banner("a", 1, true), banner("b", 2, true), banner("c", 3, true)]);
        assert_eq!(carousel.tick(Duration::from_secs(16)), 3);
        assert_eq!(carousel.current().unwrap().id, "a");
    }
}
