use std::time::Duration;

pub const BANNER_VISIBLE: Duration = Duration::from_millis(2_000);
pub const BANNER_FADE: Duration = Duration::from_millis(300);

/// Names one shown banner so that timers scheduled for it can be ignored
/// once a newer banner replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BannerTicket(u64);

/// Transient acknowledgment shown over the map.
///
/// Lifecycle: `show` → (after [`BANNER_VISIBLE`]) `begin_fade` → (after
/// [`BANNER_FADE`]) `clear`.
#[derive(Debug, Default, Clone)]
pub struct Banner {
    message: Option<String>,
    fading: bool,
    generation: u64,
}

impl Banner {
    pub fn show(&mut self, message: impl Into<String>) -> BannerTicket {
        self.generation += 1;
        self.message = Some(message.into());
        self.fading = false;
        BannerTicket(self.generation)
    }

    /// Returns `false` for a stale ticket, in which case no clear should be
    /// scheduled.
    pub fn begin_fade(&mut self, ticket: BannerTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.fading = true;
        true
    }

    pub fn clear(&mut self, ticket: BannerTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.message = None;
        self.fading = false;
        true
    }

    /// Hides the banner at once and invalidates every pending timer.
    pub fn dismiss(&mut self) {
        self.generation += 1;
        self.message = None;
        self.fading = false;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_fading(&self) -> bool {
        self.fading
    }

    fn is_current(&self, ticket: BannerTicket) -> bool {
        self.message.is_some() && ticket.0 == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_lifecycle() {
        let mut banner = Banner::default();
        let ticket = banner.show("Location set");
        assert_eq!(banner.message(), Some("Location set"));
        assert!(banner.begin_fade(ticket));
        assert!(banner.is_fading());
        assert!(banner.clear(ticket));
        assert_eq!(banner.message(), None);
    }

    #[test]
    fn newer_banner_ignores_older_timers() {
        let mut banner = Banner::default();
        let old = banner.show("first");
        assert!(banner.begin_fade(old));
        let new = banner.show("second");
        assert!(!banner.is_fading());

        assert!(!banner.clear(old));
        assert!(!banner.begin_fade(old));
        assert_eq!(banner.message(), Some("second"));

        assert!(banner.begin_fade(new));
        assert!(banner.clear(new));
    }

    #[test]
    fn dismiss_invalidates_pending_timers() {
        let mut banner = Banner::default();
        let ticket = banner.show("hello");
        banner.dismiss();
        assert!(!banner.begin_fade(ticket));
        assert_eq!(banner.message(), None);
    }
}
