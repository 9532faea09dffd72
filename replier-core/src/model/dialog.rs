use rand::Rng;

use crate::config::DialogConfig;

/// Consecutive-answer counter of one conversation.
///
/// Zero means the bot is not in a dialog. Every produced answer raises the
/// counter, which lowers the chance of answering again unprompted; past the
/// ceiling the counter drops back to zero.
///
/// Not meant to be shared between conversations: keep one per session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DialogState {
	consecutive_response_count: u32,
}

impl DialogState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn consecutive_response_count(&self) -> u32 {
		self.consecutive_response_count
	}

	pub fn in_dialog(&self) -> bool {
		self.consecutive_response_count > 0
	}

	/// Draws whether the ongoing dialog should go on.
	///
	/// Never starts a dialog: always `false` with a zero counter.
	pub fn should_continue<R: Rng + ?Sized>(&self, config: &DialogConfig, rng: &mut R) -> bool {
		if !self.in_dialog() || config.draw_range() == 0 {
			return false;
		}
		let draw = rng.random_range(0..config.draw_range()) as f64;
		let threshold =
			config.draw_range() as f64 * config.continuation_probability() - self.consecutive_response_count as f64;
		draw < threshold
	}

	/// Records the outcome of one response decision.
	pub fn record(&mut self, config: &DialogConfig, responded: bool) {
		if responded {
			self.consecutive_response_count += 1;
		}
		if self.consecutive_response_count > config.ceiling() {
			self.consecutive_response_count = 0;
		}
	}

	pub fn reset(&mut self) {
		self.consecutive_response_count = 0;
	}
}
