use crate::range::{CharIdx, CharLen};

/// Replaces `start..end` with `replacement`, or deletes it when `replacement` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
	pub start: CharIdx,
	pub end: CharIdx,
	pub replacement: Option<String>,
}

/// Which side of an insertion a position at the same offset ends up on.
///
/// Tracked spans map their start with [`Bias::Right`] and their end with
/// [`Bias::Left`], so text typed at either edge stays outside the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	Left,
	Right,
}

/// Inserted text with its char count cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
	text: String,
	char_len: CharLen,
}

impl Insertion {
	pub fn new(text: String) -> Self {
		let char_len = text.chars().count();
		Self { text, char_len }
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	#[inline]
	pub fn char_len(&self) -> CharLen {
		self.char_len
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.char_len == 0
	}

	/// Splits off the first `at` chars, leaving the remainder in `self`.
	pub(super) fn split_front(&mut self, at: CharLen) -> Insertion {
		let at = at.min(self.char_len);
		let byte = self.text.char_indices().nth(at).map_or(self.text.len(), |(i, _)| i);
		let rest = self.text.split_off(byte);
		let head = std::mem::replace(&mut self.text, rest);
		self.char_len -= at;
		Insertion { text: head, char_len: at }
	}

	pub(super) fn append(&mut self, other: Insertion) {
		self.text.push_str(&other.text);
		self.char_len += other.char_len;
	}
}

/// One step of a [`super::ChangeSet`], walking the source document left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
	/// Keep the next n source chars.
	Retain(CharLen),
	/// Drop the next n source chars.
	Delete(CharLen),
	/// Emit new text without consuming source chars.
	Insert(Insertion),
}
