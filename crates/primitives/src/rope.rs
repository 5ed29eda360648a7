//! Rope utilities and extensions.

use ropey::RopeSlice;

use crate::range::CharIdx;

/// Returns the number of lines, including the empty line after a trailing newline.
#[inline]
pub fn visible_line_count(text: RopeSlice) -> usize {
	text.len_lines()
}

/// Returns the char index where `line` starts, or the end of text past the last line.
#[inline]
pub fn line_start(text: RopeSlice, line: usize) -> CharIdx {
	if line < text.len_lines() { text.line_to_char(line) } else { text.len_chars() }
}

/// Returns the char index just past `line`, including its line break.
#[inline]
pub fn line_end_including_break(text: RopeSlice, line: usize) -> CharIdx {
	line_start(text, line + 1)
}

/// Returns the line containing `pos`, clamping past-the-end positions to the last line.
#[inline]
pub fn line_of(text: RopeSlice, pos: CharIdx) -> usize {
	text.char_to_line(pos.min(text.len_chars()))
}

#[cfg(test)]
mod tests {
	use ropey::Rope;

	use super::*;

	#[test]
	fn test_trailing_newline() {
		let text = Rope::from("hello\nworld\n");
		assert_eq!(visible_line_count(text.slice(..)), 3);
		assert_eq!(line_start(text.slice(..), 1), 6);
		assert_eq!(line_end_including_break(text.slice(..), 1), 12);
		assert_eq!(line_end_including_break(text.slice(..), 2), 12);
	}

	#[test]
	fn test_line_start_past_end() {
		let text = Rope::from("a\nb");
		assert_eq!(line_start(text.slice(..), 5), 3);
	}

	#[test]
	fn test_line_of_clamps() {
		let text = Rope::from("a\nb");
		assert_eq!(line_of(text.slice(..), 0), 0);
		assert_eq!(line_of(text.slice(..), 2), 1);
		assert_eq!(line_of(text.slice(..), 99), 1);
	}

	#[test]
	fn test_empty() {
		let text = Rope::from("");
		assert_eq!(visible_line_count(text.slice(..)), 1);
		assert_eq!(line_end_including_break(text.slice(..), 0), 0);
	}
}
