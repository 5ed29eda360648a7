use super::types::{Bias, Change, Insertion, Operation};
use crate::Rope;
use crate::document::EditError;
use crate::range::{CharIdx, CharLen};

/// An edit expressed as retain/delete/insert steps over the whole source document.
///
/// The step form makes two things cheap: mapping an old position to its new
/// offset, and folding a chain of edits into one so a span can jump several
/// versions at once.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
	ops: Vec<Operation>,
	len: CharLen,
	len_after: CharLen,
}

impl ChangeSet {
	/// Leaves a document of `len` chars untouched.
	pub fn identity(len: CharLen) -> Self {
		let mut cs = Self::default();
		cs.retain(len);
		cs
	}

	/// Builds a changeset from sorted, non-overlapping changes against a document of `len` chars.
	pub fn from_changes(len: CharLen, changes: impl IntoIterator<Item = Change>) -> Result<Self, EditError> {
		let mut cs = Self::default();
		let mut cursor = 0;
		for Change { start, end, replacement } in changes {
			if start > end || end > len {
				return Err(EditError::OutOfBounds { start, end, len });
			}
			if start < cursor {
				return Err(EditError::Overlapping { start, prev_end: cursor });
			}
			cs.retain(start - cursor);
			cs.delete(end - start);
			if let Some(text) = replacement {
				cs.insert(Insertion::new(text));
			}
			cursor = end;
		}
		cs.retain(len - cursor);
		Ok(cs)
	}

	/// Source document length.
	pub fn len(&self) -> CharLen {
		self.len
	}

	/// Result document length.
	pub fn len_after(&self) -> CharLen {
		self.len_after
	}

	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}

	pub fn is_identity(&self) -> bool {
		self.ops.iter().all(|op| matches!(op, Operation::Retain(_)))
	}

	pub fn ops(&self) -> &[Operation] {
		&self.ops
	}

	pub(crate) fn retain(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}
		self.len += n;
		self.len_after += n;
		match self.ops.last_mut() {
			Some(Operation::Retain(run)) => *run += n,
			_ => self.ops.push(Operation::Retain(n)),
		}
	}

	pub(crate) fn delete(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}
		self.len += n;
		match self.ops.last_mut() {
			Some(Operation::Delete(run)) => *run += n,
			_ => self.ops.push(Operation::Delete(n)),
		}
	}

	/// Appends an insertion, keeping inserts ahead of a trailing delete so
	/// equal changesets share one canonical form.
	pub(crate) fn insert(&mut self, ins: Insertion) {
		if ins.is_empty() {
			return;
		}
		self.len_after += ins.char_len();
		match self.ops.as_mut_slice() {
			[.., Operation::Insert(prev)] | [.., Operation::Insert(prev), Operation::Delete(_)] => prev.append(ins),
			[.., last @ Operation::Delete(_)] => {
				let delete = std::mem::replace(last, Operation::Insert(ins));
				self.ops.push(delete);
			}
			_ => self.ops.push(Operation::Insert(ins)),
		}
	}

	/// Rewrites `text` in place.
	pub fn apply(&self, text: &mut Rope) {
		let mut at = 0;
		for op in &self.ops {
			match op {
				Operation::Retain(n) => at += n,
				Operation::Delete(n) => text.remove(at..at + n),
				Operation::Insert(ins) => {
					text.insert(at, ins.text());
					at += ins.char_len();
				}
			}
		}
	}

	/// Maps a source position to the result document.
	///
	/// Positions inside deleted text collapse to where the deletion was.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		let mut src = 0;
		let mut dst = 0;
		for op in &self.ops {
			if src > pos {
				break;
			}
			match op {
				Operation::Retain(n) if src + n > pos => return dst + (pos - src),
				Operation::Retain(n) => {
					src += n;
					dst += n;
				}
				Operation::Delete(n) if src + n > pos => return dst,
				Operation::Delete(n) => src += n,
				Operation::Insert(ins) => {
					if src != pos || bias == Bias::Right {
						dst += ins.char_len();
					}
				}
			}
		}
		dst + (pos - src)
	}

	/// Folds `self` then `next` into one changeset.
	///
	/// `next` must apply to the result of `self`.
	pub fn compose(self, next: ChangeSet) -> ChangeSet {
		debug_assert_eq!(self.len_after, next.len);

		let mut out = ChangeSet::default();
		let mut first = self.ops.into_iter();
		let mut second = next.ops.into_iter();
		let mut a = first.next();
		let mut b = second.next();

		loop {
			match (a.take(), b.take()) {
				(None, None) => break,
				// Source deletions never reach `next`.
				(Some(Operation::Delete(n)), rest) => {
					out.delete(n);
					a = first.next();
					b = rest;
				}
				// Insertions by `next` consume nothing from `self`.
				(rest, Some(Operation::Insert(ins))) => {
					out.insert(ins);
					a = rest;
					b = second.next();
				}
				(Some(Operation::Retain(n)), Some(Operation::Retain(m))) => {
					let step = n.min(m);
					out.retain(step);
					a = if n > step { Some(Operation::Retain(n - step)) } else { first.next() };
					b = if m > step { Some(Operation::Retain(m - step)) } else { second.next() };
				}
				(Some(Operation::Retain(n)), Some(Operation::Delete(m))) => {
					let step = n.min(m);
					out.delete(step);
					a = if n > step { Some(Operation::Retain(n - step)) } else { first.next() };
					b = if m > step { Some(Operation::Delete(m - step)) } else { second.next() };
				}
				(Some(Operation::Insert(mut ins)), Some(Operation::Retain(m))) => {
					let step = ins.char_len().min(m);
					if ins.char_len() > step {
						out.insert(ins.split_front(step));
						a = Some(Operation::Insert(ins));
					} else {
						out.insert(ins);
						a = first.next();
					}
					b = if m > step { Some(Operation::Retain(m - step)) } else { second.next() };
				}
				// Text inserted by `self` and deleted by `next` cancels out.
				(Some(Operation::Insert(mut ins)), Some(Operation::Delete(m))) => {
					let step = ins.char_len().min(m);
					if ins.char_len() > step {
						ins.split_front(step);
						a = Some(Operation::Insert(ins));
					} else {
						a = first.next();
					}
					b = if m > step { Some(Operation::Delete(m - step)) } else { second.next() };
				}
				// Mismatched lengths: keep whatever remains.
				(Some(Operation::Retain(n)), None) => {
					out.retain(n);
					a = first.next();
				}
				(Some(Operation::Insert(ins)), None) => {
					out.insert(ins);
					a = first.next();
				}
				(None, Some(Operation::Retain(m))) => {
					out.retain(m);
					b = second.next();
				}
				(None, Some(Operation::Delete(m))) => {
					out.delete(m);
					b = second.next();
				}
			}
		}
		out
	}
}
