//! Lock-free handoff of line-range work from the owning thread to one worker.
//!
//! Two priority classes: a single visible-range cell (last write wins) that is
//! always read first, and a LIFO stack of normal requests. Every write bumps a
//! version counter the worker polls to notice that its local plan is stale.
//!
//! Both slots hold immutable values swapped in with compare-and-swap retry
//! loops, so neither side ever blocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use weft_primitives::LineRange;

/// Immutable persistent stack node.
#[derive(Debug)]
struct StackNode {
	range: LineRange,
	next: Option<Arc<StackNode>>,
}

fn same_node(a: &Option<Arc<StackNode>>, b: &Option<Arc<StackNode>>) -> bool {
	match (a, b) {
		(Some(a), Some(b)) => Arc::ptr_eq(a, b),
		(None, None) => true,
		_ => false,
	}
}

#[derive(Debug, Default)]
pub struct PriorityChannel {
	visible: ArcSwapOption<LineRange>,
	stack: ArcSwapOption<StackNode>,
	version: AtomicU64,
}

impl PriorityChannel {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the visible-range cell. An unread previous value is dropped.
	pub fn write_visible(&self, range: LineRange) {
		self.visible.store(Some(Arc::new(range)));
		self.version.fetch_add(1, Ordering::AcqRel);
	}

	/// Pushes `range` onto the normal-priority stack.
	pub fn write_normal(&self, range: LineRange) {
		loop {
			let cur = self.stack.load_full();
			let next = Some(Arc::new(StackNode { range, next: cur.clone() }));
			let prev = self.stack.compare_and_swap(&cur, next);
			if same_node(&prev, &cur) {
				break;
			}
		}
		self.version.fetch_add(1, Ordering::AcqRel);
	}

	/// Takes the visible range if present, else pops the most recent normal range.
	pub fn read(&self) -> Option<LineRange> {
		if let Some(range) = self.take_visible() {
			return Some(range);
		}

		loop {
			let cur = self.stack.load_full();
			let node = cur.as_ref()?;
			let prev = self.stack.compare_and_swap(&cur, node.next.clone());
			if same_node(&prev, &cur) {
				return Some(node.range);
			}
		}
	}

	fn take_visible(&self) -> Option<LineRange> {
		loop {
			let cur = self.visible.load_full();
			let range = *cur.as_deref()?;
			let prev = self.visible.compare_and_swap(&cur, None::<Arc<LineRange>>);
			let taken = match (&*prev, &cur) {
				(Some(a), Some(b)) => Arc::ptr_eq(a, b),
				_ => false,
			};
			if taken {
				return Some(range);
			}
		}
	}

	/// Returns the write counter. Only ever increases.
	pub fn current_version(&self) -> u64 {
		self.version.load(Ordering::Acquire)
	}

	/// Returns the unread normal ranges, most recent first, without consuming them.
	pub fn current_stack(&self) -> Vec<LineRange> {
		let mut out = Vec::new();
		let mut node = self.stack.load_full();
		while let Some(n) = node {
			out.push(n.range);
			node = n.next.clone();
		}
		out
	}

	/// Returns the unread visible range without consuming it.
	pub fn current_visible(&self) -> Option<LineRange> {
		self.visible.load().as_deref().copied()
	}

	pub fn is_empty(&self) -> bool {
		self.visible.load().is_none() && self.stack.load().is_none()
	}
}
