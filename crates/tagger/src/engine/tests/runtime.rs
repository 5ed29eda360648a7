use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use weft_primitives::{LineRange, Span};

use super::{LineProducer, line_tags, lines_span, numbered_doc};
use crate::cache::CacheState;
use crate::config::TaggerCfg;
use crate::engine::AsyncTagger;

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn worker_fills_cache_and_announces_chunks() {
	init_tracing();
	let s = numbered_doc(1000).current();
	let producer = Arc::new(LineProducer::default());
	let mut tagger = AsyncTagger::new(Arc::clone(&producer));
	let mut changes = tagger.subscribe();
	let span = lines_span(&s, 0, 1000);

	assert!(tagger.query(&[span.clone()]).is_empty());
	tagger.run_until_idle().await;

	assert_eq!(producer.ranges(), vec![LineRange::new(0, 500), LineRange::new(500, 500)]);
	assert_eq!(tagger.cache_state(&span), CacheState::Complete);
	assert_eq!(tagger.query(&[span]), line_tags(&s, LineRange::new(0, 1000)));
	assert_eq!(tagger.metrics().requests_started, 1);
	assert_eq!(tagger.metrics().chunks_computed, 2);
	assert!(!tagger.has_active_request());

	assert!(changes.try_recv().is_ok());
	assert!(changes.try_recv().is_ok());
	assert!(changes.try_recv().is_err());
}

#[tokio::test]
async fn producer_error_marks_range_visited() {
	init_tracing();
	let s = numbered_doc(10).current();
	let producer = Arc::new(LineProducer {
		fail_line: Some(3),
		..LineProducer::default()
	});
	let mut tagger = AsyncTagger::new(Arc::clone(&producer));
	let span = lines_span(&s, 3, 4);

	tagger.query(&[span.clone()]);
	tagger.run_until_idle().await;

	assert_eq!(tagger.cache_state(&span), CacheState::Complete);
	assert!(tagger.query(&[span]).is_empty());
	assert_eq!(tagger.metrics().producer_failures, 1);
	assert_eq!(producer.ranges(), vec![LineRange::line(3)]);
}

#[tokio::test]
async fn producer_panic_is_contained() {
	init_tracing();
	let s = numbered_doc(10).current();
	let producer = Arc::new(LineProducer {
		panic_line: Some(2),
		..LineProducer::default()
	});
	let mut tagger = AsyncTagger::with_cfg(
		Arc::clone(&producer),
		TaggerCfg {
			chunk_size: 2,
			delay: None,
		},
	);
	let span = lines_span(&s, 0, 6);

	tagger.query(&[span.clone()]);
	tagger.run_until_idle().await;

	assert_eq!(tagger.cache_state(&span), CacheState::Complete);
	let lines: Vec<_> = tagger.query(&[span]).into_iter().map(|t| t.tag).collect();
	assert_eq!(lines, vec![0, 1, 4, 5]);
	assert_eq!(tagger.metrics().producer_failures, 1);
}

#[tokio::test(start_paused = true)]
async fn edit_during_delay_skips_stale_snapshot() {
	init_tracing();
	let mut doc = numbered_doc(20);
	let s1 = doc.current();
	let producer = Arc::new(LineProducer {
		delay: Some(Duration::from_millis(50)),
		..LineProducer::default()
	});
	let mut tagger = AsyncTagger::new(Arc::clone(&producer));

	tagger.query(&[lines_span(&s1, 0, 10)]);
	let s2 = doc.insert(0, "x").unwrap();
	tagger.query(&[lines_span(&s2, 0, 10)]);
	tagger.run_until_idle().await;

	assert_eq!(producer.data_calls.load(Ordering::Relaxed), 2);
	assert!(producer.calls.lock().iter().all(|(version, _)| *version == s2.version()));
	assert_eq!(tagger.metrics().requests_cancelled, 1);
	assert_eq!(tagger.cache_state(&lines_span(&s2, 0, 10)), CacheState::Complete);
	assert_eq!(tagger.cache_state(&lines_span(&s1, 0, 10)), CacheState::None);
}

#[tokio::test]
async fn producer_change_recomputes_on_next_query() {
	init_tracing();
	let s = numbered_doc(10).current();
	let producer = Arc::new(LineProducer::default());
	let mut tagger = AsyncTagger::new(Arc::clone(&producer));
	let span = lines_span(&s, 0, 10);

	tagger.query(&[span.clone()]);
	tagger.run_until_idle().await;
	let mut changes = tagger.subscribe();
	tagger.notifier().producer_changed();
	assert!(tagger.next_message().await);

	assert_eq!(changes.recv().await.map(|c| c.span), Some(span.clone()));
	assert!(tagger.query(&[span.clone()]).is_empty());
	tagger.run_until_idle().await;
	assert_eq!(tagger.query(&[span]).len(), 10);
	assert_eq!(producer.calls.lock().len(), 2);
}

#[tokio::test]
async fn snapshot_change_mid_run_keeps_serving_old_tags() {
	init_tracing();
	let mut doc = numbered_doc(40);
	let s1 = doc.current();
	let producer = Arc::new(LineProducer::default());
	let mut tagger = AsyncTagger::new(Arc::clone(&producer));
	tagger.query(&[lines_span(&s1, 0, 40)]);
	tagger.run_until_idle().await;

	let s2 = doc.insert(0, "// header\n").unwrap();
	let interim = tagger.query(&[Span::whole(&s2)]);
	assert_eq!(interim.len(), 40);
	assert!(tagger.has_tracking_cache());

	tagger.run_until_idle().await;
	assert!(!tagger.has_tracking_cache());
	assert_eq!(tagger.query(&[Span::whole(&s2)]).len(), 41);
}

#[tokio::test]
async fn filling_around_a_visited_pocket_serves_each_line_once() {
	init_tracing();
	let s = numbered_doc(30).current();
	let producer = Arc::new(LineProducer::default());
	let mut tagger = AsyncTagger::new(Arc::clone(&producer));

	tagger.query(&[lines_span(&s, 5, 10)]);
	tagger.run_until_idle().await;
	tagger.query(&[lines_span(&s, 0, 20)]);
	tagger.run_until_idle().await;

	assert_eq!(
		producer.ranges(),
		vec![LineRange::new(5, 5), LineRange::new(0, 5), LineRange::new(10, 10)]
	);
	let mut lines: Vec<_> = tagger.query(&[lines_span(&s, 0, 20)]).into_iter().map(|t| t.tag).collect();
	lines.sort_unstable();
	assert_eq!(lines, (0..20).collect::<Vec<_>>());
}
